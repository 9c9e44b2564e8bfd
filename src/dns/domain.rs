use std::fmt;

use crate::error::{Result, UpdateError};

/// Subdomain label Loopia uses for the bare domain itself.
pub const ROOT_MARKER: &str = "@";

/// A domain name known to contain at least one '.'.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainName(String);

/// A domain split into the parts the zone API addresses records by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDomain {
    pub subdomain: String,
    pub parent: String,
}

impl DomainName {
    pub fn new(domain: &str) -> Result<Self> {
        parse_domain(domain)?;
        Ok(Self(domain.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parsed(&self) -> ParsedDomain {
        // Validated on construction.
        split(&self.0)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a domain into subdomain label and parent domain.
///
/// Only one level of subdomain is split off: `a.b.example.com` yields
/// `a` under `b.example.com`.
pub fn parse_domain(domain: &str) -> Result<ParsedDomain> {
    if !domain.contains('.') {
        return Err(UpdateError::InvalidDomain(domain.to_string()));
    }
    Ok(split(domain))
}

fn split(domain: &str) -> ParsedDomain {
    if domain.matches('.').count() == 1 {
        return ParsedDomain {
            subdomain: ROOT_MARKER.to_string(),
            parent: domain.to_string(),
        };
    }

    let (subdomain, parent) = domain.split_once('.').unwrap_or((ROOT_MARKER, domain));
    ParsedDomain {
        subdomain: subdomain.to_string(),
        parent: parent.to_string(),
    }
}
