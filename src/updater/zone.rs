use std::net::Ipv4Addr;

use tracing::{debug, info};

use crate::dns::{Credentials, DomainName, ZoneApi};
use crate::dns::xmlrpc::Value;
use crate::error::{Result, UpdateError};

/// First element of a `getDomains` reply when the credentials are rejected.
pub const AUTH_ERROR: &str = "AUTH_ERROR";

/// One address record rewritten by [`update_domain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult {
    pub domain: String,
    pub old_ip: String,
    pub new_ip: Ipv4Addr,
}

/// Point every A record of `domain` at `new_ip`.
///
/// Credentials are checked first; a rejection is reported as
/// [`UpdateError::Authentication`] before any record is read. Records of
/// other types are left alone.
pub async fn update_domain(
    api: &dyn ZoneApi,
    domain: &DomainName,
    creds: &Credentials,
    new_ip: Ipv4Addr,
) -> Result<Vec<UpdateResult>> {
    let parsed = domain.parsed();

    validate_credentials(api, creds).await?;

    let records = api.get_zone_records(creds, &parsed).await?;
    debug!(
        "{} returned {} zone records for {}",
        api.provider_name(),
        records.len(),
        domain
    );

    let mut results = Vec::new();
    for mut record in records {
        if !record.is_address_record() {
            continue;
        }

        let old_ip = record.rdata().unwrap_or_default().to_string();
        record.set_rdata(new_ip.to_string());

        let status = api.update_zone_record(creds, &parsed, &record).await?;
        debug!("updateZoneRecord for {} answered {:?}", domain, status);

        info!("Updated {} from {} to {}", domain, old_ip, new_ip);
        results.push(UpdateResult {
            domain: domain.to_string(),
            old_ip,
            new_ip,
        });
    }

    Ok(results)
}

async fn validate_credentials(api: &dyn ZoneApi, creds: &Credentials) -> Result<()> {
    let response = api.get_domains(creds).await?;

    if let Some(Value::String(first)) = response.as_array().and_then(|items| items.first()) {
        if first == AUTH_ERROR {
            return Err(UpdateError::Authentication(AUTH_ERROR.to_string()));
        }
    }

    Ok(())
}
