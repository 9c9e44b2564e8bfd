mod domain;
mod loopia;
mod provider;
pub mod xmlrpc;

pub use domain::{parse_domain, DomainName, ParsedDomain, ROOT_MARKER};
pub use loopia::{LoopiaClient, LOOPIA_API_ENDPOINT};
pub use provider::{Credentials, ZoneApi, ZoneRecord, ADDRESS_RECORD_TYPE};

use std::sync::Arc;

use reqwest::Url;

use crate::error::Result;

/// Open a client for the zone API at `endpoint`.
pub fn create_client(endpoint: Url) -> Result<Arc<dyn ZoneApi>> {
    Ok(Arc::new(LoopiaClient::new(endpoint)?))
}
