use std::net::Ipv4Addr;

use tracing::error;

use super::zone::{update_domain, UpdateResult};
use crate::dns::{Credentials, DomainName, ZoneApi};
use crate::error::{Result, UpdateError};

/// Update `domains` one after another, in order.
///
/// Stops at the first failure: the returned list ends with that error and
/// the remaining domains are not touched.
pub async fn run_batch(
    api: &dyn ZoneApi,
    domains: &[DomainName],
    creds: &Credentials,
    new_ip: Ipv4Addr,
) -> Vec<Result<Vec<UpdateResult>>> {
    let mut outcomes = Vec::with_capacity(domains.len());

    for domain in domains {
        let outcome = update_domain(api, domain, creds, new_ip).await;
        let failed = match &outcome {
            Ok(_) => false,
            Err(e) => {
                error!("Failed to update {}: {}", domain, e);
                true
            }
        };

        outcomes.push(outcome);
        if failed {
            break;
        }
    }

    outcomes
}

/// Flatten batch outcomes into the records that were rewritten and the
/// error that ended the batch, if any.
pub fn split_outcomes(
    outcomes: Vec<Result<Vec<UpdateResult>>>,
) -> (Vec<UpdateResult>, Option<UpdateError>) {
    let mut results = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(updated) => results.extend(updated),
            Err(e) => return (results, Some(e)),
        }
    }
    (results, None)
}
