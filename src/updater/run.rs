use std::net::Ipv4Addr;

use thiserror::Error;
use tracing::info;

use super::batch::{run_batch, split_outcomes};
use super::decision::should_update;
use super::zone::UpdateResult;
use crate::dns::{Credentials, DomainName, ZoneApi};
use crate::error::UpdateError;
use crate::state::IpStateStore;

#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub domains: Vec<DomainName>,
    pub credentials: Credentials,
    pub force: bool,
    pub explicit_ip: Option<Ipv4Addr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing changed since the last run.
    UpToDate,
    Updated {
        ip: Ipv4Addr,
        results: Vec<UpdateResult>,
    },
}

/// A run that stopped early, together with the records it had already
/// rewritten at the provider before stopping.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct RunFailure {
    pub completed: Vec<UpdateResult>,
    pub error: UpdateError,
}

impl From<UpdateError> for RunFailure {
    fn from(error: UpdateError) -> Self {
        Self {
            completed: Vec::new(),
            error,
        }
    }
}

/// One updater run: compare against the stored address, update every
/// domain, then store the new address.
///
/// The address is stored only once every domain has been updated, so a
/// failed run is retried on the next invocation.
pub async fn run_update(
    api: &dyn ZoneApi,
    store: &IpStateStore,
    request: &UpdateRequest,
    current_ip: Ipv4Addr,
) -> Result<RunOutcome, RunFailure> {
    let last_ip = store.read_last().await?;

    if !should_update(current_ip, last_ip, request.force, request.explicit_ip) {
        info!("IP {} unchanged (last known {:?})", current_ip, last_ip);
        return Ok(RunOutcome::UpToDate);
    }

    let ip = request.explicit_ip.unwrap_or(current_ip);
    info!(
        "Updating {} domain(s) to {} (last known {:?})",
        request.domains.len(),
        ip,
        last_ip
    );

    let outcomes = run_batch(api, &request.domains, &request.credentials, ip).await;
    let (results, failure) = split_outcomes(outcomes);
    if let Some(error) = failure {
        return Err(RunFailure {
            completed: results,
            error,
        });
    }

    if let Err(error) = store.write_last(ip).await {
        return Err(RunFailure {
            completed: results,
            error,
        });
    }

    Ok(RunOutcome::Updated { ip, results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::updater::testing::{creds, record, FakeZoneApi};
    use tempfile::TempDir;

    const OLD: Ipv4Addr = Ipv4Addr::new(1, 2, 3, 4);
    const NEW: Ipv4Addr = Ipv4Addr::new(5, 6, 7, 8);

    fn request(domains: &[&str]) -> UpdateRequest {
        UpdateRequest {
            domains: domains.iter().map(|d| DomainName::new(d).unwrap()).collect(),
            credentials: creds(),
            force: false,
            explicit_ip: None,
        }
    }

    #[tokio::test]
    async fn test_first_run_only_reads_state() {
        let dir = TempDir::new().unwrap();
        let store = IpStateStore::new(dir.path().join("externalip"));
        let api = FakeZoneApi::new();

        let outcome = run_update(&api, &store, &request(&["example.com"]), NEW).await.unwrap();

        assert_eq!(outcome, RunOutcome::UpToDate);
        assert!(api.calls().is_empty());
        assert_eq!(store.read_last().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_explicit_ip_is_written() {
        let dir = TempDir::new().unwrap();
        let store = IpStateStore::new(dir.path().join("externalip"));
        store.write_last(OLD).await.unwrap();
        let api = FakeZoneApi::new().with_zone("@", "example.com", vec![record("A", "1.2.3.4", 1)]);

        let mut req = request(&["example.com"]);
        req.explicit_ip = Some(Ipv4Addr::new(9, 9, 9, 9));

        let outcome = run_update(&api, &store, &req, OLD).await.unwrap();

        match outcome {
            RunOutcome::Updated { ip, results } => {
                assert_eq!(ip, Ipv4Addr::new(9, 9, 9, 9));
                assert_eq!(results[0].new_ip, ip);
            }
            other => panic!("expected update, got {other:?}"),
        }
        assert_eq!(store.read_last().await.unwrap(), Some(Ipv4Addr::new(9, 9, 9, 9)));
    }

    #[tokio::test]
    async fn test_force_on_first_run() {
        let dir = TempDir::new().unwrap();
        let store = IpStateStore::new(dir.path().join("externalip"));
        let api = FakeZoneApi::new().with_zone("@", "example.com", vec![record("A", "1.2.3.4", 1)]);

        let mut req = request(&["example.com"]);
        req.force = true;

        let outcome = run_update(&api, &store, &req, NEW).await.unwrap();

        assert!(matches!(outcome, RunOutcome::Updated { ip, .. } if ip == NEW));
        assert_eq!(store.read_last().await.unwrap(), Some(NEW));
    }

    #[tokio::test]
    async fn test_failure_leaves_state_alone() {
        let dir = TempDir::new().unwrap();
        let store = IpStateStore::new(dir.path().join("externalip"));
        store.write_last(OLD).await.unwrap();
        let api = FakeZoneApi::new().rejecting_credentials();

        let err = run_update(&api, &store, &request(&["example.com"]), NEW)
            .await
            .unwrap_err();

        assert!(matches!(err.error, UpdateError::Authentication(_)));
        assert!(err.completed.is_empty());
        assert_eq!(store.read_last().await.unwrap(), Some(OLD));
    }

    #[tokio::test]
    async fn test_failure_keeps_records_already_rewritten() {
        let dir = TempDir::new().unwrap();
        let store = IpStateStore::new(dir.path().join("externalip"));
        store.write_last(OLD).await.unwrap();
        let api = FakeZoneApi::new()
            .with_zone("@", "one.se", vec![record("A", "1.2.3.4", 1)])
            .failing_on("two.se");

        let err = run_update(&api, &store, &request(&["one.se", "two.se"]), NEW)
            .await
            .unwrap_err();

        assert!(matches!(err.error, UpdateError::RemoteApi(_)));
        assert_eq!(
            err.completed,
            vec![UpdateResult {
                domain: "one.se".to_string(),
                old_ip: "1.2.3.4".to_string(),
                new_ip: NEW,
            }]
        );
        assert_eq!(store.read_last().await.unwrap(), Some(OLD));
    }

    #[tokio::test]
    async fn test_state_write_failure_after_successful_batch() {
        let dir = TempDir::new().unwrap();
        let store = IpStateStore::new(dir.path().join("externalip"));
        store.write_last(OLD).await.unwrap();
        // Occupy the temp path so the new address cannot be staged.
        std::fs::create_dir(dir.path().join("externalip.tmp")).unwrap();
        let api = FakeZoneApi::new().with_zone("@", "example.com", vec![record("A", "1.2.3.4", 1)]);

        let err = run_update(&api, &store, &request(&["example.com"]), NEW)
            .await
            .unwrap_err();

        assert!(matches!(err.error, UpdateError::Io { .. }));
        assert_eq!(err.completed.len(), 1);
        assert_eq!(api.updates().len(), 1);
        assert_eq!(store.read_last().await.unwrap(), Some(OLD));
    }
}
