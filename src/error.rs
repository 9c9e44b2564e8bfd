use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, UpdateError>;

/// Errors raised while deciding on and applying a zone update.
///
/// Every variant is fatal for the run: nothing in the update workflow
/// recovers from one locally.
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Domain {0} doesn't seem to be valid")]
    InvalidDomain(String),

    #[error("Invalid system credentials (Got {0})")]
    Authentication(String),

    #[error("Remote API error: {0}")]
    RemoteApi(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl UpdateError {
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::RemoteApi(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for UpdateError {
    fn from(err: reqwest::Error) -> Self {
        Self::RemoteApi(err.to_string())
    }
}
