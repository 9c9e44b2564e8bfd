// Last-known external IP, kept as a single trimmed line of text.
//
// Writes go to a sibling temp file which is then renamed over the state
// file, so readers see either the old or the new address.

use std::io;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{Result, UpdateError};

#[derive(Debug, Clone)]
pub struct IpStateStore {
    path: PathBuf,
}

impl IpStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the last stored address. A missing or empty file means no
    /// address has been stored yet.
    pub async fn read_last(&self) -> Result<Option<Ipv4Addr>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No state file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(UpdateError::io(&self.path, e)),
        };

        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        content.parse().map(Some).map_err(|_| {
            UpdateError::io(
                &self.path,
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("state file holds {content:?}, not an IPv4 address"),
                ),
            )
        })
    }

    pub async fn write_last(&self, ip: Ipv4Addr) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| UpdateError::io(parent, e))?;
            }
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, ip.to_string().trim())
            .await
            .map_err(|e| UpdateError::io(&temp_path, e))?;

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(UpdateError::io(&self.path, e));
        }

        tracing::debug!("Stored {} in {}", ip, self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
