use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::dns::LOOPIA_API_ENDPOINT;
use crate::ip::EXTERNAL_IP_CHECK_URL;

const CONFIG_FILE_NAME: &str = ".loopiaapi.toml";
const STATE_FILE_NAME: &str = ".loopiaapi-externalip";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub credentials: Option<FileCredentials>,
    #[serde(default)]
    pub updater: UpdaterConfig,
}

/// The `[credentials]` section. Either entry may be left out and given on
/// the command line instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileCredentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdaterConfig {
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    #[serde(default = "default_ip_check_url")]
    pub ip_check_url: String,
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_endpoint() -> String {
    LOOPIA_API_ENDPOINT.to_string()
}

fn default_ip_check_url() -> String {
    EXTERNAL_IP_CHECK_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            ip_check_url: default_ip_check_url(),
            state_file: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, which must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Like [`Settings::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load(path)
    }

    pub fn default_config_path() -> PathBuf {
        home_dir().join(CONFIG_FILE_NAME)
    }

    pub fn default_state_path() -> PathBuf {
        home_dir().join(STATE_FILE_NAME)
    }

    /// State file from the config, falling back to the home directory.
    pub fn state_path(&self) -> PathBuf {
        self.updater
            .state_file
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(Self::default_state_path)
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}
