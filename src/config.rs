//! Configuration loading and data folder resolution

use crate::error::AppError;
use crate::services::classifier::client::DEFAULT_ENDPOINT;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const APP_DIR: &str = "corn-doctor";
const CONFIG_FILE: &str = "config.toml";

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    /// Seconds before an outstanding request is abandoned; 0 disables.
    pub request_timeout_secs: u64,
    /// Most history records kept; 0 keeps everything.
    pub history_limit: usize,
    pub show_connection_status: bool,
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 60,
            history_limit: 50,
            show_connection_status: false,
            data_dir: default_data_dir(),
        }
    }
}

/// Values supplied on the command line or through the environment.
/// These win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub history_limit: Option<usize>,
    pub show_connection_status: Option<bool>,
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Resolution order: overrides, then config file, then compiled defaults.
    ///
    /// A config file named explicitly must exist and parse. The default
    /// location is optional and a broken file there is only logged.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, AppError> {
        let mut config = match overrides.config_path.as_deref() {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path).unwrap_or_else(|e| {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    Self::default()
                }),
                None => Self::default(),
            },
        };

        if let Some(endpoint) = overrides.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(secs) = overrides.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(limit) = overrides.history_limit {
            config.history_limit = limit;
        }
        if let Some(show) = overrides.show_connection_status {
            config.show_connection_status = show;
        }
        if let Some(dir) = overrides.data_dir {
            config.data_dir = dir;
        }

        debug!(?config, "Configuration resolved");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn history_limit(&self) -> Option<usize> {
        (self.history_limit > 0).then_some(self.history_limit)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("history.db")
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

/// OS-dependent data folder, e.g. ~/.local/share/corn-doctor on Linux.
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./corn_doctor_data"))
}
