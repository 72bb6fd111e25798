use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::scrape::listing::StatusMarkers;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default refresh interval in milliseconds (10 minutes)
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 10 * 60 * 1000;

/// Timeout for a single page fetch in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Retries after the first failed attempt of a fetch
pub const FETCH_RETRIES: u32 = 2;

/// Delay before the first retry, doubled for every following one
pub const FETCH_RETRY_BACKOFF_MS: u64 = 500;

/// Listing site scraped by default
pub const DEFAULT_BASE_URL: &str = "https://misterlauncher.org";

/// Environment variable read for the log filter
pub const LOG_ENV_VAR: &str = "VERSION_WATCHER_LOG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Watcher configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WatcherConfig {
    pub base_url: String,
    /// Refresh interval in milliseconds
    pub refresh_interval: u64,
    pub fetch: FetchConfig,
    pub markers: StatusMarkers,
    pub eviction: EvictionPolicy,
    pub logging: LoggingConfig,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL_MS,
            fetch: FetchConfig::default(),
            markers: StatusMarkers::default(),
            eviction: EvictionPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl WatcherConfig {
    /// Loads the config from a JSON file.
    /// Returns `None` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval)
    }
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchConfig {
    /// Per-request timeout in milliseconds
    pub timeout: u64,
    pub retries: u32,
    /// Backoff before the first retry in milliseconds
    pub retry_backoff: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: FETCH_TIMEOUT_MS,
            retries: FETCH_RETRIES,
            retry_backoff: FETCH_RETRY_BACKOFF_MS,
            user_agent: concat!("version-watcher/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// What happens to cached hosts that stop appearing in the listing
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(tag = "policy", rename_all = "camelCase")]
pub enum EvictionPolicy {
    /// Keep every host for the lifetime of the process
    #[default]
    Never,
    /// Drop hosts not seen for more than `cycles` complete refresh cycles
    AfterMissedCycles { cycles: u32 },
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Filter directive used when the environment variable is unset
    pub level: String,
    pub format: LogFormat,
    /// Log to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

/// Returns the path to the data directory for version-watcher.
/// Uses $XDG_DATA_HOME/version-watcher if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/version-watcher,
/// or ./version-watcher if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default config file location.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("version-watcher")
}
