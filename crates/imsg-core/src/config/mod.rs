mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ImsgError;
use defaults::*;

/// Environment variable that overrides the message store location.
pub const CHAT_DB_PATH_ENV: &str = "CHAT_DB_PATH";

/// Top-level imsg configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub imsg: ImsgConfig,
    #[serde(default)]
    pub send: SendConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImsgConfig {
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for daily rolling log files. Empty = log to stderr.
    #[serde(default)]
    pub log_dir: String,
}

impl Default for ImsgConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

/// Delivery settings: fallback chain order and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendConfig {
    /// Provider names in the order they are tried.
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before retry `n` is `backoff_unit_ms * 2^n`.
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,
    /// Treat a script reply that is neither `success` nor `error:...` as delivered.
    #[serde(default = "default_true")]
    pub lenient_replies: bool,
    /// Script subprocess timeout in seconds. 0 = wait indefinitely.
    #[serde(default)]
    pub script_timeout_secs: u64,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            max_retries: default_max_retries(),
            backoff_unit_ms: default_backoff_unit_ms(),
            lenient_replies: true,
            script_timeout_secs: 0,
        }
    }
}

/// Message store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_limit")]
    pub default_limit: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            default_limit: default_limit(),
        }
    }
}

impl StoreConfig {
    /// Resolved store path: `CHAT_DB_PATH` wins over the configured path.
    pub fn resolved_db_path(&self) -> String {
        match std::env::var(CHAT_DB_PATH_ENV) {
            Ok(path) if !path.is_empty() => path,
            _ => shellexpand(&self.db_path),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Whether a config file exists at `path` (after `~` expansion).
pub fn exists(path: &str) -> bool {
    Path::new(&shellexpand(path)).exists()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. Runs before logging is
/// installed, so callers report the fallback themselves (see [`exists`]).
pub fn load(path: &str) -> Result<Config, ImsgError> {
    if !exists(path) {
        return Ok(Config::default());
    }
    let expanded = shellexpand(path);
    let path = Path::new(&expanded);

    let content = std::fs::read_to_string(path)
        .map_err(|e| ImsgError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| ImsgError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
