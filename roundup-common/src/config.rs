//! Bootstrap configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Steps 1 and 2 are handled by the binary's argument parser; this module
//! covers the TOML file and the compiled defaults. Operator credentials
//! (store tokens, provider keys) are never part of this configuration: they
//! arrive with each request.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";
pub const DEFAULT_MAILERSEND_API_URL: &str = "https://api.mailersend.com/v1/email";
pub const DEFAULT_SENDER_NAME: &str = "Weekday Interviews";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EMAIL_LOG_CAPACITY: usize = 500;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "ROUNDUP_CONFIG";

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional in the file; missing values take compiled defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP server port
    pub port: u16,

    /// Base URL of the record store REST API
    pub airtable_api_url: String,

    /// Email provider send endpoint
    pub mailersend_api_url: String,

    /// Display name used as the email sender
    pub sender_name: String,

    /// Timeout applied to every upstream HTTP request
    pub request_timeout_secs: u64,

    /// Number of send attempts kept in the in-memory email log
    pub email_log_capacity: usize,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            airtable_api_url: DEFAULT_AIRTABLE_API_URL.to_string(),
            mailersend_api_url: DEFAULT_MAILERSEND_API_URL.to_string(),
            sender_name: DEFAULT_SENDER_NAME.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            email_log_capacity: DEFAULT_EMAIL_LOG_CAPACITY,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Validate values that would otherwise fail later at startup
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.email_log_capacity == 0 {
            return Err(Error::Config(
                "email_log_capacity must be greater than zero".to_string(),
            ));
        }
        for (name, url) in [
            ("airtable_api_url", &self.airtable_api_url),
            ("mailersend_api_url", &self.mailersend_api_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        Ok(())
    }
}

/// Default configuration file location for the platform
///
/// `<config_dir>/roundup/config.toml`, e.g. `~/.config/roundup/config.toml`
/// on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("roundup").join("config.toml"))
}

/// Resolve which config file to read
///
/// Explicit path (CLI) → `ROUNDUP_CONFIG` → platform default.
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}

/// Load and validate the TOML config file
///
/// A missing file is not an error: a warning is logged and compiled
/// defaults are used. A file that exists but cannot be parsed is an error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let config = match path {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(path)?;
            let config: TomlConfig = toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        Some(path) => {
            warn!(
                "Config file not found at {}, using compiled defaults",
                path.display()
            );
            TomlConfig::default()
        }
        None => {
            warn!("No config directory available, using compiled defaults");
            TomlConfig::default()
        }
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TomlConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str("port = 8080\n[logging]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.sender_name, DEFAULT_SENDER_NAME);
        assert_eq!(config.airtable_api_url, DEFAULT_AIRTABLE_API_URL);
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_bad_urls() {
        let mut config = TomlConfig::default();
        config.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = TomlConfig::default();
        config.mailersend_api_url = "mailersend.com".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = TomlConfig::default();
        config.email_log_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_path_wins() {
        let path = PathBuf::from("/tmp/roundup-explicit.toml");
        assert_eq!(resolve_config_path(Some(&path)), Some(path));
    }
}
