//! Configuration for apar-tracker
//!
//! Two layers:
//! 1. **TOML file**: endpoints, timeouts, logging (optional)
//! 2. **Overrides**: command-line arguments and environment variables
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (--read-url, --write-url)
//! 2. Environment variables (APAR_READ_URL, APAR_WRITE_URL)
//! 3. TOML configuration file
//! 4. Built-in defaults (timeouts and log level only)
//!
//! A missing TOML file is not an error. The endpoints have no built-in
//! default and must come from one of the first three sources.

use apar_common::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Environment variable overriding the read endpoint
pub const READ_URL_ENV: &str = "APAR_READ_URL";
/// Environment variable overriding the write endpoint
pub const WRITE_URL_ENV: &str = "APAR_WRITE_URL";

/// Configuration file as written on disk
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Endpoint serving asset master data and inspection history
    #[serde(default)]
    pub read_url: Option<String>,

    /// Endpoint accepting new inspections
    ///
    /// Falls back to `read_url` when not set.
    #[serde(default)]
    pub write_url: Option<String>,

    /// Base URL for shareable asset links (`<base>?qrcode=<code>`)
    #[serde(default)]
    pub share_base_url: Option<String>,

    /// Client-side request timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Request timeouts in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    /// Single-asset lookup after a scan
    #[serde(default = "default_lookup_secs")]
    pub lookup_secs: u64,

    /// Bulk asset and inspection loads
    #[serde(default = "default_bulk_secs")]
    pub bulk_secs: u64,

    /// Inspection submission
    #[serde(default = "default_submit_secs")]
    pub submit_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            lookup_secs: default_lookup_secs(),
            bulk_secs: default_bulk_secs(),
            submit_secs: default_submit_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_lookup_secs() -> u64 {
    10
}

fn default_bulk_secs() -> u64 {
    15
}

fn default_submit_secs() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML configuration string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load a configuration file
    ///
    /// Returns `Ok(None)` when the file does not exist; a file that exists but
    /// cannot be read or parsed is an error.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content).map(Some)
    }
}

/// Default configuration file location for the platform
///
/// `~/.config/apar-tracker/config.toml` on Linux, the platform config
/// directory elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("apar-tracker").join("config.toml"))
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub read_url: Option<String>,
    pub write_url: Option<String>,
}

/// Client-side timeouts per remote operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteTimeouts {
    pub lookup: Duration,
    pub bulk: Duration,
    pub submit: Duration,
}

impl Default for RemoteTimeouts {
    fn default() -> Self {
        TimeoutConfig::default().into()
    }
}

impl From<TimeoutConfig> for RemoteTimeouts {
    fn from(config: TimeoutConfig) -> Self {
        Self {
            lookup: Duration::from_secs(config.lookup_secs),
            bulk: Duration::from_secs(config.bulk_secs),
            submit: Duration::from_secs(config.submit_secs),
        }
    }
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub read_url: String,
    pub write_url: String,
    pub share_base_url: Option<String>,
    pub timeouts: RemoteTimeouts,
    pub log_level: String,
}

impl TrackerConfig {
    /// Resolve endpoints and timeouts from overrides, environment and TOML
    pub fn resolve(overrides: &ConfigOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let read_url = pick(
            "read_url",
            overrides.read_url.as_deref(),
            READ_URL_ENV,
            toml_config.read_url.as_deref(),
        )
        .ok_or_else(|| {
            Error::Config(format!(
                "Remote endpoint not configured. Please configure using one of:\n\
                 1. Command line: --read-url <url>\n\
                 2. Environment: {}=<url>\n\
                 3. TOML config: read_url = \"<url>\"",
                READ_URL_ENV
            ))
        })?;

        let write_url = match pick(
            "write_url",
            overrides.write_url.as_deref(),
            WRITE_URL_ENV,
            toml_config.write_url.as_deref(),
        ) {
            Some(url) => url,
            None => {
                info!("write_url not configured, submitting to read_url");
                read_url.clone()
            }
        };

        for (name, secs) in [
            ("lookup_secs", toml_config.timeouts.lookup_secs),
            ("bulk_secs", toml_config.timeouts.bulk_secs),
            ("submit_secs", toml_config.timeouts.submit_secs),
        ] {
            if secs == 0 {
                return Err(Error::Config(format!("timeouts.{} must be greater than zero", name)));
            }
        }

        Ok(Self {
            read_url,
            write_url,
            share_base_url: toml_config
                .share_base_url
                .clone()
                .filter(|url| !url.trim().is_empty()),
            timeouts: toml_config.timeouts.clone().into(),
            log_level: toml_config.logging.level.clone(),
        })
    }
}

/// First non-blank value in priority order: argument, environment, TOML
fn pick(name: &str, cli: Option<&str>, env_name: &str, toml_value: Option<&str>) -> Option<String> {
    let non_blank = |value: &str| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    };

    if let Some(value) = cli.and_then(non_blank) {
        info!("{} loaded from command line", name);
        return Some(value);
    }
    if let Some(value) = std::env::var(env_name).ok().as_deref().and_then(non_blank) {
        info!("{} loaded from environment variable {}", name, env_name);
        return Some(value);
    }
    if let Some(value) = toml_value.and_then(non_blank) {
        info!("{} loaded from TOML config", name);
        return Some(value);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.read_url.is_none());
        assert_eq!(config.timeouts.lookup_secs, 10);
        assert_eq!(config.timeouts.bulk_secs, 15);
        assert_eq!(config.timeouts.submit_secs, 15);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_timeouts_keep_other_defaults() {
        let config = TomlConfig::from_toml_str("[timeouts]\nlookup_secs = 3\n").unwrap();
        let timeouts: RemoteTimeouts = config.timeouts.into();
        assert_eq!(timeouts.lookup, Duration::from_secs(3));
        assert_eq!(timeouts.bulk, Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("read_url = [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_cli_override_wins_over_toml() {
        let toml_config = TomlConfig {
            read_url: Some("http://toml.invalid/read".to_string()),
            write_url: Some("http://toml.invalid/write".to_string()),
            ..Default::default()
        };
        let overrides = ConfigOverrides {
            read_url: Some("http://cli.invalid/read".to_string()),
            write_url: Some("http://cli.invalid/write".to_string()),
        };
        let config = TrackerConfig::resolve(&overrides, &toml_config).unwrap();
        assert_eq!(config.read_url, "http://cli.invalid/read");
        assert_eq!(config.write_url, "http://cli.invalid/write");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let toml_config = TomlConfig::from_toml_str(
            "read_url = \"http://toml.invalid\"\n[timeouts]\nbulk_secs = 0\n",
        )
        .unwrap();
        let overrides = ConfigOverrides {
            read_url: Some("http://cli.invalid".to_string()),
            ..Default::default()
        };
        let err = TrackerConfig::resolve(&overrides, &toml_config).unwrap_err();
        assert!(err.to_string().contains("bulk_secs"));
    }
}
