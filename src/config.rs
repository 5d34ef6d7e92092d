//! Configuration management with TOML support
//!
//! The hosting process provides the storage connection settings and the
//! read path's date bounds. Configuration is loaded from (in priority
//! order) the `TELESERIES_CONFIG` environment variable, `./teleseries.toml`,
//! or built-in defaults; every field has a sensible default so a partial
//! file is fine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{TimeWindow, Timestamp};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Storage cluster connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Read-path query bounds
    #[serde(default)]
    pub query: QueryConfig,

    /// Logging settings
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// Storage cluster connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
    /// Cluster notification address
    #[serde(default = "default_host")]
    pub host: String,

    /// Cluster notification port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Cluster name
    #[serde(default = "default_cluster")]
    pub cluster: String,

    /// Username
    #[serde(default = "default_user")]
    pub user: String,

    /// Password
    #[serde(default = "default_user")]
    pub password: String,
}

/// Read-path query bounds
///
/// Bounds accept RFC 3339 timestamps or plain `YYYY-MM-DD` dates; a missing
/// bound leaves that side of the window open.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QueryConfig {
    /// Window start (inclusive); `None` = from the earliest record
    #[serde(default)]
    pub start: Option<String>,

    /// Window end (inclusive); `None` = to the latest record
    #[serde(default)]
    pub end: Option<String>,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions
fn default_host() -> String {
    "239.0.0.1".to_string()
}
fn default_port() -> u16 {
    31999
}
fn default_cluster() -> String {
    "defaultCluster".to_string()
}
fn default_user() -> String {
    "admin".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cluster: default_cluster(),
            user: default_user(),
            password: default_user(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl QueryConfig {
    /// Resolve the configured bounds into a concrete time window
    pub fn window(&self) -> Result<TimeWindow> {
        Ok(TimeWindow {
            start: self.start.as_deref().map(parse_bound).transpose()?,
            end: self.end.as_deref().map(parse_bound).transpose()?,
        })
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&text).map_err(|e| {
            Error::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the environment or well-known paths
    ///
    /// Priority: `TELESERIES_CONFIG` env var, `./teleseries.toml`, defaults.
    pub fn discover() -> Result<Self> {
        if let Ok(path) = std::env::var("TELESERIES_CONFIG") {
            return Self::load(path);
        }
        if Path::new("teleseries.toml").exists() {
            return Self::load("teleseries.toml");
        }
        Ok(Self::default())
    }

    /// Validate field values and the query window
    pub fn validate(&self) -> Result<()> {
        if self.connection.port == 0 {
            return Err(Error::Config("connection.port must be non-zero".to_string()));
        }
        if self.connection.cluster.is_empty() {
            return Err(Error::Config("connection.cluster must not be empty".to_string()));
        }
        let window = self.query.window()?;
        if window.is_inverted() {
            return Err(Error::Config(
                "query.start must not be after query.end".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse one window bound: RFC 3339 first, then plain date at UTC midnight
fn parse_bound(text: &str) -> Result<Timestamp> {
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(text) {
        return Ok(datetime.timestamp_millis());
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::Config(format!("invalid date bound: {text}")))?;
        return Ok(midnight.and_utc().timestamp_millis());
    }
    Err(Error::Config(format!(
        "invalid date bound `{text}` (expected RFC 3339 or YYYY-MM-DD)"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.connection.host, "239.0.0.1");
        assert_eq!(config.connection.port, 31999);
        assert_eq!(config.connection.cluster, "defaultCluster");
        assert_eq!(config.monitoring.log_level, "info");
        assert_eq!(config.query.window().unwrap(), TimeWindow::unbounded());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[connection]
host = "10.0.0.5"
cluster = "sensors"

[query]
start = "2018-06-21"
end = "2018-06-27"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.connection.host, "10.0.0.5");
        assert_eq!(config.connection.cluster, "sensors");
        // Unspecified fields fall back to defaults
        assert_eq!(config.connection.port, 31999);
        assert_eq!(config.connection.user, "admin");

        let window = config.query.window().unwrap();
        assert!(window.start.unwrap() < window.end.unwrap());
    }

    #[test]
    fn test_parse_bound_formats() {
        // Plain date resolves to UTC midnight
        assert_eq!(parse_bound("1970-01-02").unwrap(), 86_400_000);
        // RFC 3339 keeps its offset
        assert_eq!(
            parse_bound("1970-01-01T00:00:01Z").unwrap(),
            1_000
        );
        assert!(parse_bound("June 21st").is_err());
    }

    #[test]
    fn test_inverted_window_fails_validation() {
        let config = Config {
            query: QueryConfig {
                start: Some("2018-06-27".to_string()),
                end: Some("2018-06-21".to_string()),
            },
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "this is not toml [[[").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(Error::Config(_))
        ));
    }
}
