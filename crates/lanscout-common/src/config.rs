//! Configuration management for LANScout components

use lanscout_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Probing settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Inventory storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Merge with environment variables (LANSCOUT_ prefix)
    pub fn merge_env(mut self) -> Self {
        // Scan settings
        if let Ok(val) = std::env::var("LANSCOUT_PROBE_TIMEOUT_MS") {
            if let Ok(n) = val.parse() {
                self.scan.probe_timeout_ms = n;
            }
        }
        if let Ok(val) = std::env::var("LANSCOUT_MAX_CONCURRENT_HOSTS") {
            if let Ok(n) = val.parse() {
                self.scan.max_concurrent_hosts = n;
            }
        }
        if let Ok(val) = std::env::var("LANSCOUT_MAX_CONCURRENT_PORTS") {
            if let Ok(n) = val.parse() {
                self.scan.max_concurrent_ports = n;
            }
        }

        // Storage settings
        if let Ok(val) = std::env::var("LANSCOUT_DATABASE_PATH") {
            self.storage.database_path = val;
        }

        // Logging
        if let Ok(val) = std::env::var("LANSCOUT_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("LANSCOUT_LOG_FORMAT") {
            self.logging.format = val;
        }

        self
    }
}

/// Probing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Timeout per probe in milliseconds
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Maximum concurrent host probes during a sweep
    #[serde(default = "default_max_hosts")]
    pub max_concurrent_hosts: usize,

    /// Maximum concurrent port probes against one host
    #[serde(default = "default_max_ports")]
    pub max_concurrent_ports: usize,

    /// Attempt reverse-DNS resolution for responding hosts
    #[serde(default = "default_true")]
    pub resolve_hostnames: bool,
}

fn default_probe_timeout_ms() -> u64 {
    1000
}

fn default_max_hosts() -> usize {
    256
}

fn default_max_ports() -> usize {
    64
}

fn default_true() -> bool {
    true
}

impl ScanConfig {
    /// Per-probe timeout as a Duration
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 1000,
            max_concurrent_hosts: 256,
            max_concurrent_ports: 64,
            resolve_hostnames: true,
        }
    }
}

/// Inventory storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite inventory database
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_database_path() -> String {
    String::from("lanscout.db")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("pretty")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Builder for constructing Config
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn probe_timeout_ms(mut self, ms: u64) -> Self {
        self.config.scan.probe_timeout_ms = ms;
        self
    }

    pub fn max_concurrent_hosts(mut self, n: usize) -> Self {
        self.config.scan.max_concurrent_hosts = n;
        self
    }

    pub fn database_path(mut self, path: impl Into<String>) -> Self {
        self.config.storage.database_path = path.into();
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [scan]
            probe_timeout_ms = 500
            max_concurrent_hosts = 64

            [storage]
            database_path = "/var/lib/lanscout/inventory.db"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.scan.probe_timeout_ms, 500);
        assert_eq!(config.scan.max_concurrent_hosts, 64);
        assert_eq!(config.storage.database_path, "/var/lib/lanscout/inventory.db");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.scan.probe_timeout_ms, 1000);
        assert_eq!(config.scan.max_concurrent_ports, 64);
        assert!(config.scan.resolve_hostnames);
        assert_eq!(config.storage.database_path, "lanscout.db");
        assert_eq!(config.scan.probe_timeout(), Duration::from_millis(1000));
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder()
            .probe_timeout_ms(250)
            .max_concurrent_hosts(32)
            .database_path("/tmp/test.db")
            .log_level("warn")
            .build();

        assert_eq!(config.scan.probe_timeout_ms, 250);
        assert_eq!(config.scan.max_concurrent_hosts, 32);
        assert_eq!(config.storage.database_path, "/tmp/test.db");
        assert_eq!(config.logging.level, "warn");
    }
}
