//! Configuration management for the climate API
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::ClimateError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Date format used by the observation store
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Root configuration structure for the climate API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClimateApiConfig {
    /// Backing store configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Fixed query windows used by the list routes
    #[serde(default)]
    pub queries: QueryConfig,
}

/// Backing store configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL of the observation database
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum number of pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Seconds a request waits to check out a connection
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u32,
}

/// HTTP server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
    /// PEM certificate chain, enables HTTPS together with `tls_key_path`
    #[serde(default)]
    pub tls_cert_path: Option<PathBuf>,
    /// PEM private key
    #[serde(default)]
    pub tls_key_path: Option<PathBuf>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Fixed date windows for the precipitation and tobs routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_precipitation_range")]
    pub precipitation: DateRange,
    #[serde(default = "default_tobs_range")]
    pub tobs: DateRange,
}

/// Inclusive range of `YYYY-MM-DD` dates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Check that both bounds are calendar dates and the range is not inverted
    pub fn validate(&self, name: &str) -> Result<()> {
        let start = parse_date(name, "start", &self.start)?;
        let end = parse_date(name, "end", &self.end)?;
        if start > end {
            return Err(ClimateError::config(format!(
                "Query range '{name}' starts after it ends ({} > {})",
                self.start, self.end
            ))
            .into());
        }
        Ok(())
    }
}

fn parse_date(name: &str, bound: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        ClimateError::config(format!(
            "Query range '{name}' has an invalid {bound} date '{value}', expected YYYY-MM-DD"
        ))
        .into()
    })
}

// Default value functions
fn default_database_url() -> String {
    "sqlite://Resources/hawaii.sqlite".to_string()
}

fn default_max_connections() -> u32 {
    4
}

fn default_acquire_timeout() -> u32 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_precipitation_range() -> DateRange {
    DateRange::new("2016-01-01", "2016-01-01")
}

fn default_tobs_range() -> DateRange {
    DateRange::new("2016-01-01", "2017-01-01")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
        }
    }
}

impl DatabaseConfig {
    /// Connection checkout timeout
    #[must_use]
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds.into())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl ServerConfig {
    /// Address the listener binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Certificate and key paths, when HTTPS is configured
    #[must_use]
    pub fn tls_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.tls_cert_path.as_ref().zip(self.tls_key_path.as_ref())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            precipitation: default_precipitation_range(),
            tobs: default_tobs_range(),
        }
    }
}

impl ClimateApiConfig {
    /// Load configuration from the given file, or the default locations,
    /// then overlay `CLIMATE_` environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Explicit path, then the user config dir, then the working directory
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // CLIMATE_DATABASE__URL, CLIMATE_SERVER__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("CLIMATE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ClimateApiConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("climate-api").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.database.url.is_empty() {
            self.database.url = default_database_url();
        }
        if self.database.max_connections == 0 {
            self.database.max_connections = default_max_connections();
        }
        if self.database.acquire_timeout_seconds == 0 {
            self.database.acquire_timeout_seconds = default_acquire_timeout();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_database()?;
        self.validate_server()?;
        self.validate_string_values()?;
        self.queries.precipitation.validate("precipitation")?;
        self.queries.tobs.validate("tobs")?;
        Ok(())
    }

    fn validate_database(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite:") {
            return Err(ClimateError::config(format!(
                "Database URL must be a sqlite: URL, got '{}'",
                self.database.url
            ))
            .into());
        }

        if self.database.max_connections > 64 {
            return Err(
                ClimateError::config("Database max connections cannot exceed 64").into(),
            );
        }

        if self.database.acquire_timeout_seconds > 300 {
            return Err(ClimateError::config(
                "Database acquire timeout cannot exceed 300 seconds",
            )
            .into());
        }

        Ok(())
    }

    fn validate_server(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ClimateError::config("Server port cannot be 0").into());
        }

        match (&self.server.tls_cert_path, &self.server.tls_key_path) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(ClimateError::config(
                    "TLS requires both tls_cert_path and tls_key_path",
                )
                .into());
            }
            (Some(_), Some(_)) if !cfg!(feature = "tls") => {
                return Err(ClimateError::config(
                    "TLS paths are configured but the binary was built without the 'tls' feature",
                )
                .into());
            }
            _ => {}
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ClimateError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ClimateError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
