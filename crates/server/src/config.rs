//! Configuration loading and validation for the backend service.
//!
//! All values are read from environment variables at startup. The process
//! exits with a clear error message if `MONGO_URI` is missing or any value is
//! invalid; a missing `PORT` only falls back to [`DEFAULT_PORT`].

use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The environment could not be read or a value could not be parsed.
    #[error("failed to load configuration from environment: {0}")]
    Load(#[from] ::config::ConfigError),

    /// `MONGO_URI` is absent or blank.
    #[error("MONGO_URI is not defined in environment variables")]
    MissingDatabaseUri,

    /// A value was present but outside its allowed range.
    #[error("{name} {reason}")]
    Invalid {
        name: &'static str,
        reason: &'static str,
    },
}

/// Raw view of the environment, before validation.
#[derive(Debug, Clone, Deserialize)]
struct EnvConfig {
    /// MongoDB connection string. **Required.**
    #[serde(default)]
    mongo_uri: Option<String>,

    /// Port the HTTP server listens on.
    #[serde(default)]
    port: Option<u16>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    log_level: String,

    /// Optional OTLP collector endpoint.
    #[serde(default)]
    otel_exporter_otlp_endpoint: Option<String>,

    /// Connect and server-selection timeout for the startup attempt.
    #[serde(default = "default_mongo_connect_timeout")]
    mongo_connect_timeout_secs: u64,

    /// Per-request timeout enforced by middleware.
    #[serde(default = "default_request_timeout")]
    request_timeout_secs: u64,

    /// Upper bound on closing the database during shutdown.
    #[serde(default = "default_shutdown_timeout")]
    shutdown_timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_mongo_connect_timeout() -> u64 {
    10
}
fn default_request_timeout() -> u64 {
    30
}
fn default_shutdown_timeout() -> u64 {
    10
}

/// Validated, immutable service configuration.
#[derive(Clone)]
pub struct Config {
    /// MongoDB connection string.
    pub mongo_uri: String,
    /// Port the HTTP server binds on all interfaces.
    pub port: u16,
    /// `true` when `PORT` was absent and [`DEFAULT_PORT`] is in use.
    pub port_defaulted: bool,
    /// Tracing log level.
    pub log_level: String,
    /// OTLP endpoint; span export is disabled when `None`.
    pub otel_exporter_otlp_endpoint: Option<String>,
    pub mongo_connect_timeout: Duration,
    pub request_timeout: Duration,
    pub shutdown_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The URI may embed credentials; never print it.
        f.debug_struct("Config")
            .field("mongo_uri", &"[REDACTED]")
            .field("port", &self.port)
            .field("port_defaulted", &self.port_defaulted)
            .field("log_level", &self.log_level)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("mongo_connect_timeout", &self.mongo_connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish()
    }
}

/// Settings handed to a [`crate::db::Connector`].
#[derive(Clone)]
pub struct DatabaseSettings {
    pub uri: String,
    pub connect_timeout: Duration,
}

impl Config {
    /// Load and validate configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUri`] if `MONGO_URI` is absent, or
    /// another [`ConfigError`] if any value cannot be parsed or is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(::config::Environment::default())
    }

    /// Load and validate configuration from an explicit environment source.
    pub fn from_source(env: ::config::Environment) -> Result<Self, ConfigError> {
        let raw: EnvConfig = ::config::Config::builder()
            .add_source(env)
            .build()?
            .try_deserialize()?;

        raw.validate()
    }

    /// Socket address the listener binds: all interfaces on [`Config::port`].
    pub fn listen_addr(&self) -> SocketAddr {
        ([0, 0, 0, 0], self.port).into()
    }

    pub fn database(&self) -> DatabaseSettings {
        DatabaseSettings {
            uri: self.mongo_uri.clone(),
            connect_timeout: self.mongo_connect_timeout,
        }
    }
}

impl EnvConfig {
    fn validate(self) -> Result<Config, ConfigError> {
        let mongo_uri = non_blank(self.mongo_uri).ok_or(ConfigError::MissingDatabaseUri)?;

        if self.port == Some(0) {
            return Err(ConfigError::Invalid {
                name: "PORT",
                reason: "must be between 1 and 65535",
            });
        }
        ensure_positive(self.mongo_connect_timeout_secs, "MONGO_CONNECT_TIMEOUT_SECS")?;
        ensure_positive(self.request_timeout_secs, "REQUEST_TIMEOUT_SECS")?;
        ensure_positive(self.shutdown_timeout_secs, "SHUTDOWN_TIMEOUT_SECS")?;

        Ok(Config {
            mongo_uri,
            port: self.port.unwrap_or(DEFAULT_PORT),
            port_defaulted: self.port.is_none(),
            log_level: self.log_level,
            otel_exporter_otlp_endpoint: non_blank(self.otel_exporter_otlp_endpoint),
            mongo_connect_timeout: Duration::from_secs(self.mongo_connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            shutdown_timeout: Duration::from_secs(self.shutdown_timeout_secs),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn ensure_positive(value: u64, name: &'static str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            name,
            reason: "must be > 0",
        });
    }
    Ok(())
}

#[cfg(test)]
impl Config {
    /// Valid configuration pointing at a local database, for tests.
    pub fn for_tests(port: u16) -> Self {
        Self {
            mongo_uri: "mongodb://127.0.0.1:27017".into(),
            port,
            port_defaulted: false,
            log_level: default_log_level(),
            otel_exporter_otlp_endpoint: None,
            mongo_connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(5),
            shutdown_timeout: Duration::from_secs(1),
        }
    }
}
