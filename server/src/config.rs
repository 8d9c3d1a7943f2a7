//! Server configuration module.
//!
//! This module provides configuration loading for the lineage server from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `LINEAGE_DATABASE_URL`: Connection URL of the lineage store (default: `postgres:///vagrant`)
//! - `LINEAGE_LISTEN_PORT`: Port to listen on (default: `5000`)
//! - `LINEAGE_INDEX_PATH`: Static front-end asset served at `/` (default: `index.html`)
//! - `LINEAGE_MAX_CONNECTIONS`: Size of the connection pool (default: `8`)
//! - `LINEAGE_ACQUIRE_TIMEOUT_MS`: How long a request waits for a pooled connection (default: `3000`)
//! - `LINEAGE_REQUEST_TIMEOUT_MS`: Upper bound on the work done for one request (default: `10000`)
//! - `LINEAGE_MAX_CONCURRENT_QUERIES`: Per-request bound on concurrent collection reads (default: `4`)
//!
//! # Invariants
//!
//! - `listen_port` is always a valid port number
//! - `max_connections`, `max_concurrent_queries` and `request_timeout` are never zero

use std::path::PathBuf;
use std::time::Duration;

use crate::store::StoreOptions;

/// Server configuration.
///
/// # Post-conditions
///
/// When constructed via `from_env()` every numeric setting has been parsed
/// and range-checked.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Connection URL of the lineage store. Never logged, it may carry credentials.
    pub database_url: String,
    /// Port to listen on for HTTP requests.
    pub listen_port: u16,
    /// Path of the static front-end asset.
    pub index_path: PathBuf,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// How long a request may wait for a pooled connection.
    pub acquire_timeout: Duration,
    /// Upper bound on the time spent serving one request.
    pub request_timeout: Duration,
    /// Maximum number of collection reads one request runs concurrently.
    pub max_concurrent_queries: usize,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: Self::DEFAULT_DATABASE_URL.to_string(),
            listen_port: Self::DEFAULT_PORT,
            index_path: PathBuf::from(Self::DEFAULT_INDEX_PATH),
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_millis(Self::DEFAULT_ACQUIRE_TIMEOUT_MS),
            request_timeout: Duration::from_millis(Self::DEFAULT_REQUEST_TIMEOUT_MS),
            max_concurrent_queries: Self::DEFAULT_MAX_CONCURRENT_QUERIES,
        }
    }
}

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 5000;
    /// Default store URL.
    pub const DEFAULT_DATABASE_URL: &'static str = "postgres:///vagrant";
    /// Default location of the front-end asset.
    pub const DEFAULT_INDEX_PATH: &'static str = "index.html";
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;
    pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 3000;
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
    pub const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 4;

    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; unset variables fall back to the defaults
    /// listed in the module documentation.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed, or if a
    /// count or timeout is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// `from_env` is a thin wrapper over this; tests feed it a map instead of
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("LINEAGE_DATABASE_URL")
            .unwrap_or_else(|| Self::DEFAULT_DATABASE_URL.to_string());
        if database_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "LINEAGE_DATABASE_URL".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        let index_path = lookup("LINEAGE_INDEX_PATH")
            .map_or_else(|| PathBuf::from(Self::DEFAULT_INDEX_PATH), PathBuf::from);

        let listen_port = parse_var(
            "LINEAGE_LISTEN_PORT",
            lookup("LINEAGE_LISTEN_PORT"),
            Self::DEFAULT_PORT,
        )?;
        let max_connections = parse_nonzero(
            "LINEAGE_MAX_CONNECTIONS",
            lookup("LINEAGE_MAX_CONNECTIONS"),
            Self::DEFAULT_MAX_CONNECTIONS,
        )?;
        let acquire_timeout_ms = parse_var(
            "LINEAGE_ACQUIRE_TIMEOUT_MS",
            lookup("LINEAGE_ACQUIRE_TIMEOUT_MS"),
            Self::DEFAULT_ACQUIRE_TIMEOUT_MS,
        )?;
        let request_timeout_ms = parse_nonzero(
            "LINEAGE_REQUEST_TIMEOUT_MS",
            lookup("LINEAGE_REQUEST_TIMEOUT_MS"),
            Self::DEFAULT_REQUEST_TIMEOUT_MS,
        )?;
        let max_concurrent_queries = parse_nonzero(
            "LINEAGE_MAX_CONCURRENT_QUERIES",
            lookup("LINEAGE_MAX_CONCURRENT_QUERIES"),
            Self::DEFAULT_MAX_CONCURRENT_QUERIES,
        )?;

        Ok(Self {
            database_url,
            listen_port,
            index_path,
            max_connections,
            acquire_timeout: Duration::from_millis(acquire_timeout_ms),
            request_timeout: Duration::from_millis(request_timeout_ms),
            max_concurrent_queries,
        })
    }

    /// Pool settings derived from this configuration.
    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            url: self.database_url.clone(),
            max_connections: self.max_connections,
            acquire_timeout: self.acquire_timeout,
        }
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<T: std::str::FromStr>(
    name: &str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("'{value}' is not a valid number"),
        }),
        None => Ok(default),
    }
}

/// Like `parse_var`, but zero is rejected.
fn parse_nonzero<T>(name: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Default + PartialEq,
{
    let parsed = parse_var(name, value, default)?;
    if parsed == T::default() {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(parsed)
}
