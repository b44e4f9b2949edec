//! Runtime configuration for the task board server.
//!
//! Configuration is read from environment variables (a `.env` file is loaded
//! first when present):
//! - `DATABASE_URL` - `PostgreSQL` connection URL. When unset it is assembled
//!   from `DB_HOST`, `DB_USER`, `DB_PASSWORD` and `DB_NAME`, which are then
//!   required (`DB_PASSWORD` may be empty).
//! - `SERVER_HOST` - Optional. Bind address. Defaults to `0.0.0.0`.
//! - `SERVER_PORT` - Optional. Bind port. Defaults to `3001`.
//! - `TASKBOARD_PAGE_SIZE` - Optional. Tasks per listing page. Defaults to `5`.
//! - `TASKBOARD_POOL_SIZE` - Optional. Maximum pooled connections. Defaults
//!   to `10`.
//! - `TASKBOARD_TX_TIMEOUT_MS` - Optional. Bound on lock waits, statements and
//!   pool checkout, in milliseconds. Defaults to `5000`.

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::task::services::DEFAULT_PAGE_SIZE;

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {name}: {reason}")]
    InvalidValue {
        /// Variable name.
        name: String,
        /// Parse failure description.
        reason: String,
    },
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Tasks per listing page.
    pub page_size: usize,
    /// Maximum pooled database connections.
    pub pool_size: u32,
    /// Bound on lock waits, statements and pool checkout.
    pub transaction_timeout: Duration,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(&lookup)?,
        };
        let host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = parse_or(&lookup, "SERVER_PORT", 3001)?;
        let page_size = parse_or(&lookup, "TASKBOARD_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "TASKBOARD_PAGE_SIZE".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        let pool_size = parse_or(&lookup, "TASKBOARD_POOL_SIZE", 10)?;
        let timeout_ms = parse_or(&lookup, "TASKBOARD_TX_TIMEOUT_MS", 5000)?;

        Ok(Self {
            database_url,
            host,
            port,
            page_size,
            pool_size,
            transaction_timeout: Duration::from_millis(timeout_ms),
        })
    }

    /// Returns the `host:port` bind address.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn database_url_from_parts(lookup: &impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    let required = |name: &str| lookup(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_owned()));
    let host = required("DB_HOST")?;
    let user = required("DB_USER")?;
    let name = required("DB_NAME")?;
    let password = lookup("DB_PASSWORD").unwrap_or_default();

    if password.is_empty() {
        return Ok(format!("postgres://{user}@{host}/{name}"));
    }
    Ok(format!("postgres://{user}:{password}@{host}/{name}"))
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|err: T::Err| ConfigError::InvalidValue {
            name: name.to_owned(),
            reason: err.to_string(),
        })
    })
}
