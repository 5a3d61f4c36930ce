//! Environment-driven configuration.
//!
//! Values are read once at startup. Required values that are absent and
//! values that fail to parse are reported through [`ConfigError`].
//!
//! | Variable | Default |
//! | --- | --- |
//! | `DATABASE_URL` | required |
//! | `PROJECTIQ_POOL_SIZE` | `10` |
//! | `PROJECTIQ_REPOSITION_WAIT_MS` | `5000` |
//! | `PROJECTIQ_REPOSITION_TIMEOUT_MS` | `20000` |

use crate::task::adapters::postgres::RepositionBudget;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Database connection string.
pub const DATABASE_URL: &str = "DATABASE_URL";
/// Maximum number of pooled connections.
pub const POOL_SIZE: &str = "PROJECTIQ_POOL_SIZE";
/// Pool checkout budget for reposition transactions, in milliseconds.
pub const REPOSITION_WAIT_MS: &str = "PROJECTIQ_REPOSITION_WAIT_MS";
/// Statement and lock timeout for reposition transactions, in milliseconds.
pub const REPOSITION_TIMEOUT_MS: &str = "PROJECTIQ_REPOSITION_TIMEOUT_MS";

const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_REPOSITION_WAIT_MS: u64 = 5_000;
const DEFAULT_REPOSITION_TIMEOUT_MS: u64 = 20_000;

/// Errors returned while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing environment variable: {0}")]
    Missing(&'static str),

    /// A variable is set to a value that cannot be used.
    #[error("invalid value for {key}: {message}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIqConfig {
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub pool_size: u32,
    /// Limits applied to reposition transactions.
    pub reposition_budget: RepositionBudget,
}

impl ProjectIqConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `DATABASE_URL` is unset and
    /// [`ConfigError::Invalid`] when a value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL))?;

        let pool_size = parse_or(&lookup, POOL_SIZE, DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid {
                key: POOL_SIZE,
                message: "must be at least 1".to_owned(),
            });
        }

        let wait_ms = positive_millis(&lookup, REPOSITION_WAIT_MS, DEFAULT_REPOSITION_WAIT_MS)?;
        let timeout_ms =
            positive_millis(&lookup, REPOSITION_TIMEOUT_MS, DEFAULT_REPOSITION_TIMEOUT_MS)?;

        Ok(Self {
            database_url,
            pool_size,
            reposition_budget: RepositionBudget::new(
                Duration::from_millis(wait_ms),
                Duration::from_millis(timeout_ms),
            ),
        })
    }
}

/// Parses a millisecond budget. Zero is rejected: the pool cannot wait zero
/// time and `PostgreSQL` reads a zero statement timeout as "no limit".
fn positive_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    let millis = parse_or(lookup, key, default)?;
    if millis == 0 {
        return Err(ConfigError::Invalid {
            key,
            message: "must be at least 1 millisecond".to_owned(),
        });
    }
    Ok(millis)
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            key,
            message: err.to_string(),
        }),
    }
}
