//! Store configuration loaded from the environment.
//!
//! | Variable | Meaning | Default |
//! | --- | --- | --- |
//! | `FIELDTASK_DATABASE_URL` (or `DATABASE_URL`) | `PostgreSQL` connection URL | required |
//! | `FIELDTASK_POOL_SIZE` | Maximum pooled connections | `10` |
//! | `FIELDTASK_CONNECT_TIMEOUT_SECS` | Connection checkout timeout | `30` |

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;

/// Primary database URL variable.
pub const DATABASE_URL_VAR: &str = "FIELDTASK_DATABASE_URL";
/// Fallback database URL variable.
pub const FALLBACK_DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Pool size variable.
pub const POOL_SIZE_VAR: &str = "FIELDTASK_POOL_SIZE";
/// Connection timeout variable, in seconds.
pub const CONNECT_TIMEOUT_VAR: &str = "FIELDTASK_CONNECT_TIMEOUT_SECS";

const DEFAULT_POOL_SIZE: NonZeroU32 = NonZeroU32::MIN.saturating_add(9);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while loading configuration or building the pool.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No database URL was provided.
    #[error("database URL is not set; export {DATABASE_URL_VAR} or {FALLBACK_DATABASE_URL_VAR}")]
    MissingDatabaseUrl,

    /// A numeric variable could not be parsed.
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },

    /// The connection pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

/// Connection settings for the `PostgreSQL` store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Connection URL.
    pub database_url: String,
    /// Maximum pooled connections.
    pub max_connections: NonZeroU32,
    /// Connection checkout timeout.
    pub connection_timeout: Duration,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("database_url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

impl StoreConfig {
    /// Creates a configuration with default pool settings.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_POOL_SIZE,
            connection_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Loads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL is missing or a numeric value is
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL is missing or a numeric value is
    /// malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| lookup(name).filter(|url| !url.trim().is_empty());
        let database_url = present(DATABASE_URL_VAR)
            .or_else(|| present(FALLBACK_DATABASE_URL_VAR))
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let mut config = Self::new(database_url);
        if let Some(raw) = lookup(POOL_SIZE_VAR) {
            config.max_connections = parse_positive(POOL_SIZE_VAR, &raw)?;
        }
        if let Some(raw) = lookup(CONNECT_TIMEOUT_VAR) {
            config.connection_timeout =
                Duration::from_secs(u64::from(parse_positive(CONNECT_TIMEOUT_VAR, &raw)?.get()));
        }
        Ok(config)
    }

    /// Overrides the database URL.
    #[must_use]
    pub fn with_database_url(mut self, database_url: impl Into<String>) -> Self {
        self.database_url = database_url.into();
        self
    }

    /// Overrides the pool size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNumber`] when `max_connections` is zero.
    pub fn with_max_connections(mut self, max_connections: u32) -> Result<Self, ConfigError> {
        self.max_connections =
            NonZeroU32::new(max_connections).ok_or_else(|| ConfigError::InvalidNumber {
                name: POOL_SIZE_VAR,
                value: max_connections.to_string(),
            })?;
        Ok(self)
    }

    /// Builds a Diesel r2d2 pool for these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when no initial connection can be
    /// established within the timeout.
    pub fn build_pool(&self) -> Result<Pool<ConnectionManager<PgConnection>>, ConfigError> {
        let manager = ConnectionManager::<PgConnection>::new(self.database_url.as_str());
        let pool = Pool::builder()
            .max_size(self.max_connections.get())
            .connection_timeout(self.connection_timeout)
            .build(manager)?;
        tracing::debug!(
            max_connections = self.max_connections.get(),
            "connection pool ready"
        );
        Ok(pool)
    }
}

fn parse_positive(name: &'static str, raw: &str) -> Result<NonZeroU32, ConfigError> {
    raw.trim()
        .parse::<NonZeroU32>()
        .ok()
        .ok_or_else(|| ConfigError::InvalidNumber {
            name,
            value: raw.to_owned(),
        })
}
