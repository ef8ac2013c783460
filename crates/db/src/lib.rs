//! Storage layer for the FCA audit backend.
//!
//! Owns the Postgres connection pool, schema migrations, and the
//! repositories that map audit documents onto the normalized tables.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

pub mod models;
pub mod repositories;
pub mod transaction;

pub type DbPool = sqlx::PgPool;

/// Default pool size when `DB_MAX_CONNECTIONS` is unset.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
/// Default wait for a pooled connection, in seconds.
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
/// Default server-side statement timeout, in milliseconds.
const DEFAULT_STATEMENT_TIMEOUT_MS: u64 = 10_000;

/// Error raised while reading database configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a positive integer, got '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Connection settings for the Postgres pool.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full connection string, including host and credentials.
    pub database_url: String,
    pub max_connections: u32,
    /// Bound on waiting for a connection from the pool.
    pub acquire_timeout: Duration,
    /// Applied as `statement_timeout` on every connection.
    pub statement_timeout_ms: u64,
}

impl DbConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                   | Default    |
    /// |---------------------------|------------|
    /// | `DATABASE_URL`            | (required) |
    /// | `DB_MAX_CONNECTIONS`      | `10`       |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`        |
    /// | `DB_STATEMENT_TIMEOUT_MS` | `10000`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = env_positive("DB_MAX_CONNECTIONS", u64::from(DEFAULT_MAX_CONNECTIONS))?;
        let acquire_timeout_secs =
            env_positive("DB_ACQUIRE_TIMEOUT_SECS", DEFAULT_ACQUIRE_TIMEOUT_SECS)?;
        let statement_timeout_ms =
            env_positive("DB_STATEMENT_TIMEOUT_MS", DEFAULT_STATEMENT_TIMEOUT_MS)?;

        Ok(Self {
            database_url,
            max_connections: u32::try_from(max_connections).map_err(|_| ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                value: max_connections.to_string(),
            })?,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            statement_timeout_ms,
        })
    }
}

fn env_positive(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(ConfigError::Invalid { name, value: raw }),
        },
    }
}

/// Create the process-wide connection pool.
///
/// Every connection carries a `statement_timeout`, so no statement (and
/// therefore no transaction) can block indefinitely.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    let options = config
        .database_url
        .parse::<PgConnectOptions>()?
        .options([("statement_timeout", config.statement_timeout_ms.to_string())]);

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
