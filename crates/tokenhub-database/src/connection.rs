//! PostgreSQL connection pool management.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use tokenhub_core::config::DatabaseConfig;
use tokenhub_core::error::{AppError, ErrorKind};

/// `application_name` reported to PostgreSQL by every pooled connection.
const APPLICATION_NAME: &str = "tokenhub";

/// Tables the session engine reads and writes.
const REQUIRED_TABLES: [&str; 2] = ["users", "refresh_tokens"];

/// Outcome of [`DatabasePool::health_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Reachable, and every table the stores need exists.
    Ready,
    /// Reachable, but `migrate run` has not created the schema yet.
    MigrationsPending,
}

/// Wrapper around the sqlx PostgreSQL connection pool.
///
/// Constructed once at startup and cloned into every repository; there is
/// no process-wide connection singleton.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    /// The underlying sqlx connection pool.
    pool: PgPool,
}

impl DatabasePool {
    /// Create a new database pool from configuration.
    ///
    /// A malformed URL is a `Configuration` error and never reaches the network.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let options = connect_options(config)?;

        info!(
            host = options.get_host(),
            port = options.get_port(),
            database = options.get_database().unwrap_or_default(),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        Ok(Self { pool })
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trips to the server and reports whether the schema is in place.
    pub async fn health_check(&self) -> Result<SchemaStatus, AppError> {
        let present: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = ANY($1)",
        )
        .bind(&REQUIRED_TABLES[..])
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))?;

        Ok(if present == REQUIRED_TABLES.len() as i64 {
            SchemaStatus::Ready
        } else {
            SchemaStatus::MigrationsPending
        })
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Parses `database.url` and tags connections with [`APPLICATION_NAME`].
fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, AppError> {
    config.validate()?;
    let options: PgConnectOptions = config.url.parse().map_err(|e| {
        AppError::with_source(
            ErrorKind::Configuration,
            "database.url is not a valid PostgreSQL connection URL",
            e,
        )
    })?;
    Ok(options.application_name(APPLICATION_NAME))
}
