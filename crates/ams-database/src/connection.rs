//! PostgreSQL pool for the AMS schema.

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{info, warn};

use ams_core::config::DatabaseConfig;
use ams_core::error::{AppError, ErrorKind};
use ams_core::result::AppResult;

/// Schema migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Tables the authentication flows cannot run without.
const REQUIRED_TABLES: [&str; 3] = ["users", "api_keys", "refresh_tokens"];

/// Shared handle to the AMS database.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Opens the pool and, when `run_migrations` is set, brings the schema
    /// up to date.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        config.validate()?;

        let options = PgConnectOptions::from_str(&config.url).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid database.url", e)
        })?;

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
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to connect", e))?;

        let db = Self { pool };
        if config.run_migrations {
            db.migrate().await?;
        } else {
            warn!("Automatic migrations disabled; relying on an existing schema");
        }
        Ok(db)
    }

    /// Wraps an existing pool without touching the schema.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies pending migrations.
    pub async fn migrate(&self) -> AppResult<()> {
        MIGRATOR.run(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to run migrations", e)
        })?;
        info!("Database schema is up to date");
        Ok(())
    }

    /// Succeeds when the database answers and every table the auth flows
    /// read and write exists.
    pub async fn health_check(&self) -> AppResult<()> {
        let missing: Vec<String> = sqlx::query_scalar(
            "SELECT t FROM UNNEST($1::text[]) AS t WHERE to_regclass(t) IS NULL",
        )
        .bind(&REQUIRED_TABLES[..])
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))?;

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::database(format!(
                "Missing tables: {}",
                missing.join(", ")
            )))
        }
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
