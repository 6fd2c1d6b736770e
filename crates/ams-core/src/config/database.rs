//! Database configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// PostgreSQL settings for the user, API key and refresh token tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` URL.
    pub url: String,
    /// Pool ceiling.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connections kept open while idle.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// How long a request may wait for a pooled connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    /// Idle connections above `min_connections` are closed after this long.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Apply pending schema migrations when the pool is opened.
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Rejects settings the pool cannot be built from.
    pub fn validate(&self) -> AppResult<()> {
        if !(self.url.starts_with("postgres://") || self.url.starts_with("postgresql://")) {
            return Err(AppError::configuration(
                "database.url must be a postgres:// URL",
            ));
        }
        if self.max_connections == 0 {
            return Err(AppError::configuration(
                "database.max_connections must be positive",
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(AppError::configuration(format!(
                "database.min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_run_migrations() -> bool {
    true
}
