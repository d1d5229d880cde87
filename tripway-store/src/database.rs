use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use std::time::Duration;
use tracing::info;
use tripway_core::CoreError;

use crate::app_config::DatabaseConfig;

#[derive(Clone)]
pub struct DbClient {
    pub pool: MySqlPool,
}

impl DbClient {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

/// Maps driver errors onto the domain taxonomy. Duplicate keys become `Conflict`
/// carrying `what`, everything else is internal.
pub(crate) fn map_db_error(what: &str, err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            CoreError::Conflict(format!("{} already exists", what))
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            CoreError::Validation(format!("{} references a missing record", what))
        }
        _ => {
            tracing::error!("Database error ({}): {}", what, err);
            CoreError::Internal(err.to_string())
        }
    }
}

pub(crate) fn internal(err: sqlx::Error) -> CoreError {
    tracing::error!("Database error: {}", err);
    CoreError::Internal(err.to_string())
}
