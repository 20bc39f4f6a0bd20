use std::time::Duration;

use async_trait::async_trait;
use scanhub_core::config::PostgresConfig;
use scanhub_core::{BackendHandle, StorageError};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresHandler {
    pool: PgPool,
}

impl PostgresHandler {
    /// Connect with the configured credentials and apply migrations.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, StorageError> {
        let handler = Self::connect_dsn(&config.to_dsn()).await?;
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database_name,
            "PostgreSQL connected"
        );
        Ok(handler)
    }

    /// Connect to `dsn` and apply migrations.
    pub async fn connect_dsn(dsn: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(dsn)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let handler = Self { pool };
        handler.run_migrations().await?;
        Ok(handler)
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))?;

        info!("PostgreSQL migrations complete");
        Ok(())
    }

    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BackendHandle for PostgresHandler {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn check(&self) -> Result<(), StorageError> {
        let ping = sqlx::query("SELECT 1").execute(&self.pool);
        match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, ping).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(StorageError::Unhealthy(e.to_string())),
            Err(_) => Err(StorageError::Unhealthy(format!(
                "no response within {}s",
                HEALTH_CHECK_TIMEOUT.as_secs()
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), StorageError> {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
        Ok(())
    }
}
