use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::{Client, Database};
use scanhub_core::config::MongoConfig;
use scanhub_core::{BackendHandle, StorageError};
use tracing::info;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the MongoDB client and the scanhub database handle.
#[derive(Clone)]
pub struct MongoHandler {
    client: Client,
    database: Database,
}

impl MongoHandler {
    /// Connect with the configured credentials and verify with a ping.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StorageError> {
        let handler = Self::connect_uri(&config.to_dsn(), &config.database_name).await?;
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database_name,
            "MongoDB connected"
        );
        Ok(handler)
    }

    pub async fn connect_uri(uri: &str, database_name: &str) -> Result<Self, StorageError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let handler = Self {
            database: client.database(database_name),
            client,
        };
        handler.ping().await.map_err(StorageError::Connection)?;
        Ok(handler)
    }

    async fn ping(&self) -> Result<(), String> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    pub fn database(&self) -> Database {
        self.database.clone()
    }
}

#[async_trait]
impl BackendHandle for MongoHandler {
    fn name(&self) -> &'static str {
        "mongo"
    }

    async fn check(&self) -> Result<(), StorageError> {
        match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, self.ping()).await {
            Ok(result) => result.map_err(StorageError::Unhealthy),
            Err(_) => Err(StorageError::Unhealthy(format!(
                "no response within {}s",
                HEALTH_CHECK_TIMEOUT.as_secs()
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), StorageError> {
        self.client.clone().shutdown().await;
        info!("MongoDB client closed");
        Ok(())
    }
}
