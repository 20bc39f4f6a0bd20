//! `scanhub` persistence backends.
//!
//! One backend is selected at startup from [`Config::database`]:
//! - `postgres`: sqlx pool over the `data.scan_infos` table
//! - `mongo`: `scan_infos` collection with client-generated UUID ids
//! - `mockdb`: no-op stub for local runs

pub mod mockdb;
pub mod mongo;
pub mod postgres;

use std::sync::Arc;

use scanhub_core::config::{Config, DatabaseKind};
use scanhub_core::{BackendHandle, ScanInfosRepository, StorageError};
use tracing::info;

/// Repository and lifecycle handle of the selected backend.
#[derive(Clone)]
pub struct Backend {
    pub repository: Arc<dyn ScanInfosRepository>,
    pub handle: Arc<dyn BackendHandle>,
}

impl Backend {
    /// The no-op mock backend.
    pub fn mock() -> Self {
        Self {
            repository: Arc::new(mockdb::MockScanInfosRepository),
            handle: Arc::new(mockdb::MockHandler),
        }
    }
}

/// Connect to the backend named by `config.database`.
///
/// PostgreSQL migrations are applied before returning.
pub async fn connect(config: &Config) -> Result<Backend, StorageError> {
    let backend = match config.database {
        DatabaseKind::Postgres => {
            let handler = postgres::PostgresHandler::connect(&config.db_postgres).await?;
            Backend {
                repository: Arc::new(postgres::PostgresScanInfosRepository::new(handler.pool().clone())),
                handle: Arc::new(handler),
            }
        }
        DatabaseKind::Mongo => {
            let handler = mongo::MongoHandler::connect(&config.db_mongo).await?;
            Backend {
                repository: Arc::new(mongo::MongoScanInfosRepository::new(handler.database())),
                handle: Arc::new(handler),
            }
        }
        DatabaseKind::MockDb => Backend::mock(),
    };
    info!(database = %config.database, "storage backend ready");
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mockdb_connects_without_a_server() {
        let mut config = Config::default();
        config.database = DatabaseKind::MockDb;
        let backend = connect(&config).await.unwrap();
        assert_eq!(backend.handle.name(), "mockdb");
        assert!(backend.handle.check().await.is_ok());
    }
}
