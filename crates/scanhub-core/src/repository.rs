//! Backend-agnostic persistence contract for scan infos.
//!
//! Exactly one implementation is selected at startup. Implementations wrap
//! every backend failure in a [`StorageError`] carrying an operation-specific
//! context message; they never retry and never log business errors.

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::domain::ScanInfos;

/// Errors returned by repository backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("{context}: {source}")]
    Query {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Health check failed: {0}")]
    Unhealthy(String),
}

impl StorageError {
    /// Wrap a backend error with the operation it interrupted.
    pub fn query(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Query {
            context: context.into(),
            source: source.into(),
        }
    }
}

#[async_trait]
pub trait ScanInfosRepository: Send + Sync {
    /// Persist a new record and return the identifier the backend assigned.
    async fn save(&self, ctx: &RequestContext, scan_infos: ScanInfos)
    -> Result<String, StorageError>;

    async fn find_by_id(&self, ctx: &RequestContext, id: &str) -> Result<ScanInfos, StorageError>;

    async fn find_all(&self, ctx: &RequestContext) -> Result<Vec<ScanInfos>, StorageError>;

    /// Replace every mutable field of the record. `id` and `created_at` are
    /// never modified and `updated_at` is refreshed by the backend.
    async fn update_by_id(
        &self,
        ctx: &RequestContext,
        id: &str,
        scan_infos: ScanInfos,
    ) -> Result<(), StorageError>;

    /// Delete a record. Deleting a missing id is not an error.
    async fn delete_by_id(&self, ctx: &RequestContext, id: &str) -> Result<(), StorageError>;
}

/// Lifecycle of the connection behind a repository.
#[async_trait]
pub trait BackendHandle: Send + Sync {
    /// Backend kind as reported by the status endpoint.
    fn name(&self) -> &'static str;

    /// Probe backend reachability.
    async fn check(&self) -> Result<(), StorageError>;

    /// Close the underlying connections.
    async fn shutdown(&self) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_keeps_context_and_source() {
        let io = std::io::Error::other("connection reset");
        let err = StorageError::query("could not save scan infos", io);
        assert_eq!(err.to_string(), "could not save scan infos: connection reset");
        assert!(std::error::Error::source(&err).is_some());
    }
}
