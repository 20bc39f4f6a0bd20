//! No-op backend. Every operation succeeds and returns empty values.

use async_trait::async_trait;
use scanhub_core::{BackendHandle, RequestContext, ScanInfos, ScanInfosRepository, StorageError};

#[derive(Debug, Clone, Copy, Default)]
pub struct MockHandler;

#[async_trait]
impl BackendHandle for MockHandler {
    fn name(&self) -> &'static str {
        "mockdb"
    }

    async fn check(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MockScanInfosRepository;

#[async_trait]
impl ScanInfosRepository for MockScanInfosRepository {
    async fn save(
        &self,
        _ctx: &RequestContext,
        _scan_infos: ScanInfos,
    ) -> Result<String, StorageError> {
        Ok(String::new())
    }

    async fn find_by_id(&self, _ctx: &RequestContext, _id: &str) -> Result<ScanInfos, StorageError> {
        Ok(empty_scan_infos())
    }

    async fn find_all(&self, _ctx: &RequestContext) -> Result<Vec<ScanInfos>, StorageError> {
        Ok(Vec::new())
    }

    async fn update_by_id(
        &self,
        _ctx: &RequestContext,
        _id: &str,
        _scan_infos: ScanInfos,
    ) -> Result<(), StorageError> {
        Ok(())
    }

    async fn delete_by_id(&self, _ctx: &RequestContext, _id: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

fn empty_scan_infos() -> ScanInfos {
    ScanInfos {
        id: String::new(),
        company_id: String::new(),
        username: String::new(),
        client_id: String::new(),
        repository_url: String::new(),
        commit_id: String::new(),
        tag_id: String::new(),
        results: Vec::new(),
        started_at: 0,
        completed_at: 0,
        sent_at: 0,
        created_at: chrono::DateTime::default(),
        updated_at: chrono::DateTime::default(),
        error: String::new(),
        metadata: serde_json::Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_operation_is_a_successful_no_op() {
        let repo = MockScanInfosRepository;
        let ctx = RequestContext::generate();
        let id = "7aec1a3e-f22d-11ec-a1c2-37e6aab6bd2c";

        assert_eq!(repo.save(&ctx, empty_scan_infos()).await.unwrap(), "");
        assert!(repo.find_by_id(&ctx, id).await.unwrap().id.is_empty());
        assert!(repo.find_all(&ctx).await.unwrap().is_empty());
        repo.update_by_id(&ctx, id, empty_scan_infos()).await.unwrap();
        repo.delete_by_id(&ctx, id).await.unwrap();
        repo.delete_by_id(&ctx, id).await.unwrap();
    }

    #[tokio::test]
    async fn handler_is_always_healthy() {
        assert!(MockHandler.check().await.is_ok());
        assert!(MockHandler.shutdown().await.is_ok());
    }
}
