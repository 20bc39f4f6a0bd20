//! Scan infos use cases: a delegation layer over the selected repository.

use std::sync::Arc;

use crate::context::RequestContext;
use crate::domain::{ScanInfos, StoreScanInfosRequest};
use crate::repository::{ScanInfosRepository, StorageError};

#[derive(Clone)]
pub struct ScanInfosUsecase {
    repo: Arc<dyn ScanInfosRepository>,
}

impl ScanInfosUsecase {
    pub fn new(repo: Arc<dyn ScanInfosRepository>) -> Self {
        Self { repo }
    }

    pub async fn store(
        &self,
        ctx: &RequestContext,
        request: StoreScanInfosRequest,
    ) -> Result<String, StorageError> {
        self.repo.save(ctx, request.into_scan_infos()).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<ScanInfos, StorageError> {
        self.repo.find_by_id(ctx, id).await
    }

    pub async fn get_all(&self, ctx: &RequestContext) -> Result<Vec<ScanInfos>, StorageError> {
        self.repo.find_all(ctx).await
    }

    /// Update the record identified by `scan_infos.id`.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        scan_infos: ScanInfos,
    ) -> Result<(), StorageError> {
        let id = scan_infos.id.clone();
        self.repo.update_by_id(ctx, &id, scan_infos).await
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), StorageError> {
        self.repo.delete_by_id(ctx, id).await
    }
}
