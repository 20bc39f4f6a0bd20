use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::doc;
use mongodb::{Collection, Database};
use scanhub_core::{RequestContext, ScanInfos, ScanInfosRepository, StorageError};
use tracing::debug;
use uuid::Uuid;

use super::document::ScanInfosDocument;

pub const COLLECTION_NAME: &str = "scan_infos";

/// Scan infos stored as documents keyed by a client-generated UUID.
#[derive(Clone)]
pub struct MongoScanInfosRepository {
    collection: Collection<ScanInfosDocument>,
}

impl MongoScanInfosRepository {
    pub fn new(database: Database) -> Self {
        Self {
            collection: database.collection(COLLECTION_NAME),
        }
    }
}

#[async_trait]
impl ScanInfosRepository for MongoScanInfosRepository {
    async fn save(
        &self,
        ctx: &RequestContext,
        scan_infos: ScanInfos,
    ) -> Result<String, StorageError> {
        let id = Uuid::new_v4().to_string();
        let document = ScanInfosDocument::from_scan_infos(id.clone(), scan_infos);
        self.collection
            .insert_one(document)
            .await
            .map_err(|e| StorageError::query("could not save scan infos", e))?;

        debug!(request_id = %ctx.request_id(), %id, "scan infos inserted");
        Ok(id)
    }

    async fn find_by_id(&self, _ctx: &RequestContext, id: &str) -> Result<ScanInfos, StorageError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| StorageError::query(format!("could not find scan infos with ID: {id}"), e))?
            .map(ScanInfos::from)
            .ok_or_else(|| StorageError::NotFound(format!("scan infos with ID: {id}")))
    }

    async fn find_all(&self, _ctx: &RequestContext) -> Result<Vec<ScanInfos>, StorageError> {
        let context = "could not find all scan infos";
        let mut cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "created_at": 1 })
            .await
            .map_err(|e| StorageError::query(context, e))?;

        let mut all = Vec::new();
        while cursor
            .advance()
            .await
            .map_err(|e| StorageError::query(context, e))?
        {
            let document = cursor
                .deserialize_current()
                .map_err(|e| StorageError::query(context, e))?;
            all.push(ScanInfos::from(document));
        }
        Ok(all)
    }

    async fn update_by_id(
        &self,
        _ctx: &RequestContext,
        id: &str,
        scan_infos: ScanInfos,
    ) -> Result<(), StorageError> {
        let context = format!("could not update scan infos with ID: {id}");
        let fields = ScanInfosDocument::from_scan_infos(id.to_string(), scan_infos)
            .replacement(Utc::now())
            .map_err(|e| StorageError::query(context.clone(), e))?;

        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await
            .map_err(|e| StorageError::query(context, e))?;

        if result.matched_count == 0 {
            return Err(StorageError::NotFound(format!("scan infos with ID: {id}")));
        }
        Ok(())
    }

    async fn delete_by_id(&self, _ctx: &RequestContext, id: &str) -> Result<(), StorageError> {
        self.collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| {
                StorageError::query(format!("could not delete scan infos with ID: {id}"), e)
            })?;
        Ok(())
    }
}
