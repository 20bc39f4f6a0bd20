use chrono::{DateTime, Utc};
use mongodb::bson;
use scanhub_core::ScanInfos;
use scanhub_core::domain::Metadata;
use serde::{Deserialize, Serialize};

/// Stored shape of a scan infos record, keyed by `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct ScanInfosDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub company_id: String,
    pub username: String,
    pub client_id: String,
    pub repository_url: String,
    pub commit_id: String,
    pub tag_id: String,
    pub results: Vec<String>,
    pub started_at: i64,
    pub completed_at: i64,
    pub sent_at: i64,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
    #[serde(default)]
    pub error: String,
    pub metadata: Metadata,
}

impl ScanInfosDocument {
    pub fn from_scan_infos(id: String, scan_infos: ScanInfos) -> Self {
        Self {
            id,
            company_id: scan_infos.company_id,
            username: scan_infos.username,
            client_id: scan_infos.client_id,
            repository_url: scan_infos.repository_url,
            commit_id: scan_infos.commit_id,
            tag_id: scan_infos.tag_id,
            results: scan_infos.results,
            started_at: scan_infos.started_at,
            completed_at: scan_infos.completed_at,
            sent_at: scan_infos.sent_at,
            created_at: to_bson_datetime(scan_infos.created_at),
            updated_at: to_bson_datetime(scan_infos.updated_at),
            error: scan_infos.error,
            metadata: scan_infos.metadata,
        }
    }

    /// `$set` body replacing every mutable field.
    ///
    /// `_id` and `created_at` are left out so an update never touches them.
    pub fn replacement(self, updated_at: DateTime<Utc>) -> Result<bson::Document, bson::ser::Error> {
        let mut fields = bson::to_document(&Self {
            updated_at: to_bson_datetime(updated_at),
            ..self
        })?;
        fields.remove("_id");
        fields.remove("created_at");
        Ok(fields)
    }
}

impl From<ScanInfosDocument> for ScanInfos {
    fn from(doc: ScanInfosDocument) -> Self {
        Self {
            id: doc.id,
            company_id: doc.company_id,
            username: doc.username,
            client_id: doc.client_id,
            repository_url: doc.repository_url,
            commit_id: doc.commit_id,
            tag_id: doc.tag_id,
            results: doc.results,
            started_at: doc.started_at,
            completed_at: doc.completed_at,
            sent_at: doc.sent_at,
            created_at: from_bson_datetime(doc.created_at),
            updated_at: from_bson_datetime(doc.updated_at),
            error: doc.error,
            metadata: doc.metadata,
        }
    }
}

fn to_bson_datetime(value: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(value.timestamp_millis())
}

fn from_bson_datetime(value: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}
