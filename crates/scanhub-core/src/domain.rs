//! Scan infos domain model.
//!
//! A [`ScanInfos`] record describes one repository scan reported by a client.
//! Clients create records through a [`StoreScanInfosRequest`]; the identifier
//! and both server timestamps are never taken from the client on creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Open-ended metadata attached to a scan.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A persisted scan infos record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanInfos {
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
    /// Server-assigned at insert, never read from request bodies.
    #[serde(skip_deserializing)]
    pub created_at: DateTime<Utc>,
    /// Server-assigned on every mutation, never read from request bodies.
    #[serde(skip_deserializing)]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub error: String,
    pub metadata: Metadata,
}

/// Client payload for creating a scan infos record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreScanInfosRequest {
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
    #[serde(default)]
    pub error: String,
    pub metadata: Metadata,
}

impl StoreScanInfosRequest {
    /// Turn the request into a record ready to be saved.
    ///
    /// Both timestamps receive the same current UTC instant and the id is
    /// left empty for the repository to assign.
    pub fn into_scan_infos(self) -> ScanInfos {
        let now = Utc::now();
        ScanInfos {
            id: String::new(),
            company_id: self.company_id,
            username: self.username,
            client_id: self.client_id,
            repository_url: self.repository_url,
            commit_id: self.commit_id,
            tag_id: self.tag_id,
            results: self.results,
            started_at: self.started_at,
            completed_at: self.completed_at,
            sent_at: self.sent_at,
            created_at: now,
            updated_at: now,
            error: self.error,
            metadata: self.metadata,
        }
    }
}

/// Client input that fails the presence or format rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid scan infos id '{id}': {reason}")]
    InvalidId { id: String, reason: String },
}

/// Presence rules applied to decoded request bodies.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for StoreScanInfosRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        check_required(
            [
                ("company_id", &self.company_id),
                ("username", &self.username),
                ("client_id", &self.client_id),
                ("repository_url", &self.repository_url),
                ("commit_id", &self.commit_id),
                ("tag_id", &self.tag_id),
            ],
            [
                ("started_at", self.started_at),
                ("completed_at", self.completed_at),
                ("sent_at", self.sent_at),
            ],
        )
    }
}

impl Validate for ScanInfos {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingFields(vec!["id"]));
        }
        parse_scan_infos_id(&self.id)?;
        check_required(
            [
                ("company_id", &self.company_id),
                ("username", &self.username),
                ("client_id", &self.client_id),
                ("repository_url", &self.repository_url),
                ("commit_id", &self.commit_id),
                ("tag_id", &self.tag_id),
            ],
            [
                ("started_at", self.started_at),
                ("completed_at", self.completed_at),
                ("sent_at", self.sent_at),
            ],
        )
    }
}

/// Parse a client-supplied identifier, which must be a UUID.
pub fn parse_scan_infos_id(raw: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw).map_err(|e| ValidationError::InvalidId {
        id: raw.to_string(),
        reason: e.to_string(),
    })
}

// A blank string or a zero timestamp counts as absent.
fn check_required(
    strings: [(&'static str, &String); 6],
    timestamps: [(&'static str, i64); 3],
) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = strings
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .chain(
            timestamps
                .iter()
                .filter(|(_, value)| *value == 0)
                .map(|(name, _)| *name),
        )
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}
