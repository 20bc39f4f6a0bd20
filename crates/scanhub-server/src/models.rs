//! JSON envelopes returned by the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Success envelope carrying the id of the affected record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericResponse {
    pub request_id: String,
    pub message: String,
    pub scan_infos_id: String,
}

/// Success envelope carrying one record or a list of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfosResponse<T> {
    pub request_id: String,
    pub message: String,
    pub infos: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub message: String,
    pub developer_message: String,
}

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub app: String,
    pub git_commit: String,
    pub git_tag: String,
    pub database: String,
    pub is_production: bool,
    pub health: HealthStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"ok"` or `"unavailable"`.
    pub status: String,
    pub checked_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
