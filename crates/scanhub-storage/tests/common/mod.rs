//! Fixtures shared by the backend integration tests.

use scanhub_core::{ScanInfos, StoreScanInfosRequest};

pub fn sample_scan_infos(username: &str) -> ScanInfos {
    let request: StoreScanInfosRequest = serde_json::from_value(serde_json::json!({
        "company_id": "0",
        "username": username,
        "client_id": "v1.0.0",
        "repository_url": "https://example.com/r",
        "commit_id": "abc123",
        "tag_id": "v1.0.0",
        "results": ["ok", "no secrets"],
        "started_at": 1000,
        "completed_at": 1002,
        "sent_at": 1003,
        "metadata": {"os": "linux", "cores": 8}
    }))
    .unwrap();
    request.into_scan_infos()
}
