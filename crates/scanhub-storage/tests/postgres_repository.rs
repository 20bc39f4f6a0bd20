#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! PostgreSQL repository tests.
//!
//! Run only when `SCANHUB_TEST_POSTGRES_URL` points at a disposable database.

mod common;

use scanhub_core::{BackendHandle, RequestContext, ScanInfosRepository, StorageError};
use scanhub_storage::postgres::{PostgresHandler, PostgresScanInfosRepository};

async fn repository() -> Option<(PostgresHandler, PostgresScanInfosRepository)> {
    let Ok(url) = std::env::var("SCANHUB_TEST_POSTGRES_URL") else {
        eprintln!("SCANHUB_TEST_POSTGRES_URL not set, skipping");
        return None;
    };
    let handler = PostgresHandler::connect_dsn(&url).await.unwrap();
    let repo = PostgresScanInfosRepository::new(handler.pool().clone());
    Some((handler, repo))
}

#[tokio::test]
async fn save_then_find_round_trips() {
    let Some((_handler, repo)) = repository().await else {
        return;
    };
    let ctx = RequestContext::generate();
    let record = common::sample_scan_infos("pg-round-trip");

    let id = repo.save(&ctx, record.clone()).await.unwrap();
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    let found = repo.find_by_id(&ctx, &id).await.unwrap();
    assert_eq!(found.id, id);
    assert_eq!(found.username, record.username);
    assert_eq!(found.results, record.results);
    assert_eq!(found.metadata, record.metadata);

    let all = repo.find_all(&ctx).await.unwrap();
    assert!(all.iter().any(|r| r.id == id));

    repo.delete_by_id(&ctx, &id).await.unwrap();
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_created_at() {
    let Some((_handler, repo)) = repository().await else {
        return;
    };
    let ctx = RequestContext::generate();
    let id = repo
        .save(&ctx, common::sample_scan_infos("pg-update"))
        .await
        .unwrap();
    let before = repo.find_by_id(&ctx, &id).await.unwrap();

    let mut changed = before.clone();
    changed.commit_id = "def456".to_string();
    changed.results = vec!["2 findings".to_string()];
    changed.error = "timeout".to_string();
    repo.update_by_id(&ctx, &id, changed).await.unwrap();

    let after = repo.find_by_id(&ctx, &id).await.unwrap();
    assert_eq!(after.commit_id, "def456");
    assert_eq!(after.results, vec!["2 findings".to_string()]);
    assert_eq!(after.error, "timeout");
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at >= before.updated_at);

    repo.delete_by_id(&ctx, &id).await.unwrap();
}

#[tokio::test]
async fn missing_records_and_repeated_deletes() {
    let Some((handler, repo)) = repository().await else {
        return;
    };
    let ctx = RequestContext::generate();
    let id = uuid::Uuid::new_v4().to_string();

    assert!(matches!(
        repo.find_by_id(&ctx, &id).await,
        Err(StorageError::NotFound(_))
    ));
    repo.delete_by_id(&ctx, &id).await.unwrap();
    repo.delete_by_id(&ctx, &id).await.unwrap();
    assert!(matches!(
        repo.find_by_id(&ctx, "not-a-uuid").await,
        Err(StorageError::InvalidId(_))
    ));

    assert_eq!(handler.name(), "postgres");
    handler.check().await.unwrap();
}
