use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scanhub_core::domain::Metadata;
use scanhub_core::{RequestContext, ScanInfos, ScanInfosRepository, StorageError};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::debug;
use uuid::Uuid;

/// Scan infos stored in the `data.scan_infos` table.
#[derive(Clone)]
pub struct PostgresScanInfosRepository {
    pool: PgPool,
}

impl PostgresScanInfosRepository {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ScanInfosRow {
    id: Uuid,
    company_id: String,
    username: String,
    client_id: String,
    repository_url: String,
    commit_id: String,
    tag_id: String,
    results: Vec<String>,
    started_at: i64,
    completed_at: i64,
    sent_at: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    error: String,
    metadata: Json<Metadata>,
}

impl From<ScanInfosRow> for ScanInfos {
    fn from(row: ScanInfosRow) -> Self {
        Self {
            id: row.id.to_string(),
            company_id: row.company_id,
            username: row.username,
            client_id: row.client_id,
            repository_url: row.repository_url,
            commit_id: row.commit_id,
            tag_id: row.tag_id,
            results: row.results,
            started_at: row.started_at,
            completed_at: row.completed_at,
            sent_at: row.sent_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            error: row.error,
            metadata: row.metadata.0,
        }
    }
}

fn parse_id(id: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(id).map_err(|e| StorageError::InvalidId(format!("{id}: {e}")))
}

#[async_trait]
impl ScanInfosRepository for PostgresScanInfosRepository {
    async fn save(
        &self,
        ctx: &RequestContext,
        scan_infos: ScanInfos,
    ) -> Result<String, StorageError> {
        let id: Uuid = sqlx::query_scalar(
            r"
            INSERT INTO data.scan_infos (
                company_id, username, client_id, repository_url, commit_id, tag_id,
                results, started_at, completed_at, sent_at,
                created_at, updated_at, error, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            ",
        )
        .bind(scan_infos.company_id)
        .bind(scan_infos.username)
        .bind(scan_infos.client_id)
        .bind(scan_infos.repository_url)
        .bind(scan_infos.commit_id)
        .bind(scan_infos.tag_id)
        .bind(scan_infos.results)
        .bind(scan_infos.started_at)
        .bind(scan_infos.completed_at)
        .bind(scan_infos.sent_at)
        .bind(scan_infos.created_at)
        .bind(scan_infos.updated_at)
        .bind(scan_infos.error)
        .bind(Json(scan_infos.metadata))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::query("could not save scan infos", e))?;

        debug!(request_id = %ctx.request_id(), %id, "scan infos inserted");
        Ok(id.to_string())
    }

    async fn find_by_id(&self, _ctx: &RequestContext, id: &str) -> Result<ScanInfos, StorageError> {
        let uuid = parse_id(id)?;
        sqlx::query_as::<_, ScanInfosRow>(
            r"
            SELECT id, company_id, username, client_id, repository_url, commit_id, tag_id,
                   results, started_at, completed_at, sent_at,
                   created_at, updated_at, error, metadata
            FROM data.scan_infos
            WHERE id = $1
            ",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::query(format!("could not find scan infos with ID: {id}"), e))?
        .map(ScanInfos::from)
        .ok_or_else(|| StorageError::NotFound(format!("scan infos with ID: {id}")))
    }

    async fn find_all(&self, _ctx: &RequestContext) -> Result<Vec<ScanInfos>, StorageError> {
        let rows = sqlx::query_as::<_, ScanInfosRow>(
            r"
            SELECT id, company_id, username, client_id, repository_url, commit_id, tag_id,
                   results, started_at, completed_at, sent_at,
                   created_at, updated_at, error, metadata
            FROM data.scan_infos
            ORDER BY created_at
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::query("could not find all scan infos", e))?;

        Ok(rows.into_iter().map(ScanInfos::from).collect())
    }

    async fn update_by_id(
        &self,
        _ctx: &RequestContext,
        id: &str,
        scan_infos: ScanInfos,
    ) -> Result<(), StorageError> {
        let uuid = parse_id(id)?;
        let result = sqlx::query(
            r"
            UPDATE data.scan_infos
            SET company_id = $2, username = $3, client_id = $4, repository_url = $5,
                commit_id = $6, tag_id = $7, results = $8,
                started_at = $9, completed_at = $10, sent_at = $11,
                error = $12, metadata = $13, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(uuid)
        .bind(scan_infos.company_id)
        .bind(scan_infos.username)
        .bind(scan_infos.client_id)
        .bind(scan_infos.repository_url)
        .bind(scan_infos.commit_id)
        .bind(scan_infos.tag_id)
        .bind(scan_infos.results)
        .bind(scan_infos.started_at)
        .bind(scan_infos.completed_at)
        .bind(scan_infos.sent_at)
        .bind(scan_infos.error)
        .bind(Json(scan_infos.metadata))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::query(format!("could not update scan infos with ID: {id}"), e))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("scan infos with ID: {id}")));
        }
        Ok(())
    }

    async fn delete_by_id(&self, _ctx: &RequestContext, id: &str) -> Result<(), StorageError> {
        let uuid = parse_id(id)?;
        sqlx::query("DELETE FROM data.scan_infos WHERE id = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StorageError::query(format!("could not delete scan infos with ID: {id}"), e)
            })?;
        Ok(())
    }
}
