//! Route handlers.
//!
//! Client input errors map to 400, every backend error (not found included)
//! to 500, and unknown routes or methods to 501.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use scanhub_core::domain::parse_scan_infos_id;
use scanhub_core::{RequestContext, ScanInfos, StoreScanInfosRequest};
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::models::{GenericResponse, HealthStatus, InfosResponse, StatusResponse};
use crate::state::AppState;

fn generic(ctx: &RequestContext, message: &str, scan_infos_id: String) -> Json<GenericResponse> {
    Json(GenericResponse {
        request_id: ctx.request_id().to_string(),
        message: message.to_string(),
        scan_infos_id,
    })
}

fn infos<T>(ctx: &RequestContext, message: &str, infos: T) -> Json<InfosResponse<T>> {
    Json(InfosResponse {
        request_id: ctx.request_id().to_string(),
        message: message.to_string(),
        infos,
    })
}

/// Canonical hyphenated lowercase form of the `{id}` path segment.
///
/// Undecodable segments and non-UUID values are both rejected with 400.
fn path_id(
    ctx: &RequestContext,
    path: Result<Path<String>, PathRejection>,
    message: &str,
    developer_message: &str,
) -> Result<String, ApiError> {
    let parsed = match path {
        Ok(Path(raw)) => parse_scan_infos_id(&raw).map_err(|e| e.to_string()),
        Err(rejection) => Err(rejection.body_text()),
    };
    parsed.map(|id| id.to_string()).map_err(|e| {
        warn!(error = %e, "bad request. invalid id");
        ApiError::bad_request(ctx, message, developer_message)
    })
}

/// `POST /api/v1/scaninfos`
pub async fn store_scan_infos(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(request): JsonBody<StoreScanInfosRequest>,
) -> Result<Json<GenericResponse>, ApiError> {
    let id = state.usecase.store(&ctx, request).await.map_err(|e| {
        error!(error = %e, "unable to store scan infos");
        ApiError::internal(&ctx, "an error occurred while storing the scan infos", e.to_string())
    })?;

    info!(scan_infos_id = %id, "scan infos stored");
    Ok(generic(&ctx, "scan infos saved successfully", id))
}

/// `GET /api/v1/scaninfos/{id}`
pub async fn get_scan_infos(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<InfosResponse<ScanInfos>>, ApiError> {
    let id = path_id(
        &ctx,
        path,
        "bad request. cannot get scan infos.",
        "expect a valid uuid as id of the scan infos to fetch.",
    )?;

    let record = state.usecase.get(&ctx, &id).await.map_err(|e| {
        error!(error = %e, scan_infos_id = %id, "unable to get scan infos");
        ApiError::internal(&ctx, "an error occurred while fetching the scan infos", e.to_string())
    })?;

    Ok(infos(&ctx, "scan infos fetched successfully", record))
}

/// `GET /api/v1/scaninfos`
pub async fn list_scan_infos(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<InfosResponse<Vec<ScanInfos>>>, ApiError> {
    let all = state.usecase.get_all(&ctx).await.map_err(|e| {
        error!(error = %e, "unable to fetch all scan infos");
        ApiError::internal(&ctx, "an error occurred while fetching all scan infos", e.to_string())
    })?;

    Ok(infos(&ctx, "all scan infos fetched successfully", all))
}

/// `PUT /api/v1/scaninfos`
pub async fn update_scan_infos(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(mut record): JsonBody<ScanInfos>,
) -> Result<Json<GenericResponse>, ApiError> {
    // Validated by the extractor; stored ids are always in canonical form.
    if let Ok(canonical) = parse_scan_infos_id(&record.id) {
        record.id = canonical.to_string();
    }
    let id = record.id.clone();
    state.usecase.update(&ctx, record).await.map_err(|e| {
        error!(error = %e, scan_infos_id = %id, "unable to update scan infos");
        ApiError::internal(&ctx, "an error occurred while updating the scan infos", e.to_string())
    })?;

    info!(scan_infos_id = %id, "scan infos updated");
    Ok(generic(&ctx, "scan infos updated successfully", id))
}

/// `DELETE /api/v1/scaninfos/{id}`
pub async fn delete_scan_infos(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<GenericResponse>, ApiError> {
    let id = path_id(
        &ctx,
        path,
        "bad request. cannot delete scan infos.",
        "expect a valid uuid as id of the scan infos to delete.",
    )?;

    state.usecase.delete(&ctx, &id).await.map_err(|e| {
        error!(error = %e, scan_infos_id = %id, "unable to delete scan infos");
        ApiError::internal(&ctx, "an error occurred while deleting the scan infos", e.to_string())
    })?;

    info!(scan_infos_id = %id, "scan infos deleted");
    Ok(generic(&ctx, "scan infos deleted successfully", id))
}

/// Fallback for unknown routes and unsupported methods.
pub async fn endpoint_not_found(Extension(ctx): Extension<RequestContext>) -> ApiError {
    ApiError::endpoint_not_found(&ctx)
}

/// `GET /ping`
pub async fn ping() -> &'static str {
    "pong"
}

/// `GET /status`
pub async fn status(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    let config = state.config();
    let checked = state.backend.check().await;
    let checked_at = Utc::now();

    let (code, health) = match checked {
        Ok(()) => (
            StatusCode::OK,
            HealthStatus {
                status: "ok".to_string(),
                checked_at,
                error: None,
            },
        ),
        Err(e) => {
            warn!(error = %e, database = state.backend.name(), "backend health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthStatus {
                    status: "unavailable".to_string(),
                    checked_at,
                    error: Some(e.to_string()),
                },
            )
        }
    };

    let body = StatusResponse {
        app: state.build.app.to_string(),
        git_commit: state.build.git_commit.to_string(),
        git_tag: state.build.git_tag.to_string(),
        database: state.backend.name().to_string(),
        is_production: config.is_production,
        health,
    };
    (code, Json(body))
}
