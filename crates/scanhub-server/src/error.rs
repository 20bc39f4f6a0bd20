//! API error type rendered as the failure envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scanhub_core::RequestContext;

use crate::models::ErrorResponse;

pub const INVALID_ENDPOINT_MESSAGE: &str = "invalid request. make sure to use the exact endpoint.";
pub const INVALID_ENDPOINT_DETAIL: &str = "endpoint called with that method does not exist.";

/// A failed request: HTTP status plus the failure envelope fields.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{status}: {message}: {developer_message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub request_id: String,
    pub message: String,
    pub developer_message: String,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        ctx: &RequestContext,
        message: impl Into<String>,
        developer_message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            request_id: ctx.request_id().to_string(),
            message: message.into(),
            developer_message: developer_message.into(),
        }
    }

    pub fn bad_request(
        ctx: &RequestContext,
        message: impl Into<String>,
        developer_message: impl Into<String>,
    ) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ctx, message, developer_message)
    }

    pub fn internal(
        ctx: &RequestContext,
        message: impl Into<String>,
        developer_message: impl Into<String>,
    ) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ctx, message, developer_message)
    }

    /// Unknown route or method.
    pub fn endpoint_not_found(ctx: &RequestContext) -> Self {
        Self::new(
            StatusCode::NOT_IMPLEMENTED,
            ctx,
            INVALID_ENDPOINT_MESSAGE,
            INVALID_ENDPOINT_DETAIL,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            request_id: self.request_id,
            message: self.message,
            developer_message: self.developer_message,
        };
        (self.status, Json(body)).into_response()
    }
}
