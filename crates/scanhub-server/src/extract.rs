//! JSON body extractor with uniform 400 rejections.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use scanhub_core::{RequestContext, Validate};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::ApiError;

pub const INVALID_BODY_MESSAGE: &str = "invalid request. make sure to provide expected data format";

/// Decodes the request body as JSON and applies [`Validate`].
///
/// Unreadable, malformed, incomplete or invalid bodies are all rejected with
/// 400 and the decoding detail as developer message. The `Content-Type`
/// header is not inspected.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = req
            .extensions()
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(RequestContext::generate);

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| invalid_body(&ctx, e.body_text()))?;
        let value: T =
            serde_json::from_slice(&bytes).map_err(|e| invalid_body(&ctx, e.to_string()))?;
        value
            .validate()
            .map_err(|e| invalid_body(&ctx, e.to_string()))?;
        Ok(Self(value))
    }
}

fn invalid_body(ctx: &RequestContext, detail: String) -> ApiError {
    warn!(error = %detail, "invalid request body");
    ApiError::bad_request(ctx, INVALID_BODY_MESSAGE, detail)
}
