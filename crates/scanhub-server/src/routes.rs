use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;

use crate::handlers;
use crate::middleware::{cors_layer, request_context, trace_layer};
use crate::state::AppState;

pub const SCAN_INFOS_PATH: &str = "/api/v1/scaninfos";

/// Build the application router.
///
/// `request_timeout` bounds every request when set.
pub fn build_router(state: AppState, request_timeout: Option<Duration>) -> Router {
    let router = Router::new()
        .route(
            SCAN_INFOS_PATH,
            get(handlers::list_scan_infos)
                .post(handlers::store_scan_infos)
                .put(handlers::update_scan_infos),
        )
        .route("/api/v1/scaninfos/", get(handlers::list_scan_infos))
        .route(
            "/api/v1/scaninfos/{id}",
            get(handlers::get_scan_infos).delete(handlers::delete_scan_infos),
        )
        .route("/ping", get(handlers::ping))
        .route("/status", get(handlers::status))
        .fallback(handlers::endpoint_not_found)
        .method_not_allowed_fallback(handlers::endpoint_not_found);

    let router = match request_timeout {
        Some(timeout) => router.layer(TimeoutLayer::new(timeout)),
        None => router,
    };

    router
        .layer(axum::middleware::from_fn(request_context))
        .layer(CatchPanicLayer::new())
        .layer(trace_layer())
        .layer(cors_layer())
        .with_state(state)
}
