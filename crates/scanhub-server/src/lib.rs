//! `scanhub` HTTP API.
//!
//! axum surface over the scan infos use cases: JSON envelopes, request
//! correlation ids, health endpoints, TLS and graceful shutdown.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;
pub mod tls;

pub use routes::build_router;
pub use state::{AppState, BuildInfo};
