//! `scanhub` Core Library
//!
//! Shared functionality for `scanhub` components:
//! - Scan infos domain model and validation rules
//! - Backend-agnostic repository contract
//! - Use-case layer delegating to the selected repository
//! - Layered configuration with hot reload
//! - Common error types

pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod repository;
pub mod tracing_init;
pub mod usecase;
pub mod watcher;

pub use config::{Config, DatabaseKind};
pub use context::RequestContext;
pub use domain::{ScanInfos, StoreScanInfosRequest, Validate, ValidationError};
pub use error::{Error, Result};
pub use repository::{BackendHandle, ScanInfosRepository, StorageError};
pub use usecase::ScanInfosUsecase;
pub use watcher::ConfigWatcher;
