use std::sync::Arc;

use scanhub_core::{BackendHandle, Config, ScanInfosUsecase};
use scanhub_storage::Backend;
use tokio::sync::watch;

/// Build metadata reported by `/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub app: &'static str,
    pub git_commit: &'static str,
    pub git_tag: &'static str,
}

impl BuildInfo {
    /// Values baked in at compile time through `SCANHUB_GIT_COMMIT` and
    /// `SCANHUB_GIT_TAG`.
    pub const fn current() -> Self {
        Self {
            app: "scanhub",
            git_commit: match option_env!("SCANHUB_GIT_COMMIT") {
                Some(commit) => commit,
                None => "unknown",
            },
            git_tag: match option_env!("SCANHUB_GIT_TAG") {
                Some(tag) => tag,
                None => env!("CARGO_PKG_VERSION"),
            },
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub usecase: ScanInfosUsecase,
    pub backend: Arc<dyn BackendHandle>,
    /// Live config snapshot, swapped on hot reload.
    pub config: watch::Receiver<Arc<Config>>,
    pub build: BuildInfo,
}

impl AppState {
    pub fn new(backend: &Backend, config: watch::Receiver<Arc<Config>>, build: BuildInfo) -> Self {
        Self {
            usecase: ScanInfosUsecase::new(Arc::clone(&backend.repository)),
            backend: Arc::clone(&backend.handle),
            config,
            build,
        }
    }

    /// Current config snapshot.
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config.borrow())
    }
}
