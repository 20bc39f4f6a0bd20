use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use scanhub_core::ConfigWatcher;
use scanhub_core::config::{load_config, resolve_config_path};
use scanhub_core::tracing_init::{default_filter, init_tracing};
use scanhub_server::server::{resolve_listen_addr, serve};
use scanhub_server::shutdown::shutdown_signal;
use scanhub_server::tls::TlsMode;
use scanhub_server::{AppState, BuildInfo, build_router};

#[derive(Parser)]
#[command(name = "scanhub-server", version, about = "Scan infos HTTP API server")]
struct Args {
    /// Config file path. Defaults to `server.config.toml` in `.` or `app/`
    #[arg(long, env = "SCANHUB_CONFIG")]
    config: Option<PathBuf>,

    /// Emit structured JSON log lines
    #[arg(long, env = "SCANHUB_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let config = load_config(config_path.as_deref()).context("failed to load configuration")?;

    init_tracing(
        &default_filter(config.is_production, config.log_level.as_deref()),
        args.log_json,
    );

    let build = BuildInfo::current();
    info!(
        git_commit = build.git_commit,
        git_tag = build.git_tag,
        database = %config.database,
        config = ?config_path,
        "Starting scanhub-server"
    );

    // Hot reload only when a file backs the config.
    let (_watcher, config_rx) = match &config_path {
        Some(path) => match ConfigWatcher::start(path.clone(), config.clone()) {
            Ok(watcher) => {
                let rx = watcher.subscribe();
                (Some(watcher), rx)
            }
            Err(e) => {
                warn!(error = %e, "Config hot reload disabled");
                (None, watch::channel(Arc::new(config.clone())).1)
            }
        },
        None => (None, watch::channel(Arc::new(config.clone())).1),
    };

    let _ = rustls::crypto::ring::default_provider().install_default();
    let tls = TlsMode::from_server_config(&config.server)?
        .to_rustls_config()
        .await?;

    let backend = scanhub_storage::connect(&config)
        .await
        .context("failed to connect to storage backend")?;

    let router = build_router(
        AppState::new(&backend, config_rx, build),
        config.server.request_timeout_secs.map(Duration::from_secs),
    );
    let addr = resolve_listen_addr(&config.server.host, config.server.port).await?;

    serve(router, addr, tls, shutdown_signal()).await?;

    if let Err(e) = backend.handle.shutdown().await {
        error!(error = %e, "Failed to close storage backend");
    }

    info!("scanhub-server stopped");
    Ok(())
}
