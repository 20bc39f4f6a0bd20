//! Listener lifecycle: bind, serve, drain.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use tracing::info;

/// In-flight requests get this long to finish once shutdown starts.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Resolve `host:port` to the first matching socket address.
pub async fn resolve_listen_addr(host: &str, port: u16) -> io::Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("cannot resolve {host}:{port}"),
            )
        })
}

/// Serve `router` on `addr` until `shutdown` resolves, then drain.
///
/// HTTPS is used when `tls` is set.
pub async fn serve(
    router: Router,
    addr: SocketAddr,
    tls: Option<RustlsConfig>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    let handle = Handle::new();

    let ready_handle = handle.clone();
    let scheme = if tls.is_some() { "https" } else { "http" };
    tokio::spawn(async move {
        if let Some(local) = ready_handle.listening().await {
            info!(addr = %local, scheme, "scanhub-server ready");
            notify_ready();
        }
    });

    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown.await;
        info!(grace_secs = SHUTDOWN_GRACE.as_secs(), "Draining in-flight requests");
        shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    let service = router.into_make_service_with_connect_info::<SocketAddr>();
    match tls {
        Some(config) => {
            axum_server::bind_rustls(addr, config)
                .handle(handle)
                .serve(service)
                .await
        }
        None => axum_server::bind(addr).handle(handle).serve(service).await,
    }
}

/// Notify systemd that the server is ready to serve (unix only).
fn notify_ready() {
    #[cfg(unix)]
    if let Err(e) = sd_notify::notify(false, &[sd_notify::NotifyState::Ready]) {
        tracing::debug!(error = %e, "sd_notify failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_loopback() {
        let addr = resolve_listen_addr("127.0.0.1", 8080).await.unwrap();
        assert_eq!(addr, "127.0.0.1:8080".parse().unwrap());
    }
}
