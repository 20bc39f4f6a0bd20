//! Tracing/logging initialization.
//!
//! Sets up `tracing_subscriber` with an env-filter and optional JSON output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global tracing subscriber.
///
/// * `default_filter` -- default `RUST_LOG` value when the env-var is not set
///   (see [`default_filter`]).
/// * `log_json` -- when `true`, emit structured JSON log lines instead of the
///   human-readable format.
pub fn init_tracing(default_filter: &str, log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Filter used when `RUST_LOG` is unset.
///
/// An explicit `log_level` from the config wins; otherwise production runs at
/// `info` and everything else at `debug`.
pub fn default_filter(is_production: bool, log_level: Option<&str>) -> String {
    let level = log_level.unwrap_or(if is_production { "info" } else { "debug" });
    format!("scanhub_server={level},scanhub_storage={level},scanhub_core={level},tower_http={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_defaults_to_info() {
        let filter = default_filter(true, None);
        assert!(filter.contains("scanhub_server=info"));
        assert!(filter.contains("tower_http=info"));
    }

    #[test]
    fn development_defaults_to_debug() {
        assert!(default_filter(false, None).contains("scanhub_storage=debug"));
    }

    #[test]
    fn configured_level_wins() {
        assert!(default_filter(true, Some("warn")).starts_with("scanhub_server=warn"));
    }
}
