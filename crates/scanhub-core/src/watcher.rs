//! Config file hot reload.
//!
//! A `notify` watcher observes the config file's directory and wakes a
//! background task that re-runs the full loading pipeline. Successfully parsed
//! snapshots replace the current one on a `tokio::sync::watch` channel; parse
//! failures keep the previous snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{Config, load_config};
use crate::error::{Error, Result};

/// Editors emit bursts of events for a single save.
const DEBOUNCE: Duration = Duration::from_millis(200);

/// Watches a config file and publishes reloaded snapshots.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: watch::Receiver<Arc<Config>>,
    task: JoinHandle<()>,
}

impl ConfigWatcher {
    /// Start watching `path`, publishing `initial` as the first snapshot.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(path: impl Into<PathBuf>, initial: Config) -> Result<Self> {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(ToOwned::to_owned)
            .ok_or_else(|| Error::Config(format!("invalid config path {}", path.display())))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    let relevant = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
                        && event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == Some(file_name.as_os_str()));
                    if relevant {
                        let _ = event_tx.send(());
                    }
                }
                Err(e) => warn!(error = %e, "config watcher error"),
            }
        })
        .map_err(|e| Error::Config(format!("Failed to create config watcher: {e}")))?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| Error::Config(format!("Failed to watch {}: {e}", dir.display())))?;

        let (tx, rx) = watch::channel(Arc::new(initial));
        let task = tokio::spawn(async move {
            while event_rx.recv().await.is_some() {
                tokio::time::sleep(DEBOUNCE).await;
                while event_rx.try_recv().is_ok() {}
                debug!(path = %path.display(), "config file changed");
                publish_reload(&tx, &path, load_config(Some(&path)));
            }
        });

        info!(dir = %dir.display(), "watching config for changes");
        Ok(Self {
            _watcher: watcher,
            rx,
            task,
        })
    }

    /// Receiver always holding the latest valid snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Config>> {
        self.rx.clone()
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Publish a reload outcome. Returns whether a new snapshot was sent.
fn publish_reload(tx: &watch::Sender<Arc<Config>>, path: &Path, outcome: Result<Config>) -> bool {
    match outcome {
        Ok(config) => {
            let changed = **tx.borrow() != config;
            if changed {
                tx.send_replace(Arc::new(config));
                info!(path = %path.display(), "config reloaded");
            }
            changed
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config reload failed, keeping previous snapshot");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseKind;

    #[test]
    fn valid_reload_replaces_snapshot() {
        let (tx, rx) = watch::channel(Arc::new(Config::default()));
        let mut next = Config::default();
        next.is_production = true;

        assert!(publish_reload(&tx, Path::new("server.config.toml"), Ok(next)));
        assert!(rx.borrow().is_production);
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let mut initial = Config::default();
        initial.database = DatabaseKind::MockDb;
        let (tx, rx) = watch::channel(Arc::new(initial));

        let outcome = Err(Error::Config("bad toml".to_string()));
        assert!(!publish_reload(&tx, Path::new("server.config.toml"), outcome));
        assert_eq!(rx.borrow().database, DatabaseKind::MockDb);
    }

    #[test]
    fn identical_reload_is_not_published() {
        let (tx, rx) = watch::channel(Arc::new(Config::default()));

        assert!(!publish_reload(
            &tx,
            Path::new("server.config.toml"),
            Ok(Config::default())
        ));
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn start_publishes_initial_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.config.toml");
        std::fs::write(&path, "is_production = true\n").unwrap();

        let initial = load_config(Some(&path)).unwrap();
        let watcher = ConfigWatcher::start(&path, initial).unwrap();
        assert!(watcher.subscribe().borrow().is_production);
    }

    #[tokio::test]
    async fn file_edits_are_published_and_bad_edits_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.config.toml");
        std::fs::write(&path, "is_production = false\n").unwrap();

        let watcher = ConfigWatcher::start(&path, load_config(Some(&path)).unwrap()).unwrap();
        let mut rx = watcher.subscribe();

        std::fs::write(&path, "is_production = true\n").unwrap();
        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("reload not published in time")
            .unwrap();
        assert!(rx.borrow_and_update().is_production);

        std::fs::write(&path, "is_production = [\n").unwrap();
        let outcome = tokio::time::timeout(DEBOUNCE * 5, rx.changed()).await;
        assert!(outcome.is_err());
        assert!(rx.borrow().is_production);
    }
}
