//! Configuration file watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::AppConfig;

/// Monitors the configuration file and forwards every valid config it reads.
///
/// The parent directory is watched so editors that save by rename are seen.
/// Invalid files are logged and dropped; the running configuration stays.
/// Deduplication is left to the receiver, which knows what is in effect.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<AppConfig>,
}

impl ConfigWatcher {
    /// Create a new watcher and the receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let file_name = self.path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if !ours {
                        return;
                    }

                    match load_config(&path) {
                        Ok(new_config) => {
                            tracing::debug!(path = ?path, "Config file event, forwarding");
                            let _ = tx.send(new_config);
                        }
                        Err(e) => {
                            tracing::error!(
                                "Failed to reload config: {}. Keeping current configuration.",
                                e
                            );
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forwards_changed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faas.toml");
        std::fs::write(&path, "").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _guard = watcher.run().unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let config = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("reload should be delivered")
            .unwrap();
        assert_eq!(config.logging.level, "debug");

        // Writing back content seen before is still forwarded.
        std::fs::write(&path, "").unwrap();
        let config = loop {
            let config = tokio::time::timeout(Duration::from_secs(10), rx.recv())
                .await
                .expect("reload should be delivered")
                .unwrap();
            if config == AppConfig::default() {
                break config;
            }
        };
        assert_eq!(config.logging.level, "info");
    }
}
