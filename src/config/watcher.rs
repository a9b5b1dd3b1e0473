//! Record file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::registry::Registry;

/// Watches the record file and reloads the registry when it changes.
pub struct StoreWatcher {
    path: PathBuf,
    registry: Arc<Registry>,
}

impl StoreWatcher {
    pub fn new(path: &Path, registry: Arc<Registry>) -> Self {
        Self {
            path: path.to_path_buf(),
            registry,
        }
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for events to arrive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let registry = self.registry.clone();
        let file_name = self.path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if relevant && (event.kind.is_modify() || event.kind.is_create()) {
                        tracing::debug!("Domain record file change detected");
                        match registry.reload() {
                            Ok(true) => tracing::info!("Domain records reloaded from file"),
                            Ok(false) => {}
                            Err(e) => {
                                tracing::error!("Failed to reload domain records: {}. Keeping current records.", e)
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        // Watch the directory: the store replaces the file by rename.
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Domain record watcher started");
        Ok(watcher)
    }
}
