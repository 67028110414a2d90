//! Local-filesystem workspace host.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use walkdir::WalkDir;

use async_trait::async_trait;
use flowdex_core::{WorkspaceConfig, CONFIG_FILE_NAME};

use crate::errors::HostError;
use crate::host::{WatchEvent, WatchHandle, WorkspaceFiles};

/// Workspace host rooted at a real directory.
///
/// Enumeration walks the tree on a blocking thread and filters with a glob
/// set; unreadable entries are logged and skipped so one bad subtree does
/// not abort a scan. Live updates come from a `notify` watcher when the
/// `watch` cargo feature is enabled.
pub struct LocalWorkspace {
    root: PathBuf,
}

impl LocalWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads `flowdex.config.json` from the workspace root. A missing file
    /// is normal; an unparseable one is logged and ignored so the index
    /// falls back to built-in classification.
    pub async fn load_config(&self) -> Option<WorkspaceConfig> {
        let path = self.root.join(CONFIG_FILE_NAME);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!(path = %path.display(), error = %error, "no workspace config");
                return None;
            }
        };
        match WorkspaceConfig::from_slice(&bytes) {
            Ok(config) => Some(config),
            Err(error) => {
                warn!(path = %path.display(), error = %error, "ignoring invalid workspace config");
                None
            }
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, HostError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[async_trait]
impl WorkspaceFiles for LocalWorkspace {
    async fn enumerate(&self, patterns: &[String]) -> Result<Vec<PathBuf>, HostError> {
        let set = build_globset(patterns)?;
        let root = self.root.clone();
        let paths = tokio::task::spawn_blocking(move || {
            let mut paths = Vec::new();
            for entry in WalkDir::new(&root).follow_links(false) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(error) => {
                        warn!(error = %error, "skipping unreadable scan entry");
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.into_path();
                if set.is_match(&path) {
                    paths.push(path);
                }
            }
            paths
        })
        .await
        .map_err(|error| HostError::Io(std::io::Error::other(error)))?;
        Ok(paths)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, HostError> {
        Ok(tokio::fs::read(path).await?)
    }

    #[cfg(feature = "watch")]
    fn watch(
        &self,
        patterns: &[String],
        sender: mpsc::Sender<WatchEvent>,
    ) -> Result<WatchHandle, HostError> {
        use notify::{Event, EventKind, RecursiveMode, Watcher};

        let set = build_globset(patterns)?;
        let mut watcher =
            notify::recommended_watcher(move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(event) => event,
                    Err(error) => {
                        warn!(error = %error, "watch error");
                        return;
                    }
                };
                for path in event.paths {
                    if !set.is_match(&path) {
                        continue;
                    }
                    let translated = match event.kind {
                        EventKind::Create(_) => WatchEvent::Created(path),
                        EventKind::Modify(_) => WatchEvent::Changed(path),
                        EventKind::Remove(_) => WatchEvent::Removed(path),
                        _ => continue,
                    };
                    // The receiver side is gone only when the index is
                    // disposed; dropped events are fine then.
                    let _ = sender.blocking_send(translated);
                }
            })
            .map_err(|error| HostError::WatchFailed(error.to_string()))?;

        watcher
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|error| HostError::WatchFailed(error.to_string()))?;

        Ok(WatchHandle::from_guard(Box::new(watcher)))
    }

    #[cfg(not(feature = "watch"))]
    fn watch(
        &self,
        _patterns: &[String],
        _sender: mpsc::Sender<WatchEvent>,
    ) -> Result<WatchHandle, HostError> {
        Err(HostError::WatchUnsupported(
            "built without the watch feature".into(),
        ))
    }
}
