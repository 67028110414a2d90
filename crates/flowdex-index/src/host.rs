//! Workspace host capability traits.
//!
//! The index consumes three capabilities from its host: glob-bounded file
//! enumeration, raw file reads, and a best-effort change event stream.
//! `LocalWorkspace` implements them over the real filesystem; tests inject
//! the in-memory fake from `flowdex-test-utils`.

use std::any::Any;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::HostError;

/// File-system change event delivered by a host watcher.
///
/// Delivery is best effort and eventually consistent; the index applies
/// events strictly in arrival order but does not attempt to repair
/// out-of-order or coalesced delivery beyond the next full rescan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Created(PathBuf),
    Changed(PathBuf),
    Removed(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Created(path) | WatchEvent::Changed(path) | WatchEvent::Removed(path) => {
                path
            }
        }
    }
}

/// Opaque guard keeping a host watcher alive. Dropping it stops delivery.
pub struct WatchHandle {
    _guard: Option<Box<dyn Any + Send>>,
}

impl WatchHandle {
    /// A handle with no backing watcher, for hosts that deliver events
    /// through other means (e.g. test injection).
    pub fn noop() -> Self {
        Self { _guard: None }
    }

    pub fn from_guard(guard: Box<dyn Any + Send>) -> Self {
        Self {
            _guard: Some(guard),
        }
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("active", &self._guard.is_some())
            .finish()
    }
}

/// File access capabilities the index consumes from its host.
#[async_trait]
pub trait WorkspaceFiles: Send + Sync {
    /// Enumerates absolute paths of files matching any of the glob
    /// patterns.
    async fn enumerate(&self, patterns: &[String]) -> Result<Vec<PathBuf>, HostError>;

    /// Reads a file's raw bytes.
    async fn read(&self, path: &Path) -> Result<Vec<u8>, HostError>;

    /// Installs a change watcher scoped to the glob patterns, forwarding
    /// events into `sender` in delivery order. Hosts without watch support
    /// return [`HostError::WatchUnsupported`]; the index then runs without
    /// live updates.
    fn watch(
        &self,
        patterns: &[String],
        sender: mpsc::Sender<WatchEvent>,
    ) -> Result<WatchHandle, HostError>;
}
