//! Shared fakes and fixture builders for Flowdex tests.
//!
//! `FakeWorkspace` stands in for the real filesystem host: an in-memory
//! path→bytes map with injectable read failures and a captured watch sender
//! so tests can push file events deterministically.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use globset::{Glob, GlobSetBuilder};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Notify};

use flowdex_index::{HostError, WatchEvent, WatchHandle, WorkspaceFiles};

/// In-memory workspace host.
#[derive(Default)]
pub struct FakeWorkspace {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    failing_reads: Mutex<HashSet<PathBuf>>,
    failing_enumerate: AtomicBool,
    failing_watch: AtomicBool,
    enumerate_gate: Mutex<Option<Arc<Notify>>>,
    watch_tx: Mutex<Option<mpsc::Sender<WatchEvent>>>,
    enumerate_calls: AtomicUsize,
}

impl FakeWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw bytes at a path.
    pub fn insert(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.files.lock().insert(path.into(), bytes.into());
    }

    /// Stores a minimal qualifying component document at a path.
    pub fn insert_component(
        &self,
        path: impl Into<PathBuf>,
        key: &str,
        domain: &str,
        version: &str,
    ) {
        self.insert(path, component_json(key, domain, version));
    }

    pub fn remove(&self, path: &Path) {
        self.files.lock().remove(path);
    }

    /// Makes subsequent reads of `path` fail with an I/O error.
    pub fn fail_reads_for(&self, path: impl Into<PathBuf>) {
        self.failing_reads.lock().insert(path.into());
    }

    /// Makes subsequent `enumerate` calls fail with an I/O error.
    pub fn fail_enumerate(&self) {
        self.failing_enumerate.store(true, Ordering::SeqCst);
    }

    /// Makes subsequent `watch` calls fail.
    pub fn fail_watch(&self) {
        self.failing_watch.store(true, Ordering::SeqCst);
    }

    /// Parks subsequent `enumerate` calls until the returned handle is
    /// notified, so tests can act while a scan is in flight.
    pub fn hold_enumerations(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.enumerate_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Number of `enumerate` calls observed, for asserting that repeated
    /// initialization does not rescan.
    pub fn enumerate_calls(&self) -> usize {
        self.enumerate_calls.load(Ordering::SeqCst)
    }

    /// True once a watcher has been installed.
    pub fn watching(&self) -> bool {
        self.watch_tx.lock().is_some()
    }

    /// Pushes a file event into the captured watch channel.
    ///
    /// Panics when no watcher is installed; tests are expected to
    /// initialize the index first.
    pub async fn emit(&self, event: WatchEvent) {
        let sender = self
            .watch_tx
            .lock()
            .clone()
            .expect("no watcher installed on FakeWorkspace");
        sender.send(event).await.expect("watch channel closed");
    }
}

#[async_trait]
impl WorkspaceFiles for FakeWorkspace {
    async fn enumerate(&self, patterns: &[String]) -> Result<Vec<PathBuf>, HostError> {
        self.enumerate_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.enumerate_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing_enumerate.load(Ordering::SeqCst) {
            return Err(HostError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "injected enumerate failure",
            )));
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern)?);
        }
        let set = builder.build()?;
        Ok(self
            .files
            .lock()
            .keys()
            .filter(|path| set.is_match(path))
            .cloned()
            .collect())
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, HostError> {
        if self.failing_reads.lock().contains(path) {
            return Err(HostError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "injected read failure",
            )));
        }
        self.files.lock().get(path).cloned().ok_or_else(|| {
            HostError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such fake file: {}", path.display()),
            ))
        })
    }

    fn watch(
        &self,
        _patterns: &[String],
        sender: mpsc::Sender<WatchEvent>,
    ) -> Result<WatchHandle, HostError> {
        if self.failing_watch.load(Ordering::SeqCst) {
            return Err(HostError::WatchFailed("injected watch failure".into()));
        }
        *self.watch_tx.lock() = Some(sender);
        Ok(WatchHandle::noop())
    }
}

/// Minimal qualifying component document.
pub fn component_json(key: &str, domain: &str, version: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "key": key,
        "domain": domain,
        "version": version,
    }))
    .expect("fixture serialization")
}

/// Bare reference object, as authored inside workflow documents.
pub fn reference_json(key: &str, domain: &str, version: &str) -> Value {
    json!({
        "key": key,
        "domain": domain,
        "version": version,
    })
}
