//! The in-memory component index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, mpsc, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use flowdex_core::{
    ComponentKind, ComponentReference, IndexedComponent, PartialReference, WorkspaceConfig,
};

use crate::host::{WatchEvent, WatchHandle, WorkspaceFiles};
use crate::indexer::FileIndexer;

/// Directory names recognized without configuration.
const BUILTIN_DIRS: [&str; 18] = [
    "Tasks",
    "tasks",
    "sys-tasks",
    "Schemas",
    "schemas",
    "sys-schemas",
    "Views",
    "views",
    "sys-views",
    "Functions",
    "functions",
    "sys-functions",
    "Extensions",
    "extensions",
    "sys-extensions",
    "Workflows",
    "workflows",
    "sys-flows",
];

/// Capacity of the watch event channel handed to the host.
const WATCH_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the change notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// What happened to the index on one applied event. Consumers are expected
/// to re-query rather than consume these as diffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexChangeKind {
    Added,
    Updated,
    Removed,
}

/// One change notification, fired once per applied create/change/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexChange {
    pub path: PathBuf,
    pub kind: IndexChangeKind,
}

/// The two lookup tables, always mutated together under one write lock so
/// no reader observes one without the other.
#[derive(Default)]
struct Tables {
    by_reference: HashMap<ComponentReference, IndexedComponent>,
    by_path: HashMap<PathBuf, ComponentReference>,
}

impl Tables {
    /// Inserts a component, shadowing any previous owner of the same
    /// reference (last write wins). The shadowed file drops out of the path
    /// table and stays unindexed until it changes or a rescan happens.
    fn insert(&mut self, component: IndexedComponent) {
        if let Some(shadowed) = self
            .by_reference
            .insert(component.reference.clone(), component.clone())
        {
            if shadowed.path != component.path {
                self.by_path.remove(&shadowed.path);
                debug!(
                    reference = %component.reference,
                    winner = %component.path.display(),
                    shadowed = %shadowed.path.display(),
                    "duplicate reference, last write wins"
                );
            }
        }
        self.by_path
            .insert(component.path.clone(), component.reference.clone());
    }

    /// Removes the entry backed by `path`, if any.
    fn remove_path(&mut self, path: &Path) -> Option<ComponentReference> {
        let reference = self.by_path.remove(path)?;
        self.by_reference.remove(&reference);
        Some(reference)
    }
}

/// Central in-memory store over the workspace's component corpus.
///
/// Constructed with an explicit host and configuration snapshot and shared
/// as an `Arc`; there is no global instance, so independent workspace roots
/// run independent indices. Lifecycle: `new` → [`initialize`] (idempotent,
/// memoized) → queries while ready → [`dispose`]. A disposed index must not
/// be reused.
///
/// [`initialize`]: ComponentIndex::initialize
/// [`dispose`]: ComponentIndex::dispose
pub struct ComponentIndex {
    files: Arc<dyn WorkspaceFiles>,
    indexer: FileIndexer,
    patterns: Vec<String>,
    tables: RwLock<Tables>,
    ready: AtomicBool,
    disposed: AtomicBool,
    init: OnceCell<()>,
    changes: broadcast::Sender<IndexChange>,
    pump: Mutex<Option<JoinHandle<()>>>,
    watch_guard: Mutex<Option<WatchHandle>>,
    // Handle to self for spawning the event pump.
    weak_self: Weak<ComponentIndex>,
}

impl ComponentIndex {
    pub fn new(files: Arc<dyn WorkspaceFiles>, config: Option<WorkspaceConfig>) -> Arc<Self> {
        let patterns = scan_patterns(config.as_ref());
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Arc::new_cyclic(|weak_self| Self {
            indexer: FileIndexer::new(Arc::clone(&files), config),
            files,
            patterns,
            tables: RwLock::new(Tables::default()),
            ready: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            init: OnceCell::new(),
            changes,
            pump: Mutex::new(None),
            watch_guard: Mutex::new(None),
            weak_self: weak_self.clone(),
        })
    }

    /// Scans the workspace, installs the change watcher, and flips the
    /// index to ready.
    ///
    /// Idempotent: concurrent and repeated callers observe the same
    /// in-flight completion rather than triggering a second scan. Never
    /// fails. An empty or unreadable workspace yields a ready, empty
    /// index, and a failed watcher install degrades to "no live updates".
    pub async fn initialize(&self) {
        self.init
            .get_or_init(|| async { self.scan_and_watch().await })
            .await;
    }

    async fn scan_and_watch(&self) {
        let mut paths = match self.files.enumerate(&self.patterns).await {
            Ok(paths) => paths,
            Err(error) => {
                warn!(error = %error, "workspace scan failed, index starts empty");
                Vec::new()
            }
        };

        // Sorted order makes the duplicate-reference tie-break
        // deterministic: the lexicographically greatest path wins.
        paths.sort();

        let mut staged = Vec::new();
        for path in &paths {
            if let Some(component) = self.indexer.index_file(path).await {
                staged.push(component);
            }
        }

        if self.disposed.load(Ordering::SeqCst) {
            debug!("index disposed during scan, discarding results");
            return;
        }

        let indexed = staged.len();
        {
            let mut tables = self.tables.write();
            for component in staged {
                tables.insert(component);
            }
        }
        info!(
            candidates = paths.len(),
            components = indexed,
            "workspace scan complete"
        );

        self.install_watcher();
        self.ready.store(true, Ordering::SeqCst);
    }

    fn install_watcher(&self) {
        let (tx, mut rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        match self.files.watch(&self.patterns, tx) {
            Ok(guard) => {
                *self.watch_guard.lock() = Some(guard);
                let weak = self.weak_self.clone();
                // A single pump applies events strictly in arrival order;
                // each event is fully applied before the next is dequeued.
                // Holding only a weak handle lets a dropped index shut the
                // pump down.
                let handle = tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        let Some(index) = weak.upgrade() else {
                            break;
                        };
                        if index.disposed.load(Ordering::SeqCst) {
                            break;
                        }
                        index.apply_event(event).await;
                    }
                    debug!("watch channel closed, event pump stopped");
                });
                *self.pump.lock() = Some(handle);
            }
            Err(error) => {
                warn!(
                    error = %error,
                    "file watcher unavailable, index will not receive live updates"
                );
            }
        }
    }

    /// Applies one file-system event. Public so hosts and tests can drive
    /// the index directly instead of going through a real watcher.
    pub async fn apply_event(&self, event: WatchEvent) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }
        match event {
            WatchEvent::Created(path) | WatchEvent::Changed(path) => self.upsert_path(path).await,
            WatchEvent::Removed(path) => self.delete_path(&path),
        }
    }

    /// Re-indexes one path. A file that no longer qualifies is treated as a
    /// deletion of its prior entry.
    async fn upsert_path(&self, path: PathBuf) {
        let component = self.indexer.index_file(&path).await;

        let change = {
            let mut tables = self.tables.write();
            let previous = tables.remove_path(&path);
            match component {
                Some(component) => {
                    tables.insert(component);
                    let kind = if previous.is_some() {
                        IndexChangeKind::Updated
                    } else {
                        IndexChangeKind::Added
                    };
                    Some(IndexChange { path, kind })
                }
                None => previous.map(|reference| {
                    debug!(
                        path = %path.display(),
                        reference = %reference,
                        "file no longer qualifies, dropping entry"
                    );
                    IndexChange {
                        path,
                        kind: IndexChangeKind::Removed,
                    }
                }),
            }
        };

        self.notify(change);
    }

    /// Removes the entry backed by `path`. Deleting a file that was never
    /// indexed is a no-op.
    fn delete_path(&self, path: &Path) {
        let change = {
            let mut tables = self.tables.write();
            tables.remove_path(path).map(|_| IndexChange {
                path: path.to_path_buf(),
                kind: IndexChangeKind::Removed,
            })
        };
        self.notify(change);
    }

    fn notify(&self, change: Option<IndexChange>) {
        if let Some(change) = change {
            debug!(path = %change.path.display(), kind = ?change.kind, "index changed");
            // Send fails only when no consumer is subscribed.
            let _ = self.changes.send(change);
        }
    }

    /// True once the initial scan has been committed. Queries made before
    /// that return empty results rather than erroring.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn gate(&self) -> bool {
        if self.is_ready() {
            true
        } else {
            debug!("index queried before ready");
            false
        }
    }

    /// Exact composite-key lookup.
    pub fn find_by_reference(&self, reference: &ComponentReference) -> Option<IndexedComponent> {
        if !self.gate() {
            return None;
        }
        self.tables.read().by_reference.get(reference).cloned()
    }

    /// First component whose reference carries `key`, in unspecified table
    /// iteration order. Last-resort fallback when domain and version are
    /// unknown.
    pub fn find_by_key(&self, key: &str) -> Option<IndexedComponent> {
        if !self.gate() {
            return None;
        }
        self.tables
            .read()
            .by_reference
            .values()
            .find(|component| component.reference.key == key)
            .cloned()
    }

    /// All components matching the present fields of `partial` exactly.
    pub fn find_matching(&self, partial: &PartialReference) -> Vec<IndexedComponent> {
        if !self.gate() {
            return Vec::new();
        }
        self.tables
            .read()
            .by_reference
            .values()
            .filter(|component| partial.matches(&component.reference))
            .cloned()
            .collect()
    }

    /// All components of one kind.
    pub fn find_by_kind(&self, kind: ComponentKind) -> Vec<IndexedComponent> {
        if !self.gate() {
            return Vec::new();
        }
        self.tables
            .read()
            .by_reference
            .values()
            .filter(|component| component.kind == kind)
            .cloned()
            .collect()
    }

    /// Number of indexed components.
    pub fn len(&self) -> usize {
        if !self.gate() {
            return 0;
        }
        self.tables.read().by_reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribes to change notifications. Subscribers re-run their own
    /// logic per tick; the index does not push diffs.
    pub fn subscribe(&self) -> broadcast::Receiver<IndexChange> {
        self.changes.subscribe()
    }

    /// Tears the index down: stops the event pump, drops the watcher, and
    /// clears both tables. An in-flight scan discards its results instead
    /// of committing. The instance must not be reused afterwards.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        if let Some(handle) = self.pump.lock().take() {
            handle.abort();
        }
        self.watch_guard.lock().take();
        {
            let mut tables = self.tables.write();
            tables.by_reference.clear();
            tables.by_path.clear();
        }
        self.ready.store(false, Ordering::SeqCst);
        info!("component index disposed");
    }
}

/// Glob patterns bounding the scan and the watcher: every known component
/// directory name, built-in and configured.
fn scan_patterns(config: Option<&WorkspaceConfig>) -> Vec<String> {
    let mut patterns: Vec<String> = BUILTIN_DIRS
        .iter()
        .map(|dir| format!("**/{}/**/*.json", dir))
        .collect();
    if let Some(config) = config {
        for dir in config.custom_dirs() {
            patterns.push(format!("**/{}/**/*.json", dir));
        }
    }
    patterns
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_scan_patterns_cover_builtin_dirs() {
        let patterns = scan_patterns(None);
        assert_eq!(patterns.len(), BUILTIN_DIRS.len());
        assert!(patterns.contains(&"**/Tasks/**/*.json".to_string()));
        assert!(patterns.contains(&"**/sys-flows/**/*.json".to_string()));
    }

    #[test]
    fn test_scan_patterns_include_configured_dirs() {
        let config = WorkspaceConfig {
            domain: None,
            paths: HashMap::from([(ComponentKind::Task, "MyTasks".to_string())]),
        };
        let patterns = scan_patterns(Some(&config));
        assert!(patterns.contains(&"**/MyTasks/**/*.json".to_string()));
    }

    #[test]
    fn test_tables_shadowing_drops_stale_path_entry() {
        let mut tables = Tables::default();
        let reference = ComponentReference::new("dup", "d", "sys-tasks", "1.0");
        tables.insert(IndexedComponent::new(
            reference.clone(),
            ComponentKind::Task,
            PathBuf::from("/ws/Tasks/a.json"),
        ));
        tables.insert(IndexedComponent::new(
            reference.clone(),
            ComponentKind::Task,
            PathBuf::from("/ws/Tasks/b.json"),
        ));

        assert_eq!(tables.by_reference.len(), 1);
        assert_eq!(tables.by_path.len(), 1);
        assert_eq!(
            tables.by_reference[&reference].path,
            PathBuf::from("/ws/Tasks/b.json")
        );
        // Deleting the shadowed file later is a no-op.
        assert!(tables.remove_path(Path::new("/ws/Tasks/a.json")).is_none());
    }
}
