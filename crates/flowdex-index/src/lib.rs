//! Component reference index for workflow workspaces.
//!
//! The index scans a workspace of typed JSON component documents, keeps an
//! in-memory composite-key lookup structure, and follows file-system change
//! events delivered by its host. Queries are synchronous against the
//! already-resident tables; consumers subscribe to change notifications and
//! re-run their own logic on ticks.

pub mod errors;
pub mod host;
pub mod index;
pub mod indexer;
pub mod local;

// Re-export key types for convenient usage
pub use errors::HostError;
pub use host::{WatchEvent, WatchHandle, WorkspaceFiles};
pub use index::{ComponentIndex, IndexChange, IndexChangeKind};
pub use indexer::FileIndexer;
pub use local::LocalWorkspace;

/// Initialize tracing for index diagnostics.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .init();
}
