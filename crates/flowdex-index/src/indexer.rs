//! Single-file indexing pipeline.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use flowdex_core::{classify, extract_reference, IndexedComponent, WorkspaceConfig};

use crate::host::WorkspaceFiles;

/// Reads, parses, and classifies one JSON file into an indexed component.
///
/// Every rejection is silent from the caller's point of view: unreadable
/// files, malformed JSON, missing required fields, and unclassifiable paths
/// all simply mean "this file is not a component" and yield `None`. No
/// shared state is touched here; all mutation happens in the index.
pub struct FileIndexer {
    files: Arc<dyn WorkspaceFiles>,
    config: Option<WorkspaceConfig>,
}

impl FileIndexer {
    pub fn new(files: Arc<dyn WorkspaceFiles>, config: Option<WorkspaceConfig>) -> Self {
        Self { files, config }
    }

    pub fn config(&self) -> Option<&WorkspaceConfig> {
        self.config.as_ref()
    }

    /// Indexes a single file, or rejects it silently.
    pub async fn index_file(&self, path: &Path) -> Option<IndexedComponent> {
        let bytes = match self.files.read(path).await {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!(path = %path.display(), error = %error, "skipping unreadable file");
                return None;
            }
        };

        let document: Value = match serde_json::from_slice(&bytes) {
            Ok(document) => document,
            Err(error) => {
                debug!(path = %path.display(), error = %error, "skipping malformed JSON");
                return None;
            }
        };

        if !has_required_fields(&document) {
            debug!(path = %path.display(), "skipping file without key/domain/version");
            return None;
        }

        let Some(kind) = classify(path, self.config.as_ref()) else {
            debug!(path = %path.display(), "skipping file outside component directories");
            return None;
        };

        // has_required_fields already guarantees extraction succeeds.
        let mut reference = extract_reference(&document)?;
        if reference.flow.is_empty() {
            reference.flow = kind.canonical_flow().to_string();
        }

        Some(IndexedComponent::new(reference, kind, path.to_path_buf()))
    }
}

/// The minimum a component document must carry at its own top level:
/// non-empty string `key`, `domain`, and `version`.
fn has_required_fields(document: &Value) -> bool {
    let Some(object) = document.as_object() else {
        return false;
    };
    ["key", "domain", "version"].iter().all(|field| {
        object
            .get(*field)
            .and_then(Value::as_str)
            .is_some_and(|value| !value.is_empty())
    })
}
