//! Indexed component records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::reference::{ComponentKind, ComponentReference};

/// One successfully indexed component file.
///
/// Constructed only by the file indexer and owned by the index; replaced
/// wholesale when the backing file changes and removed when it is deleted or
/// stops qualifying. The path doubles as the handle consumers use to open
/// and display the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedComponent {
    pub reference: ComponentReference,
    pub kind: ComponentKind,
    pub path: PathBuf,
}

impl IndexedComponent {
    pub fn new(reference: ComponentReference, kind: ComponentKind, path: PathBuf) -> Self {
        Self {
            reference,
            kind,
            path,
        }
    }
}
