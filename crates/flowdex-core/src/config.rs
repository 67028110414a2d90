//! Workspace configuration snapshot.
//!
//! A workspace may carry a `flowdex.config.json` at its root supplying a
//! logical domain name and per-kind directory overrides. The snapshot is
//! loaded once at index construction and treated as immutable input to
//! classification and scan-pattern building. A missing or unreadable config
//! is not an error for the index; callers log it and fall back to the
//! built-in directory table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reference::ComponentKind;

/// File name probed at the workspace root.
pub const CONFIG_FILE_NAME: &str = "flowdex.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read workspace config: {0}")]
    Unreadable(String),
    #[error("invalid workspace config: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Parsed workspace configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Logical domain name for components authored in this workspace.
    #[serde(default)]
    pub domain: Option<String>,
    /// Custom directory name per component kind, e.g. `{"task": "MyTasks"}`.
    #[serde(default)]
    pub paths: HashMap<ComponentKind, String>,
}

impl WorkspaceConfig {
    /// Parses a config document from raw file bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// The kind configured for a directory name, if any.
    pub fn kind_for_dir(&self, dir_name: &str) -> Option<ComponentKind> {
        self.paths
            .iter()
            .find(|(_, dir)| dir.as_str() == dir_name)
            .map(|(kind, _)| *kind)
    }

    /// Configured custom directory names, for scan/watch pattern building.
    pub fn custom_dirs(&self) -> impl Iterator<Item = &str> {
        self.paths.values().map(String::as_str)
    }
}
