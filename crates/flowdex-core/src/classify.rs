//! Directory-based component kind classification.

use std::path::{Component, Path};

use crate::config::WorkspaceConfig;
use crate::reference::ComponentKind;

/// Built-in directory-name table. Checked before any configured override.
fn builtin_kind_for_dir(dir_name: &str) -> Option<ComponentKind> {
    match dir_name {
        "Tasks" | "tasks" | "sys-tasks" => Some(ComponentKind::Task),
        "Schemas" | "schemas" | "sys-schemas" => Some(ComponentKind::Schema),
        "Views" | "views" | "sys-views" => Some(ComponentKind::View),
        "Functions" | "functions" | "sys-functions" => Some(ComponentKind::Function),
        "Extensions" | "extensions" | "sys-extensions" => Some(ComponentKind::Extension),
        "Workflows" | "workflows" | "sys-flows" => Some(ComponentKind::Workflow),
        _ => None,
    }
}

/// Classifies a component file by its directory path.
///
/// Directory segments are inspected from the file's parent upward (the
/// filename itself is excluded); the nearest matching segment decides. For
/// each segment the built-in table is consulted first and the configured
/// overrides second, so a built-in name cannot be remapped by configuration.
pub fn classify(path: &Path, config: Option<&WorkspaceConfig>) -> Option<ComponentKind> {
    let parent = path.parent()?;
    for component in parent.components().rev() {
        let Component::Normal(segment) = component else {
            continue;
        };
        let Some(name) = segment.to_str() else {
            continue;
        };
        if let Some(kind) = builtin_kind_for_dir(name) {
            return Some(kind);
        }
        if let Some(kind) = config.and_then(|c| c.kind_for_dir(name)) {
            return Some(kind);
        }
    }
    None
}
