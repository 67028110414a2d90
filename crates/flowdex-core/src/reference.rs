//! Component references and component kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of component kinds a workspace file can classify as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Task,
    Schema,
    View,
    Function,
    Extension,
    Workflow,
}

impl ComponentKind {
    /// All kinds, in a fixed order.
    pub const ALL: [ComponentKind; 6] = [
        ComponentKind::Task,
        ComponentKind::Schema,
        ComponentKind::View,
        ComponentKind::Function,
        ComponentKind::Extension,
        ComponentKind::Workflow,
    ];

    /// The reserved `flow` identifier for this kind. Substituted into a
    /// reference when the source document leaves `flow` empty.
    pub fn canonical_flow(&self) -> &'static str {
        match self {
            ComponentKind::Task => "sys-tasks",
            ComponentKind::Schema => "sys-schemas",
            ComponentKind::View => "sys-views",
            ComponentKind::Function => "sys-functions",
            ComponentKind::Extension => "sys-extensions",
            ComponentKind::Workflow => "sys-flows",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::Task => "task",
            ComponentKind::Schema => "schema",
            ComponentKind::View => "view",
            ComponentKind::Function => "function",
            ComponentKind::Extension => "extension",
            ComponentKind::Workflow => "workflow",
        };
        write!(f, "{}", name)
    }
}

/// Composite reference identifying one component in the workspace.
///
/// Two references are equal iff all four fields match exactly
/// (case-sensitive). The reference itself is used as the primary map key in
/// the index, so `Eq`/`Hash` cover every field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentReference {
    pub key: String,
    pub domain: String,
    #[serde(default)]
    pub flow: String,
    #[serde(default)]
    pub version: String,
}

impl ComponentReference {
    pub fn new(
        key: impl Into<String>,
        domain: impl Into<String>,
        flow: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            domain: domain.into(),
            flow: flow.into(),
            version: version.into(),
        }
    }

    /// A reference with an empty `key` or empty `domain` is never indexed.
    pub fn is_indexable(&self) -> bool {
        !self.key.is_empty() && !self.domain.is_empty()
    }
}

impl fmt::Display for ComponentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}@{}",
            self.domain, self.flow, self.key, self.version
        )
    }
}

/// Partial reference used for inexact lookups. Fields that are present must
/// match exactly; absent fields match anything. An empty partial matches
/// every component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PartialReference {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn key_and_domain(key: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            domain: Some(domain.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, reference: &ComponentReference) -> bool {
        fn field_matches(wanted: &Option<String>, actual: &str) -> bool {
            match wanted {
                Some(value) => value == actual,
                None => true,
            }
        }

        field_matches(&self.key, &reference.key)
            && field_matches(&self.domain, &reference.domain)
            && field_matches(&self.flow, &reference.flow)
            && field_matches(&self.version, &reference.version)
    }
}
