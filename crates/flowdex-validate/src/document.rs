//! Lenient typed model of a workflow document.
//!
//! Workflow files are hand-authored and frequently half-edited, so every
//! field is optional or defaulted and the reference-bearing leaves stay raw
//! `serde_json::Value`s; extraction decides what actually qualifies as a
//! reference. The struct shape, not string matching, enumerates where
//! references can live: the start transition's schema, each state's
//! transition schemas and execution tasks, entry/exit tasks, the state
//! view, and the subflow process.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowDocument {
    pub key: Option<String>,
    pub domain: Option<String>,
    pub version: Option<String>,
    pub start: Option<Transition>,
    pub states: Vec<StateNode>,
}

impl WorkflowDocument {
    /// Parses a workflow document leniently; unknown fields are ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateNode {
    pub name: Option<String>,
    pub transitions: Vec<Transition>,
    pub on_entry: Vec<Value>,
    pub on_exit: Vec<Value>,
    pub view: Option<Value>,
    pub process: Option<Value>,
}

impl StateNode {
    /// Breadcrumb label: the state name when authored, the index otherwise.
    pub(crate) fn label(&self, position: usize) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("states[{}]", position),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transition {
    pub name: Option<String>,
    pub schema: Option<Value>,
    pub execution_tasks: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parses_a_full_document() {
        let value = json!({
            "key": "intake",
            "domain": "crm",
            "version": "1.0",
            "start": {"schema": {"key": "s", "domain": "crm"}},
            "states": [{
                "name": "open",
                "transitions": [{
                    "name": "close",
                    "schema": {"key": "close-schema", "domain": "crm"},
                    "executionTasks": [{"key": "t", "domain": "crm"}]
                }],
                "onEntry": [{"key": "notify", "domain": "crm"}],
                "onExit": [],
                "view": {"key": "open-view", "domain": "crm"}
            }]
        });
        let document = WorkflowDocument::from_value(&value).expect("parse");
        assert_eq!(document.states.len(), 1);
        let state = &document.states[0];
        assert_eq!(state.label(0), "open");
        assert_eq!(state.transitions.len(), 1);
        assert_eq!(state.transitions[0].execution_tasks.len(), 1);
        assert_eq!(state.on_entry.len(), 1);
        assert!(state.view.is_some());
        assert!(state.process.is_none());
    }

    #[test]
    fn test_parses_an_empty_document() {
        let document = WorkflowDocument::from_value(&json!({})).expect("parse");
        assert!(document.start.is_none());
        assert!(document.states.is_empty());
    }

    #[test]
    fn test_unnamed_state_label_uses_index() {
        let document =
            WorkflowDocument::from_value(&json!({"states": [{}, {"name": ""}]})).expect("parse");
        assert_eq!(document.states[0].label(0), "states[0]");
        assert_eq!(document.states[1].label(1), "states[1]");
    }
}
