//! Reference resolution and unresolved-reference diagnostics.

use std::fmt;

use serde_json::Value;
use tracing::debug;

use flowdex_core::{extract_reference, ComponentKind, ComponentReference, PartialReference};
use flowdex_index::ComponentIndex;

use crate::document::WorkflowDocument;

/// One reference found in a workflow document, with where it was found and
/// what kind of component it must resolve to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    /// Human-readable breadcrumb, e.g. `"open.transitions[0].schema"`.
    /// Used only for diagnostic display, never for identity.
    pub location: String,
    pub expected: ComponentKind,
    pub reference: ComponentReference,
}

/// A reference no resolution tier could satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub location: String,
    pub expected: ComponentKind,
    pub reference: ComponentReference,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} not found: \"{}\" (domain: {})",
            self.expected, self.reference.key, self.reference.domain
        )
    }
}

/// Walks the document's reference-bearing slots and extracts every
/// well-formed reference. Missing slots are skipped; a stateless document
/// yields no sites.
pub fn find_references(document: &WorkflowDocument) -> Vec<ReferenceSite> {
    let mut sites = Vec::new();

    let mut push = |location: String, expected: ComponentKind, value: &Value| {
        if let Some(reference) = extract_reference(value) {
            sites.push(ReferenceSite {
                location,
                expected,
                reference,
            });
        }
    };

    if let Some(start) = &document.start {
        if let Some(schema) = &start.schema {
            push("start.schema".to_string(), ComponentKind::Schema, schema);
        }
        for (task_pos, task) in start.execution_tasks.iter().enumerate() {
            push(
                format!("start.executionTasks[{}]", task_pos),
                ComponentKind::Task,
                task,
            );
        }
    }

    for (state_pos, state) in document.states.iter().enumerate() {
        let label = state.label(state_pos);

        for (transition_pos, transition) in state.transitions.iter().enumerate() {
            if let Some(schema) = &transition.schema {
                push(
                    format!("{}.transitions[{}].schema", label, transition_pos),
                    ComponentKind::Schema,
                    schema,
                );
            }
            for (task_pos, task) in transition.execution_tasks.iter().enumerate() {
                push(
                    format!(
                        "{}.transitions[{}].executionTasks[{}]",
                        label, transition_pos, task_pos
                    ),
                    ComponentKind::Task,
                    task,
                );
            }
        }

        for (task_pos, task) in state.on_entry.iter().enumerate() {
            push(format!("{}.onEntry[{}]", label, task_pos), ComponentKind::Task, task);
        }
        for (task_pos, task) in state.on_exit.iter().enumerate() {
            push(format!("{}.onExit[{}]", label, task_pos), ComponentKind::Task, task);
        }
        if let Some(view) = &state.view {
            push(format!("{}.view", label), ComponentKind::View, view);
        }
        if let Some(process) = &state.process {
            push(format!("{}.process", label), ComponentKind::Workflow, process);
        }
    }

    sites
}

/// Resolves every reference site against the index and reports the ones
/// that stay unresolved.
///
/// Resolution is graduated, first hit wins: exact composite lookup (with
/// the expected kind's canonical flow substituted when the authored flow is
/// empty), then key+domain ignoring version (version drift during editing
/// is common), then key alone. The fallback tiers only accept candidates of
/// the expected kind.
pub fn validate(document: &WorkflowDocument, index: &ComponentIndex) -> Vec<UnresolvedReference> {
    find_references(document)
        .into_iter()
        .filter(|site| !resolves(site, index))
        .map(|site| {
            debug!(
                location = %site.location,
                reference = %site.reference,
                expected = %site.expected,
                "unresolved component reference"
            );
            UnresolvedReference {
                location: site.location,
                expected: site.expected,
                reference: site.reference,
            }
        })
        .collect()
}

fn resolves(site: &ReferenceSite, index: &ComponentIndex) -> bool {
    // Tier 1: exact match, mirroring the indexing-time flow substitution.
    let mut exact = site.reference.clone();
    if exact.flow.is_empty() {
        exact.flow = site.expected.canonical_flow().to_string();
    }
    if index.find_by_reference(&exact).is_some() {
        return true;
    }

    // Tier 2: same key and domain, any version.
    let near = PartialReference::key_and_domain(&site.reference.key, &site.reference.domain);
    if index
        .find_matching(&near)
        .iter()
        .any(|component| component.kind == site.expected)
    {
        return true;
    }

    // Tier 3: key alone, for references authored before pinning a domain.
    index
        .find_matching(&PartialReference::key(&site.reference.key))
        .iter()
        .any(|component| component.kind == site.expected)
}
