//! Validator behavior against a populated index.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use flowdex_core::ComponentKind;
use flowdex_index::ComponentIndex;
use flowdex_test_utils::{reference_json, FakeWorkspace};
use flowdex_validate::{find_references, validate, WorkflowDocument};

async fn index_with_task(key: &str, domain: &str, version: &str) -> Arc<ComponentIndex> {
    let files = Arc::new(FakeWorkspace::new());
    files.insert_component(format!("/ws/{}/Tasks/{}.json", domain, key), key, domain, version);
    let index = ComponentIndex::new(files, None);
    index.initialize().await;
    index
}

#[test]
fn finds_every_reference_bearing_slot() {
    let document = WorkflowDocument::from_value(&json!({
        "start": {"schema": reference_json("start-schema", "crm", "1.0")},
        "states": [
            {
                "name": "open",
                "transitions": [{
                    "schema": reference_json("close-schema", "crm", "1.0"),
                    "executionTasks": [reference_json("archive", "crm", "1.0")]
                }],
                "onEntry": [reference_json("notify", "crm", "1.0")],
                "onExit": [reference_json("cleanup", "crm", "1.0")],
                "view": reference_json("open-view", "crm", "1.0"),
                "process": reference_json("sub-intake", "crm", "1.0")
            },
            {
                // Unnamed state, malformed slots are skipped silently.
                "transitions": [{"schema": "not-a-reference"}],
                "onEntry": [42]
            }
        ]
    }))
    .expect("parse");

    let sites = find_references(&document);
    let summary: Vec<(&str, ComponentKind)> = sites
        .iter()
        .map(|site| (site.location.as_str(), site.expected))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("start.schema", ComponentKind::Schema),
            ("open.transitions[0].schema", ComponentKind::Schema),
            ("open.transitions[0].executionTasks[0]", ComponentKind::Task),
            ("open.onEntry[0]", ComponentKind::Task),
            ("open.onExit[0]", ComponentKind::Task),
            ("open.view", ComponentKind::View),
            ("open.process", ComponentKind::Workflow),
        ]
    );
}

#[test]
fn stateless_document_yields_no_references() {
    let document =
        WorkflowDocument::from_value(&json!({"key": "w", "domain": "d"})).expect("parse");
    assert_eq!(find_references(&document), vec![]);
}

#[tokio::test]
async fn exact_reference_resolves() {
    let index = index_with_task("t1", "d1", "2.0").await;
    let document = WorkflowDocument::from_value(&json!({
        "states": [{"name": "a", "onEntry": [reference_json("t1", "d1", "2.0")]}]
    }))
    .expect("parse");

    assert_eq!(validate(&document, &index), vec![]);
}

#[tokio::test]
async fn version_drift_falls_back_to_key_and_domain() {
    let index = index_with_task("t1", "d1", "2.0").await;
    let document = WorkflowDocument::from_value(&json!({
        "states": [{"name": "a", "onEntry": [reference_json("t1", "d1", "1.0")]}]
    }))
    .expect("parse");

    // Wrong version still resolves through the key+domain tier.
    assert_eq!(validate(&document, &index), vec![]);
}

#[tokio::test]
async fn wrong_domain_reports_unresolved_without_a_key_match() {
    let index = index_with_task("t1", "d1", "2.0").await;

    // Same key under another domain resolves through the key-only tier.
    let drifted = WorkflowDocument::from_value(&json!({
        "states": [{"name": "a", "onEntry": [reference_json("t1", "d2", "2.0")]}]
    }))
    .expect("parse");
    assert_eq!(validate(&drifted, &index), vec![]);

    // An unknown key resolves nowhere and is reported.
    let missing = WorkflowDocument::from_value(&json!({
        "states": [{"name": "a", "onEntry": [reference_json("t9", "d2", "2.0")]}]
    }))
    .expect("parse");
    let problems = validate(&missing, &index);
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].location, "a.onEntry[0]");
    assert_eq!(problems[0].expected, ComponentKind::Task);
    assert_eq!(
        problems[0].to_string(),
        "task not found: \"t9\" (domain: d2)"
    );
}

#[tokio::test]
async fn fallback_requires_the_expected_kind() {
    // A schema named like the missing task must not silence the diagnostic.
    let files = Arc::new(FakeWorkspace::new());
    files.insert_component("/ws/d1/Schemas/t1.json", "t1", "d1", "2.0");
    let index = ComponentIndex::new(files, None);
    index.initialize().await;

    let document = WorkflowDocument::from_value(&json!({
        "states": [{"name": "a", "onEntry": [reference_json("t1", "d1", "2.0")]}]
    }))
    .expect("parse");

    let problems = validate(&document, &index);
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].expected, ComponentKind::Task);

    // The same reference used where a schema is expected resolves fine.
    let schema_use = WorkflowDocument::from_value(&json!({
        "states": [{"name": "a", "transitions": [{"schema": reference_json("t1", "d1", "2.0")}]}]
    }))
    .expect("parse");
    assert_eq!(validate(&schema_use, &index), vec![]);
}

#[tokio::test]
async fn authored_flow_must_match_exactly_when_present() {
    let index = index_with_task("t1", "d1", "2.0").await;

    // An authored flow that differs from the canonical one misses tier 1
    // but still resolves through key+domain.
    let document = WorkflowDocument::from_value(&json!({
        "states": [{"name": "a", "onEntry": [
            {"key": "t1", "domain": "d1", "flow": "custom-flow", "version": "2.0"}
        ]}]
    }))
    .expect("parse");
    assert_eq!(validate(&document, &index), vec![]);
}

#[tokio::test]
async fn unready_index_reports_everything_unresolved() {
    let files = Arc::new(FakeWorkspace::new());
    files.insert_component("/ws/d1/Tasks/t1.json", "t1", "d1", "2.0");
    let index = ComponentIndex::new(files, None);
    // No initialize: queries return empty, so validation degrades to
    // reporting rather than panicking.

    let document = WorkflowDocument::from_value(&json!({
        "states": [{"name": "a", "onEntry": [reference_json("t1", "d1", "2.0")]}]
    }))
    .expect("parse");
    assert_eq!(validate(&document, &index).len(), 1);
}
