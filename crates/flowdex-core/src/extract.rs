//! Reference extraction from loosely-typed JSON.

use serde_json::Value;

use crate::reference::ComponentReference;

/// Extracts a component reference from an arbitrary JSON value.
///
/// Returns `Some` only when the value is a JSON object carrying string
/// `key` and `domain` fields. `flow` and `version` default to the empty
/// string when missing or non-string. Absence is the only failure signal;
/// this never panics.
pub fn extract_reference(value: &Value) -> Option<ComponentReference> {
    let object = value.as_object()?;
    let key = object.get("key")?.as_str()?;
    let domain = object.get("domain")?.as_str()?;

    let flow = object.get("flow").and_then(Value::as_str).unwrap_or("");
    let version = object.get("version").and_then(Value::as_str).unwrap_or("");

    Some(ComponentReference::new(key, domain, flow, version))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_full_reference_object() {
        let value = json!({"key": "k", "domain": "d", "flow": "f", "version": "1.0"});
        assert_eq!(
            extract_reference(&value),
            Some(ComponentReference::new("k", "d", "f", "1.0"))
        );
    }

    #[test]
    fn test_flow_and_version_default_to_empty() {
        let value = json!({"key": "k", "domain": "d"});
        assert_eq!(
            extract_reference(&value),
            Some(ComponentReference::new("k", "d", "", ""))
        );

        // Non-string flow/version are ignored, not errors.
        let value = json!({"key": "k", "domain": "d", "flow": 7, "version": ["1.0"]});
        assert_eq!(
            extract_reference(&value),
            Some(ComponentReference::new("k", "d", "", ""))
        );
    }

    #[test]
    fn test_non_objects_yield_nothing() {
        assert_eq!(extract_reference(&json!(null)), None);
        assert_eq!(extract_reference(&json!("key")), None);
        assert_eq!(extract_reference(&json!(42)), None);
        assert_eq!(extract_reference(&json!(["key", "domain"])), None);
    }

    #[test]
    fn test_missing_or_non_string_required_fields_yield_nothing() {
        assert_eq!(extract_reference(&json!({"key": "k"})), None);
        assert_eq!(extract_reference(&json!({"domain": "d"})), None);
        assert_eq!(extract_reference(&json!({"key": 1, "domain": "d"})), None);
        assert_eq!(
            extract_reference(&json!({"key": "k", "domain": {"name": "d"}})),
            None
        );
    }
}
