//! Leaf-level repair of generator output.
//!
//! Generators routinely encode nested collections as JSON text, either the
//! whole list (`"items": "[{...}]"`) or each element (`"items": ["{...}"]`).
//! Only the fields a kind declares as nested collections are touched; every
//! other prop is passed through as-is for the validator to judge.

use serde_json::{Map, Value};

use super::validate::RowPolicy;
use crate::core::directive::DirectiveKind;

/// A candidate directive after normalization, not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDirective {
    /// Component name as emitted; empty when the entry carried none.
    pub component: String,
    pub props: Map<String, Value>,
    /// Nested collection fields removed because their text did not parse.
    pub dropped_fields: Vec<&'static str>,
}

impl NormalizedDirective {
    fn unnamed() -> Self {
        Self {
            component: String::new(),
            props: Map::new(),
            dropped_fields: Vec::new(),
        }
    }
}

/// Normalize a raw candidate: either the `{"uiComponents": [...]}` envelope or
/// a bare array. Anything else yields no directives. Never fails.
pub fn normalize(candidate: &Value) -> Vec<NormalizedDirective> {
    normalize_with(candidate, RowPolicy::RejectDirective)
}

/// Normalize under a row policy.
///
/// With [`RowPolicy::FilterRows`] an element string that does not parse is
/// left in place as text, so the validator drops just that row. Otherwise it
/// removes the whole field. A whole-list string that does not parse always
/// removes the field.
pub fn normalize_with(candidate: &Value, policy: RowPolicy) -> Vec<NormalizedDirective> {
    candidate_entries(candidate)
        .iter()
        .map(|entry| normalize_entry(entry, policy))
        .collect()
}

fn candidate_entries(candidate: &Value) -> &[Value] {
    match candidate {
        Value::Array(entries) => entries,
        Value::Object(envelope) => envelope
            .get("uiComponents")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    }
}

fn normalize_entry(entry: &Value, policy: RowPolicy) -> NormalizedDirective {
    let Some(object) = entry.as_object() else {
        return NormalizedDirective::unnamed();
    };

    let component = object
        .get("component")
        .or_else(|| object.get("kind"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut props = match object.get("props") {
        Some(Value::Object(props)) => props.clone(),
        _ => Map::new(),
    };

    let mut dropped_fields = Vec::new();
    if let Some(kind) = DirectiveKind::lookup(&component) {
        for &field in kind.nested_collection_fields() {
            let Some(raw) = props.remove(field) else {
                continue;
            };
            match decode_collection(raw, policy) {
                Some(decoded) => {
                    props.insert(field.to_string(), decoded);
                }
                None => dropped_fields.push(field),
            }
        }
    }

    NormalizedDirective {
        component,
        props,
        dropped_fields,
    }
}

/// Parse a collection that may be JSON text or hold JSON-text elements.
/// `None` means some piece of text failed to parse and the field must go.
fn decode_collection(raw: Value, policy: RowPolicy) -> Option<Value> {
    let value = match raw {
        Value::String(text) => serde_json::from_str::<Value>(&text).ok()?,
        other => other,
    };
    match value {
        Value::Array(elements) => elements
            .into_iter()
            .map(|element| decode_element(element, policy))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        // Not a list at all; the validator rejects the wrong type.
        other => Some(other),
    }
}

fn decode_element(element: Value, policy: RowPolicy) -> Option<Value> {
    let text = match element {
        Value::String(text) => text,
        other => return Some(other),
    };
    match (serde_json::from_str::<Value>(&text), policy) {
        (Ok(decoded), _) => Some(decoded),
        (Err(_), RowPolicy::FilterRows) => Some(Value::String(text)),
        (Err(_), RowPolicy::RejectDirective) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_envelope_and_bare_array() {
        let entry = json!({"component": "SmartFollowUp", "props": {"questions": ["Is this keto?"]}});
        assert_eq!(normalize(&json!({"uiComponents": [entry.clone()]})).len(), 1);
        assert_eq!(normalize(&json!([entry])).len(), 1);
    }

    #[test]
    fn non_sequence_input_yields_nothing() {
        assert!(normalize(&json!("not a sequence")).is_empty());
        assert!(normalize(&json!({"uiComponents": "oops"})).is_empty());
        assert!(normalize(&Value::Null).is_empty());
    }

    #[test]
    fn kind_is_accepted_as_component_alias() {
        let out = normalize(&json!([{"kind": "macro-distribution", "props": {"carbs": 1}}]));
        assert_eq!(out[0].component, "macro-distribution");
        assert_eq!(out[0].props["carbs"], 1);
    }

    #[test]
    fn malformed_entries_become_unnamed_candidates() {
        let out = normalize(&json!([42, {"component": 7, "props": {}}, {"component": "QuickVerdict", "props": "x"}]));
        assert_eq!(out.len(), 3);
        assert!(out[0].component.is_empty());
        assert!(out[1].component.is_empty());
        assert_eq!(out[2].component, "QuickVerdict");
        assert!(out[2].props.is_empty());
    }

    #[test]
    fn parses_stringified_elements() {
        let out = normalize(&json!([{
            "component": "IngredientTable",
            "props": {"items": ["{\"label\":\"Sugar\",\"value\":\"24g\",\"status\":\"bad\"}"]}
        }]));
        assert!(out[0].dropped_fields.is_empty());
        assert_eq!(out[0].props["items"][0]["label"], "Sugar");
    }

    #[test]
    fn parses_stringified_list() {
        let out = normalize(&json!([{
            "component": "EvidenceSources",
            "props": {"sources": "[{\"title\":\"UPF\",\"authority\":\"WHO\",\"description\":\"d\",\"confidence\":90}]"}
        }]));
        assert_eq!(out[0].props["sources"][0]["confidence"], 90);
    }

    #[test]
    fn unparsable_text_drops_only_that_field() {
        let out = normalize(&json!([{
            "component": "DosAndDontsGrid",
            "props": {
                "condition": "Jaundice",
                "recommended": ["{\"name\":\"Papaya\",\"reason\":\"enzymes\"}"],
                "avoid": ["{not json"]
            }
        }]));
        assert_eq!(out[0].dropped_fields, vec!["avoid"]);
        assert!(out[0].props.get("avoid").is_none());
        assert_eq!(out[0].props["recommended"][0]["name"], "Papaya");
        assert_eq!(out[0].props["condition"], "Jaundice");
    }

    #[test]
    fn filter_rows_keeps_unparsable_elements_for_the_validator() {
        let entry = json!([{
            "component": "IngredientTable",
            "props": {"items": [
                {"label": "Fibre", "value": "8g", "status": "good"},
                "{\"label\":\"Sugar\",\"value\":\"24g\",\"status\":\"bad\"}",
                "{truncated"
            ]}
        }]);
        let out = normalize_with(&entry, RowPolicy::FilterRows);
        assert!(out[0].dropped_fields.is_empty());
        let items = out[0].props["items"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1]["label"], "Sugar");
        assert_eq!(items[2], "{truncated");

        let strict = normalize(&entry);
        assert_eq!(strict[0].dropped_fields, vec!["items"]);
    }

    #[test]
    fn filter_rows_still_drops_an_unparsable_whole_list() {
        let out = normalize_with(
            &json!([{"component": "EvidenceSources", "props": {"sources": "[{broken"}}]),
            RowPolicy::FilterRows,
        );
        assert_eq!(out[0].dropped_fields, vec!["sources"]);
    }

    #[test]
    fn fields_outside_the_whitelist_are_untouched() {
        let out = normalize(&json!([{
            "component": "SmartFollowUp",
            "props": {"questions": ["[1, 2]"]}
        }]));
        assert_eq!(out[0].props["questions"][0], "[1, 2]");
        assert!(out[0].dropped_fields.is_empty());
    }

    #[test]
    fn unknown_kinds_pass_through_unmodified() {
        let out = normalize(&json!([{"component": "productCard", "props": {"items": "{bad"}}]));
        assert_eq!(out[0].props["items"], "{bad");
    }
}
