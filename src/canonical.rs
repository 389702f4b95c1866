//! Deterministic serialization of schema documents.
//!
//! [`canonicalize`] is the input to schema versioning: object keys are sorted
//! by code point at every level, arrays keep their order, and scalars use
//! their standard JSON literal form, except that whole-number floats drop
//! their fraction (`1.0` becomes `1`). Structurally equal documents therefore
//! produce byte-identical text regardless of authored key order.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::CanonicalError;
use crate::types::UI_ORDER_KEY;

/// Serialize a JSON value into its canonical compact text.
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

/// Canonicalize any serializable value.
///
/// # Errors
///
/// Returns `CanonicalError::NotSerializable` if the value has no JSON
/// representation (for example a map keyed by non-string values).
pub fn canonicalize_serializable<T>(value: &T) -> Result<String, CanonicalError>
where
    T: Serialize + ?Sized,
{
    let value =
        serde_json::to_value(value).map_err(|source| CanonicalError::NotSerializable { source })?;
    Ok(canonicalize(&value))
}

/// Reorder every `properties` map for display and prompt layout.
///
/// Properties carrying a numeric `x-ui-order` come first, ascending; the rest
/// follow, ordered by name without regard to case. Every other key keeps its
/// authored position. Versioning ignores this layout entirely.
pub fn order_properties(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(order_properties).collect()),
        Value::Object(map) => {
            let mut result = Map::new();
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("properties", Value::Object(props)) => {
                        let mut entries: Vec<(&String, &Value)> = props.iter().collect();
                        entries.sort_by(|a, b| compare_property_entries(*a, *b));

                        let mut ordered = Map::new();
                        for (name, schema) in entries {
                            ordered.insert(name.clone(), order_properties(schema));
                        }
                        result.insert(key.clone(), Value::Object(ordered));
                    }
                    _ => {
                        result.insert(key.clone(), order_properties(child));
                    }
                }
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}

// --- Internal implementation ---

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, child)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::from(key.as_str()).to_string());
                out.push(':');
                write_canonical(child, out);
            }
            out.push('}');
        }
        Value::Number(n) => out.push_str(&number_literal(n)),
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Whole-number floats print without a fraction (`1.0` as `1`), matching the
/// versions stamped by JavaScript's `JSON.stringify`.
fn number_literal(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{}", f as i128),
        _ => n.to_string(),
    }
}

fn compare_property_entries(a: (&String, &Value), b: (&String, &Value)) -> Ordering {
    match (ui_order(a.1), ui_order(b.1)) {
        (Some(x), Some(y)) if x != y => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => a
            .0
            .to_lowercase()
            .cmp(&b.0.to_lowercase())
            .then_with(|| a.0.cmp(b.0)),
    }
}

fn ui_order(schema: &Value) -> Option<f64> {
    let order = match schema.get(UI_ORDER_KEY)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    order.is_finite().then_some(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn sorts_object_keys_recursively() {
        let value = json!({ "b": 1, "a": { "d": [3, { "z": true, "y": null }], "c": "x" } });
        assert_eq!(
            canonicalize(&value),
            r#"{"a":{"c":"x","d":[3,{"y":null,"z":true}]},"b":1}"#
        );
    }

    #[test]
    fn key_order_does_not_matter() {
        let a: Value = serde_json::from_str(r#"{"type":"object","required":["x"]}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"required":["x"],"type":"object"}"#).unwrap();
        assert_eq!(canonicalize(&a), canonicalize(&b));
    }

    #[test]
    fn arrays_keep_order() {
        assert_eq!(canonicalize(&json!(["b", "a"])), r#"["b","a"]"#);
        assert_ne!(canonicalize(&json!([1, 2])), canonicalize(&json!([2, 1])));
    }

    #[test]
    fn keys_sort_by_code_point() {
        let value = json!({ "b": 0, "B": 0, "é": 0, "a": 0 });
        assert_eq!(canonicalize(&value), r#"{"B":0,"a":0,"b":0,"é":0}"#);
    }

    #[test]
    fn escapes_strings_and_keys() {
        let value = json!({ "quote\"key": "line\nbreak" });
        assert_eq!(canonicalize(&value), r#"{"quote\"key":"line\nbreak"}"#);
    }

    #[test]
    fn canonical_text_is_a_fixed_point() {
        let value = json!({
            "type": "object",
            "properties": { "total": { "type": "number", "minimum": 0.5 } },
            "required": ["total"]
        });
        let once = canonicalize(&value);
        let reparsed: Value = serde_json::from_str(&once).unwrap();
        assert_eq!(canonicalize(&reparsed), once);
    }

    #[test]
    fn whole_number_floats_drop_fraction() {
        let value = json!({ "minimum": 1.0, "maximum": -0.0, "multipleOf": 0.25, "big": 1e21 });
        assert_eq!(
            canonicalize(&value),
            r#"{"big":1e21,"maximum":0,"minimum":1,"multipleOf":0.25}"#
        );
        assert_eq!(canonicalize(&json!(1.0)), canonicalize(&json!(1)));
    }

    #[test]
    fn serializable_input_is_canonicalized() {
        let mut map = BTreeMap::new();
        map.insert("z", 1);
        map.insert("a", 2);
        assert_eq!(canonicalize_serializable(&map).unwrap(), r#"{"a":2,"z":1}"#);
    }

    #[test]
    fn non_json_input_is_an_error() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8, 2], "tuple key");
        let result = canonicalize_serializable(&map);
        assert!(matches!(result, Err(CanonicalError::NotSerializable { .. })));
    }

    #[test]
    fn order_properties_uses_ui_order_then_name() {
        let schema = json!({
            "type": "object",
            "properties": {
                "zeta": { "type": "string" },
                "beta": { "type": "string", "x-ui-order": 2 },
                "Alpha": { "type": "string" },
                "gamma": { "type": "string", "x-ui-order": "1" }
            }
        });
        let ordered = order_properties(&schema);
        let names: Vec<&String> = ordered["properties"].as_object().unwrap().keys().collect();
        assert_eq!(names, ["gamma", "beta", "Alpha", "zeta"]);
    }

    #[test]
    fn order_properties_recurses_and_keeps_other_keys() {
        let schema = json!({
            "type": "object",
            "properties": {
                "lines": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": { "b": {}, "a": {} }
                    }
                }
            }
        });
        let ordered = order_properties(&schema);
        let root_keys: Vec<&String> = ordered.as_object().unwrap().keys().collect();
        assert_eq!(root_keys, ["type", "properties"]);

        let item_props: Vec<&String> = ordered["properties"]["lines"]["items"]["properties"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(item_props, ["a", "b"]);
        assert_eq!(canonicalize(&ordered), canonicalize(&schema));
    }
}
