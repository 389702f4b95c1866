//! Extraction hint collection.
//!
//! Unlike required-field derivation, this walk visits every declared property,
//! so optional fields keep their guidance.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::types::{WalkOptions, EXTRACTION_HINT_KEY};
use crate::walker::{walk, WalkMode};

/// Collect `x-extraction-hint` text keyed by field path.
///
/// Hints are trimmed; blank or non-string hints are skipped and the root node
/// never contributes. Malformed input yields an empty map.
pub fn derive_extraction_hint_map(schema: &Value) -> BTreeMap<String, String> {
    derive_extraction_hint_map_with(schema, &WalkOptions::default())
}

/// Collect extraction hints with explicit walk options.
pub fn derive_extraction_hint_map_with(
    schema: &Value,
    options: &WalkOptions,
) -> BTreeMap<String, String> {
    let mut hints = BTreeMap::new();

    walk(schema, "", WalkMode::All, options, |path, node| {
        if let Some(hint) = node.and_then(extraction_hint) {
            hints.insert(path.to_string(), hint.to_string());
        }
    });

    hints
}

/// Trimmed, non-empty `x-extraction-hint` of a node.
pub fn extraction_hint(node: &Value) -> Option<&str> {
    node.get(EXTRACTION_HINT_KEY)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|hint| !hint.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collects_optional_and_nested_hints() {
        let schema = json!({
            "type": "object",
            "required": ["invoice_number"],
            "properties": {
                "invoice_number": {
                    "type": "string",
                    "x-extraction-hint": "  Top right corner  "
                },
                "notes": { "type": "string", "x-extraction-hint": "Free text at the bottom" },
                "vendor": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "x-extraction-hint": "Letterhead" }
                    }
                }
            }
        });
        let hints = derive_extraction_hint_map(&schema);
        assert_eq!(hints.len(), 3);
        assert_eq!(hints["invoice_number"], "Top right corner");
        assert_eq!(hints["notes"], "Free text at the bottom");
        assert_eq!(hints["vendor.name"], "Letterhead");
    }

    #[test]
    fn array_items_use_marker_paths() {
        let schema = json!({
            "type": "object",
            "properties": {
                "lines": {
                    "type": "array",
                    "x-extraction-hint": "Line item table",
                    "items": {
                        "type": "object",
                        "x-extraction-hint": "One row",
                        "properties": {
                            "sku": { "type": "string", "x-extraction-hint": "Article number column" }
                        }
                    }
                }
            }
        });
        let hints = derive_extraction_hint_map(&schema);
        assert_eq!(hints["lines"], "Line item table");
        assert_eq!(hints["lines[]"], "One row");
        assert_eq!(hints["lines[].sku"], "Article number column");
    }

    #[test]
    fn root_hint_is_ignored() {
        let schema = json!({
            "type": "object",
            "x-extraction-hint": "whole document",
            "properties": { "a": { "type": "string" } }
        });
        assert!(derive_extraction_hint_map(&schema).is_empty());
    }

    #[test]
    fn blank_and_non_string_hints_are_skipped() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": { "type": "string", "x-extraction-hint": "   " },
                "b": { "type": "string", "x-extraction-hint": 42 }
            }
        });
        assert!(derive_extraction_hint_map(&schema).is_empty());
    }

    #[test]
    fn malformed_input_yields_empty_map() {
        assert!(derive_extraction_hint_map(&json!(null)).is_empty());
        assert!(derive_extraction_hint_map(&json!([1, 2])).is_empty());
        assert!(derive_extraction_hint_map(&json!({ "properties": "nope" })).is_empty());
    }

    #[test]
    fn referenced_nodes_keep_local_hints() {
        let schema = json!({
            "$defs": {
                "party": {
                    "type": "object",
                    "x-extraction-hint": "generic party",
                    "properties": { "name": { "type": "string", "x-extraction-hint": "Legal name" } }
                }
            },
            "type": "object",
            "properties": {
                "buyer": { "$ref": "#/$defs/party", "x-extraction-hint": "Bill-to block" },
                "seller": { "$ref": "#/$defs/party" }
            }
        });
        let hints = derive_extraction_hint_map(&schema);
        assert_eq!(hints["buyer"], "Bill-to block");
        assert_eq!(hints["buyer.name"], "Legal name");
        assert_eq!(hints["seller"], "generic party");
        assert_eq!(hints["seller.name"], "Legal name");
    }

    #[test]
    fn object_like_array_without_properties_reaches_items() {
        let schema = json!({
            "type": "object",
            "properties": {
                "lines": {
                    "type": ["object", "array"],
                    "items": {
                        "type": "object",
                        "properties": { "sku": { "type": "string", "x-extraction-hint": "SKU col" } }
                    }
                }
            }
        });
        let hints = derive_extraction_hint_map(&schema);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints["lines[].sku"], "SKU col");
    }
}
