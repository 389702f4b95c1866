//! One-time repair of misplaced field definitions.
//!
//! Older schemas sometimes declare fields as siblings of `properties` instead
//! of inside it:
//!
//! ```json
//! { "type": "object", "properties": {}, "invoice": { "type": "object" } }
//! ```
//!
//! [`normalize_json_schema`] moves such keys into `properties`. Keywords,
//! `$`-prefixed keys and `x-` annotations always stay at the root.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::types::{is_reserved_key, looks_like_schema_node};
use crate::walker::{classify, NodeKind};

/// Result of [`normalize_json_schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<'a> {
    /// The normalized schema; borrowed from the input when nothing moved.
    pub schema: Cow<'a, Value>,
    /// True iff at least one key was relocated.
    pub changed: bool,
}

impl Normalized<'_> {
    /// Take ownership of the normalized schema.
    pub fn into_owned(self) -> Value {
        self.schema.into_owned()
    }
}

/// Relocate top-level field definitions into `properties`.
///
/// Only object-like roots are touched. A relocated key never overwrites an
/// existing property of the same name; the root copy is dropped either way.
///
/// ```
/// use extraction_schema::normalize_json_schema;
/// use serde_json::json;
///
/// let schema = json!({
///     "type": "object",
///     "properties": {},
///     "invoice": { "type": "object", "properties": { "number": { "type": "string" } } }
/// });
/// let normalized = normalize_json_schema(&schema);
/// assert!(normalized.changed);
/// assert!(normalized.schema["properties"].get("invoice").is_some());
/// assert!(normalized.schema.get("invoice").is_none());
/// ```
pub fn normalize_json_schema(schema: &Value) -> Normalized<'_> {
    let misplaced = misplaced_keys(schema);
    let root = match schema.as_object() {
        Some(root) if !misplaced.is_empty() => root,
        _ => {
            return Normalized {
                schema: Cow::Borrowed(schema),
                changed: false,
            }
        }
    };

    let mut properties = root
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    for &key in &misplaced {
        if properties.contains_key(key) {
            tracing::debug!(key, "dropping root copy of existing property");
            continue;
        }
        tracing::debug!(key, "relocating field definition into properties");
        properties.insert(key.to_string(), root[key].clone());
    }

    let mut next = Map::new();
    for (key, value) in root {
        if misplaced.contains(&key.as_str()) {
            continue;
        }
        next.insert(key.clone(), value.clone());
    }
    next.insert("properties".to_string(), Value::Object(properties));

    Normalized {
        schema: Cow::Owned(Value::Object(next)),
        changed: true,
    }
}

/// Root keys of an object-like schema that look like misplaced field
/// definitions, in document order.
pub fn misplaced_keys(schema: &Value) -> Vec<&str> {
    let Some(root) = schema.as_object() else {
        return Vec::new();
    };
    if classify(schema) != NodeKind::Object {
        return Vec::new();
    }
    root.iter()
        .filter(|(key, value)| {
            key.as_str() != "properties" && !is_reserved_key(key) && looks_like_schema_node(value)
        })
        .map(|(key, _)| key.as_str())
        .collect()
}
