//! Core types shared by the schema introspection passes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Annotation carrying per-field guidance for the extraction prompt.
pub const EXTRACTION_HINT_KEY: &str = "x-extraction-hint";

/// Annotation ordering properties for display and prompt layout.
pub const UI_ORDER_KEY: &str = "x-ui-order";

/// JSON Schema vocabulary that may legitimately sit beside `properties`.
///
/// Keys in this set are never relocated by the normalizer.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "$id",
    "$schema",
    "$ref",
    "$defs",
    "definitions",
    "title",
    "description",
    "type",
    "properties",
    "items",
    "required",
    "additionalProperties",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "enum",
    "const",
    "default",
    "examples",
    "format",
    "minimum",
    "maximum",
    "pattern",
    "minLength",
    "maxLength",
    "minItems",
    "maxItems",
    "uniqueItems",
    "dependentRequired",
    "if",
    "then",
    "else",
];

/// Keys whose presence marks an object as a schema node.
pub const SCHEMA_NODE_MARKERS: &[&str] =
    &["type", "properties", "items", "$ref", "oneOf", "anyOf", "allOf"];

/// Returns the JSON type name for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns true if `value` is an object carrying any schema keyword from
/// [`SCHEMA_NODE_MARKERS`].
pub fn looks_like_schema_node(value: &Value) -> bool {
    value
        .as_object()
        .map(|map| SCHEMA_NODE_MARKERS.iter().any(|key| map.contains_key(*key)))
        .unwrap_or(false)
}

/// Returns true if `key` may sit at the root of an object schema without
/// being a misplaced field definition.
pub fn is_reserved_key(key: &str) -> bool {
    key.is_empty()
        || key.starts_with('$')
        || key.starts_with("x-")
        || RESERVED_KEYWORDS.contains(&key)
}

/// Coarse run-time type of a leaf field.
///
/// Derived from the schema on demand; never stored in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldSemantic {
    Text,
    Number,
    Integer,
    Boolean,
    Date,
    DateTime,
    Unknown,
}

impl FieldSemantic {
    /// Wire name of the semantic (`"date-time"`, `"text"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldSemantic::Text => "text",
            FieldSemantic::Number => "number",
            FieldSemantic::Integer => "integer",
            FieldSemantic::Boolean => "boolean",
            FieldSemantic::Date => "date",
            FieldSemantic::DateTime => "date-time",
            FieldSemantic::Unknown => "unknown",
        }
    }

    /// True for semantics compared numerically by filters.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldSemantic::Number | FieldSemantic::Integer)
    }

    /// True for semantics compared as calendar values by filters.
    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldSemantic::Date | FieldSemantic::DateTime)
    }
}

impl fmt::Display for FieldSemantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options shared by the tree walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// Follow local `$ref` pointers before classifying a node.
    pub resolve_refs: bool,
    /// Longest chain of references followed for a single node.
    pub max_ref_depth: usize,
    /// Deepest nesting level a walk descends to.
    pub max_depth: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            resolve_refs: true,
            max_ref_depth: 25,
            max_depth: 64,
        }
    }
}

impl WalkOptions {
    /// Create options with reference resolution enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable `$ref` dereferencing.
    ///
    /// With references disabled, nodes are classified exactly as written.
    pub fn resolve_refs(mut self, resolve_refs: bool) -> Self {
        self.resolve_refs = resolve_refs;
        self
    }

    /// Set the longest reference chain followed for a single node.
    pub fn max_ref_depth(mut self, depth: usize) -> Self {
        self.max_ref_depth = depth;
        self
    }

    /// Set the deepest nesting level a walk descends to.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
