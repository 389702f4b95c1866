//! Required field derivation.
//!
//! Produces every field path a schema mandates, including paths reached only
//! by descending into other required objects and arrays. A required leaf under
//! an optional container is not surfaced: the walk only follows `required`.

use std::collections::HashSet;

use serde_json::Value;

use crate::types::WalkOptions;
use crate::walker::{walk, WalkMode};

/// Derive the required field paths of a schema.
///
/// Paths use the `[]` array-marker grammar (`lines[].sku`). The result is
/// de-duplicated and listed in the order the walk first reaches each path.
///
/// ```
/// use extraction_schema::derive_required_fields;
/// use serde_json::json;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["a"],
///     "properties": {
///         "a": { "type": "object", "required": ["b"], "properties": { "b": { "type": "string" } } }
///     }
/// });
/// assert_eq!(derive_required_fields(&schema), ["a", "a.b"]);
/// ```
pub fn derive_required_fields(schema: &Value) -> Vec<String> {
    derive_required_fields_with(schema, &WalkOptions::default())
}

/// Derive required field paths with explicit walk options.
pub fn derive_required_fields_with(schema: &Value, options: &WalkOptions) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();

    walk(schema, "", WalkMode::Required, options, |path, _| {
        if seen.insert(path.to_string()) {
            fields.push(path.to_string());
        }
    });

    tracing::debug!(count = fields.len(), "derived required fields");
    fields
}
