//! Derived metadata stored alongside a schema row.
//!
//! Whenever a schema is created, updated or migrated, the same pipeline runs:
//! normalize, derive required fields and extraction hints, then fingerprint
//! the normalized document.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::hints::derive_extraction_hint_map_with;
use crate::normalize::normalize_json_schema;
use crate::required::derive_required_fields_with;
use crate::types::WalkOptions;
use crate::version::{compute_version, SchemaVersion};

/// A normalized schema together with everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaSnapshot {
    pub schema: Value,
    /// True if normalization relocated any field definitions.
    pub normalized: bool,
    pub required_fields: Vec<String>,
    pub extraction_hints: BTreeMap<String, String>,
    /// Version of `schema` as stored, i.e. after normalization.
    pub version: SchemaVersion,
}

impl SchemaSnapshot {
    /// Run the pipeline with default walk options.
    ///
    /// ```
    /// use extraction_schema::SchemaSnapshot;
    /// use serde_json::json;
    ///
    /// let snapshot = SchemaSnapshot::build(&json!({
    ///     "type": "object",
    ///     "required": ["total"],
    ///     "total": { "type": "number", "x-extraction-hint": "Grand total" }
    /// }));
    /// assert!(snapshot.normalized);
    /// assert_eq!(snapshot.required_fields, ["total"]);
    /// assert_eq!(snapshot.extraction_hints["total"], "Grand total");
    /// ```
    pub fn build(schema: &Value) -> Self {
        Self::build_with(schema, &WalkOptions::default())
    }

    /// Run the pipeline with explicit walk options.
    pub fn build_with(schema: &Value, options: &WalkOptions) -> Self {
        let normalized = normalize_json_schema(schema);
        let changed = normalized.changed;
        let schema = normalized.into_owned();

        let required_fields = derive_required_fields_with(&schema, options);
        let extraction_hints = derive_extraction_hint_map_with(&schema, options);
        let version = compute_version(&schema);

        tracing::debug!(
            %version,
            normalized = changed,
            required = required_fields.len(),
            hints = extraction_hints.len(),
            "built schema snapshot"
        );

        Self {
            schema,
            normalized: changed,
            required_fields,
            extraction_hints,
            version,
        }
    }

    /// Returns true if `schema`, once normalized, still matches this snapshot.
    pub fn is_current(&self, schema: &Value) -> bool {
        self.version.matches(&normalize_json_schema(schema).schema)
    }
}
