//! Extraction Schema
//!
//! Introspection of the JSON Schemas that drive document extraction.
//!
//! A schema row is stored together with facts derived from it: the list of
//! required field paths, the per-field `x-extraction-hint` annotations, and a
//! content fingerprint used to detect drift. Filters ask the schema which
//! value type a field holds before comparing stored values.
//!
//! # Example
//!
//! ```
//! use extraction_schema::{
//!     compute_version, derive_required_fields, resolve_field_semantic, FieldSemantic,
//! };
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["contract"],
//!     "properties": {
//!         "contract": {
//!             "type": "object",
//!             "required": ["contract_number"],
//!             "properties": { "contract_number": { "type": "string" } }
//!         }
//!     }
//! });
//!
//! assert_eq!(
//!     derive_required_fields(&schema),
//!     ["contract", "contract.contract_number"]
//! );
//! assert_eq!(
//!     resolve_field_semantic(&schema, "contract.contract_number"),
//!     FieldSemantic::Text
//! );
//! assert_eq!(compute_version(&schema), compute_version(&schema.clone()));
//! ```
//!
//! # Field paths
//!
//! | Path | Addresses |
//! |------|-----------|
//! | `contract.contract_number` | nested property |
//! | `lines[].sku` | property of every array element |
//! | `[].name` | property of every element of a root array |
//!
//! Paths produced by the derivers feed straight back into the resolver.

mod canonical;
mod error;
mod hints;
mod linter;
mod loader;
mod normalize;
mod path;
mod refs;
mod required;
mod semantic;
mod snapshot;
mod types;
mod version;
mod walker;

pub use canonical::{canonicalize, canonicalize_serializable, order_properties};
pub use error::{CanonicalError, LoadError};
pub use hints::{derive_extraction_hint_map, derive_extraction_hint_map_with, extraction_hint};
pub use linter::{
    lint, lint_file, lint_schema, Diagnostic, FileResult, FileStatus, LintResult, Severity,
};
pub use loader::{is_url, load_schema, load_schema_auto, load_schema_str};
pub use normalize::{misplaced_keys, normalize_json_schema, Normalized};
pub use path::{FieldPath, PathSegment, ITEMS_MARKER};
pub use refs::{merge_nodes, ref_of, resolve_local_ref, Dereferencer};
pub use required::{derive_required_fields, derive_required_fields_with};
pub use semantic::{
    classify_semantic, resolve_field_node, resolve_field_semantic, resolve_field_semantic_with,
};
pub use snapshot::SchemaSnapshot;
pub use types::{
    is_reserved_key, json_type_name, looks_like_schema_node, FieldSemantic, WalkOptions,
    EXTRACTION_HINT_KEY, RESERVED_KEYWORDS, SCHEMA_NODE_MARKERS, UI_ORDER_KEY,
};
pub use version::{compute_version, compute_version_of, SchemaVersion};
pub use walker::{
    carries, classify, is_array_like, is_object_like, item_schema, required_names, type_list,
    walk, NodeKind, SchemaNode, WalkMode,
};

#[cfg(feature = "remote")]
pub use loader::load_schema_url;
