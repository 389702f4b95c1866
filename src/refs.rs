//! Local `$ref` dereferencing.
//!
//! Every walk resolves a node before classifying it, so the required-field
//! deriver, the hint extractor and the semantic resolver all see the same
//! dereferenced view of a schema.
//!
//! A reference is replaced by its target merged with the referencing node's
//! sibling keys. Siblings win over target keys, `properties` maps are merged
//! and `required` lists are unioned:
//!
//! ```
//! use extraction_schema::{Dereferencer, WalkOptions};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "$defs": { "party": { "type": "object", "required": ["name"] } },
//!     "properties": {
//!         "buyer": { "$ref": "#/$defs/party", "x-extraction-hint": "Bill-to party" }
//!     }
//! });
//! let options = WalkOptions::default();
//! let deref = Dereferencer::new(&schema, &options);
//! let buyer = deref.deref(&schema["properties"]["buyer"]);
//! assert_eq!(buyer["type"], "object");
//! assert_eq!(buyer["x-extraction-hint"], "Bill-to party");
//! ```

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::types::WalkOptions;

/// Resolve a local reference (`#`, `#/$defs/name`, ...) against `root`.
///
/// Returns `None` for references into other documents or missing targets.
pub fn resolve_local_ref<'v>(root: &'v Value, reference: &str) -> Option<&'v Value> {
    let pointer = reference.trim().strip_prefix('#')?;
    root.pointer(pointer)
}

/// Returns the trimmed `$ref` of a node, if it has a non-empty one.
pub fn ref_of(node: &Value) -> Option<&str> {
    node.get("$ref")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
}

/// Resolves nodes of one schema document.
#[derive(Debug, Clone, Copy)]
pub struct Dereferencer<'a> {
    root: &'a Value,
    options: WalkOptions,
}

impl<'a> Dereferencer<'a> {
    /// Create a dereferencer for the document rooted at `root`.
    pub fn new(root: &'a Value, options: &WalkOptions) -> Self {
        Self {
            root,
            options: *options,
        }
    }

    /// Follow `$ref` chains on `node`.
    ///
    /// Returns the node untouched when it has no reference, when reference
    /// resolution is disabled, or when the reference cannot be followed
    /// (non-local, missing, cyclic, or too deep).
    pub fn deref<'n>(&self, node: &'n Value) -> Cow<'n, Value>
    where
        'a: 'n,
    {
        if !self.options.resolve_refs {
            return Cow::Borrowed(node);
        }
        self.resolve_inner(node, &mut Vec::new(), 0, false)
    }

    /// Follow `$ref` chains and fold object `allOf` branches into the node.
    pub fn resolve<'n>(&self, node: &'n Value) -> Cow<'n, Value>
    where
        'a: 'n,
    {
        if !self.options.resolve_refs {
            return Cow::Borrowed(node);
        }
        self.resolve_inner(node, &mut Vec::new(), 0, true)
    }

    fn resolve_inner<'n>(
        &self,
        node: &'n Value,
        seen: &mut Vec<String>,
        depth: usize,
        merge_all_of: bool,
    ) -> Cow<'n, Value>
    where
        'a: 'n,
    {
        if depth > self.options.max_ref_depth {
            tracing::debug!(depth, "reference chain too deep, leaving node unresolved");
            return Cow::Borrowed(node);
        }

        let resolved = self.follow_ref(node, seen, depth, merge_all_of);
        if merge_all_of {
            self.merge_all_of(resolved, seen, depth)
        } else {
            resolved
        }
    }

    fn follow_ref<'n>(
        &self,
        node: &'n Value,
        seen: &mut Vec<String>,
        depth: usize,
        merge_all_of: bool,
    ) -> Cow<'n, Value>
    where
        'a: 'n,
    {
        let Some(reference) = ref_of(node) else {
            return Cow::Borrowed(node);
        };

        if seen.iter().any(|r| r == reference) {
            tracing::debug!(reference, "reference cycle, leaving node unresolved");
            return Cow::Borrowed(node);
        }

        let Some(target) = resolve_local_ref(self.root, reference).filter(|t| t.is_object())
        else {
            tracing::debug!(reference, "unresolvable reference");
            return Cow::Borrowed(node);
        };

        seen.push(reference.to_string());
        let target = self.resolve_inner(target, seen, depth + 1, merge_all_of);

        let siblings = without_key(node, "$ref");
        if siblings.is_empty() {
            return target;
        }
        match target.as_object() {
            Some(base) => Cow::Owned(Value::Object(merge_nodes(base, &siblings))),
            None => Cow::Borrowed(node),
        }
    }

    fn merge_all_of<'n>(&self, resolved: Cow<'n, Value>, seen: &[String], depth: usize) -> Cow<'n, Value>
    where
        'a: 'n,
    {
        let has_branches = resolved
            .get("allOf")
            .and_then(Value::as_array)
            .map(|branches| branches.iter().any(Value::is_object))
            .unwrap_or(false);
        if !has_branches {
            return resolved;
        }

        let node = resolved.into_owned();
        let mut merged = without_key(&node, "allOf");
        let branches = node.get("allOf").and_then(Value::as_array).into_iter().flatten();
        for branch in branches.filter(|b| b.is_object()) {
            let mut branch_seen = seen.to_vec();
            let part = self.resolve_inner(branch, &mut branch_seen, depth + 1, true);
            if let Some(part) = part.as_object() {
                merged = merge_nodes(&merged, part);
            }
        }
        Cow::Owned(Value::Object(merged))
    }
}

/// Merge `overlay` over `base`.
///
/// Overlay keys win, except that `properties` maps are merged entry-wise and
/// `required` lists are unioned in first-seen order.
pub fn merge_nodes(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }

    let base_props = base.get("properties").and_then(Value::as_object);
    let overlay_props = overlay.get("properties").and_then(Value::as_object);
    if base_props.is_some() || overlay_props.is_some() {
        let mut props = base_props.cloned().unwrap_or_default();
        for (name, schema) in overlay_props.into_iter().flatten() {
            props.insert(name.clone(), schema.clone());
        }
        merged.insert("properties".to_string(), Value::Object(props));
    }

    let base_required = base.get("required").and_then(Value::as_array);
    let overlay_required = overlay.get("required").and_then(Value::as_array);
    if base_required.is_some() || overlay_required.is_some() {
        let mut required: Vec<Value> = Vec::new();
        let names = base_required
            .into_iter()
            .flatten()
            .chain(overlay_required.into_iter().flatten())
            .filter(|v| v.is_string());
        for name in names {
            if !required.contains(name) {
                required.push(name.clone());
            }
        }
        merged.insert("required".to_string(), Value::Array(required));
    }

    merged
}

fn without_key(node: &Value, key: &str) -> Map<String, Value> {
    node.as_object()
        .map(|map| {
            map.iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default()
}
