//! Shared recursive descent over schema documents.
//!
//! Every pass agrees on one classification rule:
//!
//! - a node is **object-like** if its `type` list contains `"object"` or it
//!   carries `properties`;
//! - otherwise it is **array-like** if its `type` list contains `"array"` or it
//!   carries `items`;
//! - otherwise it is a **leaf**.
//!
//! Object wins when both predicates match (`"type": ["object", "array"]`),
//! with two exceptions in how walks descend: a required property that is
//! array-like walks its items, and an object-like node without a
//! `properties` map falls back to its items.
//! "Carries" means the key is present with a value other than `null` or
//! `false`. Nodes are dereferenced (see [`crate::refs`]) before they are
//! classified.

use serde_json::{Map, Value};

use crate::path::{join_items, join_key};
use crate::refs::{ref_of, Dereferencer};
use crate::types::WalkOptions;

/// Classification of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Object,
    Array,
    Leaf,
}

/// Borrowed, classified view of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode<'v> {
    Object {
        /// The `properties` map, if it is an object.
        properties: Option<&'v Map<String, Value>>,
        /// Trimmed, non-empty `required` entries in authored order.
        required: Vec<&'v str>,
    },
    Array {
        /// Item schema (first slot of tuple-style `items`).
        items: Option<&'v Value>,
    },
    Leaf,
}

impl<'v> SchemaNode<'v> {
    /// Classify `node` and borrow the parts each kind descends into.
    pub fn view(node: &'v Value) -> Self {
        match classify(node) {
            NodeKind::Object => SchemaNode::Object {
                properties: node.get("properties").and_then(Value::as_object),
                required: required_names(node),
            },
            NodeKind::Array => SchemaNode::Array {
                items: item_schema(node),
            },
            NodeKind::Leaf => SchemaNode::Leaf,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            SchemaNode::Object { .. } => NodeKind::Object,
            SchemaNode::Array { .. } => NodeKind::Array,
            SchemaNode::Leaf => NodeKind::Leaf,
        }
    }
}

/// Normalize `type` into a list of type names.
///
/// A string becomes a one-element list; non-string array entries are
/// dropped; anything else is empty.
pub fn type_list(node: &Value) -> Vec<&str> {
    match node.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Returns true if `node` has `key` set to something other than `null`/`false`.
pub fn carries(node: &Value, key: &str) -> bool {
    matches!(node.get(key), Some(v) if !matches!(v, Value::Null | Value::Bool(false)))
}

/// Classify a node. Non-objects are leaves.
pub fn classify(node: &Value) -> NodeKind {
    if is_object_like(node) {
        NodeKind::Object
    } else if is_array_like(node) {
        NodeKind::Array
    } else {
        NodeKind::Leaf
    }
}

/// `type` includes `"object"` or the node carries `properties`.
pub fn is_object_like(node: &Value) -> bool {
    node.is_object() && (type_list(node).contains(&"object") || carries(node, "properties"))
}

/// `type` includes `"array"` or the node carries `items`.
pub fn is_array_like(node: &Value) -> bool {
    node.is_object() && (type_list(node).contains(&"array") || carries(node, "items"))
}

/// Item schema of an array node.
///
/// Tuple-style `items` arrays contribute only their first slot.
pub fn item_schema(node: &Value) -> Option<&Value> {
    match node.get("items")? {
        Value::Array(slots) => slots.first().filter(|slot| slot.is_object()),
        items @ Value::Object(_) => Some(items),
        _ => None,
    }
}

/// Trimmed, non-empty entries of a node's `required` list.
pub fn required_names(node: &Value) -> Vec<&str> {
    node.get("required")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Which properties a walk descends into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// Only properties named in `required`; every required name is
    /// emitted, whether or not it has a declared schema.
    Required,
    /// Every declared property; every non-root node is emitted.
    All,
}

/// Walk `schema` from `base_path`, calling `visit` for each emitted field.
///
/// `visit` receives the field path and the field's schema node (dereferenced
/// in [`WalkMode::All`], as declared in [`WalkMode::Required`], `None` when a
/// required name has no declared property). References are resolved against
/// `schema` itself.
pub fn walk<F>(schema: &Value, base_path: &str, mode: WalkMode, options: &WalkOptions, visit: F)
where
    F: FnMut(&str, Option<&Value>),
{
    let mut walker = Walker {
        deref: Dereferencer::new(schema, options),
        mode,
        max_depth: options.max_depth,
        active: Vec::new(),
        visit,
    };
    walker.walk_node(schema, base_path, 0, false);
}

// --- Internal implementation ---

struct Walker<'a, F> {
    deref: Dereferencer<'a>,
    mode: WalkMode,
    max_depth: usize,
    /// References being walked on the current path.
    active: Vec<String>,
    visit: F,
}

impl<'a, F> Walker<'a, F>
where
    F: FnMut(&str, Option<&Value>),
{
    /// `property` is set when `node` is the schema of a named property.
    fn walk_node(&mut self, node: &Value, path: &str, depth: usize, property: bool) {
        if depth > self.max_depth {
            tracing::debug!(path, depth, "walk depth limit reached");
            return;
        }

        let reference = ref_of(node).map(str::to_string);
        if let Some(reference) = &reference {
            if self.active.contains(reference) {
                tracing::trace!(path, reference = reference.as_str(), "recursive reference, not descending");
                return;
            }
            self.active.push(reference.clone());
        }

        let deref = self.deref;
        let resolved = deref.resolve(node);
        match self.mode {
            WalkMode::Required => self.walk_required(&resolved, path, depth, property),
            WalkMode::All => self.walk_all(&resolved, path, depth),
        }

        if reference.is_some() {
            self.active.pop();
        }
    }

    fn walk_required(&mut self, node: &Value, path: &str, depth: usize, property: bool) {
        // Required properties check array-like before object-like.
        if property && is_array_like(node) {
            if let Some(items) = item_schema(node) {
                self.walk_node(items, &join_items(path), depth + 1, false);
            }
            return;
        }

        match SchemaNode::view(node) {
            SchemaNode::Object {
                properties,
                required,
            } => {
                for name in required {
                    let child_path = join_key(path, name);
                    let prop = properties.and_then(|props| props.get(name));
                    (self.visit)(&child_path, prop);

                    if let Some(prop) = prop.filter(|p| p.is_object()) {
                        self.walk_node(prop, &child_path, depth + 1, true);
                    }
                }
            }
            SchemaNode::Array { items: Some(items) } => {
                self.walk_node(items, &join_items(path), depth + 1, false);
            }
            SchemaNode::Array { items: None } | SchemaNode::Leaf => {}
        }
    }

    fn walk_all(&mut self, node: &Value, path: &str, depth: usize) {
        if depth > 0 {
            (self.visit)(path, Some(node));
        }

        match SchemaNode::view(node) {
            SchemaNode::Object {
                properties: Some(props),
                ..
            } => {
                for (key, child) in props {
                    if key.is_empty() || !child.is_object() {
                        continue;
                    }
                    self.walk_node(child, &join_key(path, key), depth + 1, true);
                }
            }
            // An object-like node without a properties map still reaches its items
            SchemaNode::Object {
                properties: None, ..
            } => {
                if let Some(items) = item_schema(node) {
                    self.walk_node(items, &join_items(path), depth + 1, false);
                }
            }
            SchemaNode::Array { items: Some(items) } => {
                self.walk_node(items, &join_items(path), depth + 1, false);
            }
            SchemaNode::Array { items: None } | SchemaNode::Leaf => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collect(schema: &Value, mode: WalkMode) -> Vec<String> {
        let mut paths = Vec::new();
        walk(schema, "", mode, &WalkOptions::default(), |path, _| {
            paths.push(path.to_string())
        });
        paths
    }

    #[test]
    fn classify_by_type_or_keyword() {
        assert_eq!(classify(&json!({ "type": "object" })), NodeKind::Object);
        assert_eq!(classify(&json!({ "properties": {} })), NodeKind::Object);
        assert_eq!(classify(&json!({ "type": ["array", "null"] })), NodeKind::Array);
        assert_eq!(classify(&json!({ "items": { "type": "string" } })), NodeKind::Array);
        assert_eq!(classify(&json!({ "type": "string" })), NodeKind::Leaf);
        assert_eq!(classify(&json!("object")), NodeKind::Leaf);
    }

    #[test]
    fn object_wins_over_array() {
        let node = json!({ "type": ["object", "array"], "items": { "type": "string" } });
        assert_eq!(classify(&node), NodeKind::Object);

        let node = json!({ "type": "array", "properties": { "a": {} } });
        assert_eq!(classify(&node), NodeKind::Object);
    }

    #[test]
    fn null_or_false_keywords_are_not_carried() {
        assert_eq!(classify(&json!({ "properties": null })), NodeKind::Leaf);
        assert_eq!(classify(&json!({ "items": false })), NodeKind::Leaf);
    }

    #[test]
    fn type_list_normalization() {
        assert_eq!(type_list(&json!({ "type": "string" })), ["string"]);
        assert_eq!(type_list(&json!({ "type": ["integer", 3, "null"] })), ["integer", "null"]);
        assert!(type_list(&json!({ "type": 7 })).is_empty());
        assert!(type_list(&json!({})).is_empty());
    }

    #[test]
    fn item_schema_variants() {
        let tuple = json!({ "items": [{ "type": "string" }, { "type": "number" }] });
        assert_eq!(item_schema(&tuple), Some(&json!({ "type": "string" })));

        let single = json!({ "items": { "type": "number" } });
        assert_eq!(item_schema(&single), Some(&json!({ "type": "number" })));

        assert!(item_schema(&json!({ "items": [] })).is_none());
        assert!(item_schema(&json!({ "items": true })).is_none());
    }

    #[test]
    fn required_names_are_trimmed() {
        let node = json!({ "required": [" a ", "", 3, "b"] });
        assert_eq!(required_names(&node), ["a", "b"]);
    }

    #[test]
    fn required_walk_emits_missing_properties() {
        let schema = json!({ "type": "object", "required": ["ghost"] });
        let mut seen = Vec::new();
        walk(&schema, "", WalkMode::Required, &WalkOptions::default(), |path, node| {
            seen.push((path.to_string(), node.is_some()))
        });
        assert_eq!(seen, [("ghost".to_string(), false)]);
    }

    #[test]
    fn required_array_property_walks_items_first() {
        let schema = json!({
            "type": "object",
            "required": ["rows"],
            "properties": {
                "rows": {
                    "type": "array",
                    "properties": {},
                    "items": { "type": "object", "required": ["sku"], "properties": { "sku": {} } }
                }
            }
        });
        assert_eq!(collect(&schema, WalkMode::Required), ["rows", "rows[].sku"]);
    }

    #[test]
    fn all_walk_falls_back_to_items_without_properties() {
        let schema = json!({
            "type": "object",
            "properties": {
                "lines": {
                    "type": ["object", "array"],
                    "items": { "type": "object", "properties": { "sku": { "type": "string" } } }
                }
            }
        });
        assert_eq!(
            collect(&schema, WalkMode::All),
            ["lines", "lines[]", "lines[].sku"]
        );
    }

    #[test]
    fn required_walk_skips_optional_containers() {
        let schema = json!({
            "type": "object",
            "required": ["a"],
            "properties": {
                "a": { "type": "string" },
                "opt": { "type": "object", "required": ["deep"], "properties": { "deep": {} } }
            }
        });
        assert_eq!(collect(&schema, WalkMode::Required), ["a"]);
    }

    #[test]
    fn all_walk_visits_every_property() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": { "type": "string" },
                "lines": { "type": "array", "items": { "type": "object", "properties": { "sku": {} } } }
            }
        });
        assert_eq!(
            collect(&schema, WalkMode::All),
            ["a", "lines", "lines[]", "lines[].sku"]
        );
    }

    #[test]
    fn root_array_paths_start_with_marker() {
        let schema = json!({
            "type": "array",
            "items": { "type": "object", "required": ["name"], "properties": { "name": {} } }
        });
        assert_eq!(collect(&schema, WalkMode::Required), ["[].name"]);
    }

    #[test]
    fn base_path_prefixes_output() {
        let schema = json!({ "type": "object", "required": ["x"], "properties": { "x": {} } });
        let mut paths = Vec::new();
        walk(&schema, "root", WalkMode::Required, &WalkOptions::default(), |path, _| {
            paths.push(path.to_string())
        });
        assert_eq!(paths, ["root.x"]);
    }

    #[test]
    fn recursive_refs_terminate() {
        let schema = json!({
            "$defs": {
                "node": {
                    "type": "object",
                    "required": ["label", "child"],
                    "properties": {
                        "label": { "type": "string" },
                        "child": { "$ref": "#/$defs/node" }
                    }
                }
            },
            "$ref": "#/$defs/node"
        });
        assert_eq!(
            collect(&schema, WalkMode::Required),
            ["label", "child"]
        );
    }

    #[test]
    fn depth_limit_stops_descent() {
        let schema = json!({
            "type": "object",
            "required": ["a"],
            "properties": {
                "a": { "type": "object", "required": ["b"], "properties": { "b": {} } }
            }
        });
        let mut paths = Vec::new();
        let options = WalkOptions::default().max_depth(0);
        walk(&schema, "", WalkMode::Required, &options, |path, _| {
            paths.push(path.to_string())
        });
        assert_eq!(paths, ["a"]);
    }

    #[test]
    fn schema_node_view() {
        let node = json!({ "type": "object", "required": ["x"], "properties": { "x": {} } });
        match SchemaNode::view(&node) {
            SchemaNode::Object {
                properties,
                required,
            } => {
                assert!(properties.unwrap().contains_key("x"));
                assert_eq!(required, ["x"]);
            }
            other => panic!("expected object view, got {:?}", other),
        }
        assert_eq!(SchemaNode::view(&json!(1)).kind(), NodeKind::Leaf);
    }
}
