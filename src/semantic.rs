//! Field semantic resolution.
//!
//! Resolves one field path down to its schema node and classifies the value
//! type filters should assume when comparing stored field values.

use std::borrow::Cow;

use serde_json::Value;

use crate::path::{FieldPath, PathSegment};
use crate::refs::{ref_of, Dereferencer};
use crate::types::{FieldSemantic, WalkOptions};
use crate::walker::{item_schema, type_list};

/// Combinators searched, in priority order, when a property is not declared
/// directly on a node.
const COMBINATORS: &[&str] = &["oneOf", "anyOf", "allOf"];

/// Resolve the semantic type of `field_path` within `schema`.
///
/// Accepts leaf-only dotted paths (`contract.contract_number`) and paths with
/// array markers (`lines[].sku`). Any miss, including an empty path, yields
/// [`FieldSemantic::Unknown`].
///
/// ```
/// use extraction_schema::{resolve_field_semantic, FieldSemantic};
/// use serde_json::json;
///
/// let schema = json!({
///     "type": "object",
///     "properties": { "issued": { "type": "string", "format": "date" } }
/// });
/// assert_eq!(resolve_field_semantic(&schema, "issued"), FieldSemantic::Date);
/// assert_eq!(resolve_field_semantic(&schema, "missing"), FieldSemantic::Unknown);
/// ```
pub fn resolve_field_semantic(schema: &Value, field_path: &str) -> FieldSemantic {
    resolve_field_semantic_with(schema, field_path, &WalkOptions::default())
}

/// Resolve a field semantic with explicit walk options.
pub fn resolve_field_semantic_with(
    schema: &Value,
    field_path: &str,
    options: &WalkOptions,
) -> FieldSemantic {
    let path = FieldPath::parse(field_path);
    match resolve_field_node(schema, &path, options) {
        Some(node) => classify_semantic(&node),
        None => FieldSemantic::Unknown,
    }
}

/// Resolve `path` to its (dereferenced) schema node.
///
/// Returns `None` for an empty path, a non-object schema, or the first
/// segment that does not resolve.
pub fn resolve_field_node<'v>(
    schema: &'v Value,
    path: &FieldPath,
    options: &WalkOptions,
) -> Option<Cow<'v, Value>> {
    if !schema.is_object() || path.is_empty() {
        return None;
    }

    let resolver = Resolver {
        deref: Dereferencer::new(schema, options),
        max_depth: options.max_depth,
    };

    let mut current: Cow<'v, Value> = Cow::Borrowed(schema);
    for segment in path.segments() {
        let next = match &current {
            Cow::Borrowed(node) => resolver.step(*node, segment, 0),
            Cow::Owned(node) => resolver
                .step(node, segment, 0)
                .map(|found| Cow::Owned(found.into_owned())),
        };
        match next {
            Some(node) => current = node,
            None => {
                tracing::trace!(path = %path, "field path does not resolve");
                return None;
            }
        }
    }

    Some(match current {
        Cow::Borrowed(node) => resolver.deref.deref(node),
        Cow::Owned(node) => Cow::Owned(resolver.deref.deref(&node).into_owned()),
    })
}

/// Classify a leaf schema node.
///
/// `null` is ignored in the type list; `integer` beats `number` beats
/// `boolean` beats `string`. Strings are refined by `format`.
pub fn classify_semantic(node: &Value) -> FieldSemantic {
    let types: Vec<&str> = type_list(node)
        .into_iter()
        .filter(|t| *t != "null")
        .collect();

    if types.contains(&"integer") {
        FieldSemantic::Integer
    } else if types.contains(&"number") {
        FieldSemantic::Number
    } else if types.contains(&"boolean") {
        FieldSemantic::Boolean
    } else if types.contains(&"string") {
        match node.get("format").and_then(Value::as_str) {
            Some("date") => FieldSemantic::Date,
            Some("date-time") => FieldSemantic::DateTime,
            _ => FieldSemantic::Text,
        }
    } else {
        FieldSemantic::Unknown
    }
}

// --- Internal implementation ---

struct Resolver<'a> {
    deref: Dereferencer<'a>,
    max_depth: usize,
}

impl<'a> Resolver<'a> {
    /// Resolve one segment on `node`, dereferencing it first.
    fn step<'n>(&self, node: &'n Value, segment: &PathSegment, depth: usize) -> Option<Cow<'n, Value>>
    where
        'a: 'n,
    {
        self.step_guarded(node, segment, depth, &mut Vec::new())
    }

    /// `active` holds the references entered on the current descent.
    fn step_guarded<'n>(
        &self,
        node: &'n Value,
        segment: &PathSegment,
        depth: usize,
        active: &mut Vec<String>,
    ) -> Option<Cow<'n, Value>>
    where
        'a: 'n,
    {
        if depth > self.max_depth {
            return None;
        }

        let reference = ref_of(node).map(str::to_string);
        if let Some(reference) = &reference {
            if active.contains(reference) {
                tracing::trace!(reference = reference.as_str(), "recursive reference, skipping branch");
                return None;
            }
            active.push(reference.clone());
        }

        let found = match self.deref.deref(node) {
            Cow::Borrowed(resolved) => self.step_resolved(resolved, segment, depth, active),
            Cow::Owned(resolved) => self
                .step_resolved(&resolved, segment, depth, active)
                .map(|found| Cow::Owned(found.into_owned())),
        };

        if reference.is_some() {
            active.pop();
        }
        found
    }

    fn step_resolved<'n>(
        &self,
        node: &'n Value,
        segment: &PathSegment,
        depth: usize,
        active: &mut Vec<String>,
    ) -> Option<Cow<'n, Value>>
    where
        'a: 'n,
    {
        match segment {
            PathSegment::Items => item_schema(node).map(Cow::Borrowed),
            PathSegment::Key(name) => {
                let direct = node
                    .get("properties")
                    .and_then(|props| props.get(name.as_str()))
                    .filter(|prop| prop.is_object());
                if let Some(prop) = direct {
                    return Some(Cow::Borrowed(prop));
                }
                self.step_combinators(node, segment, depth, active)
            }
        }
    }

    fn step_combinators<'n>(
        &self,
        node: &'n Value,
        segment: &PathSegment,
        depth: usize,
        active: &mut Vec<String>,
    ) -> Option<Cow<'n, Value>>
    where
        'a: 'n,
    {
        COMBINATORS
            .iter()
            .filter_map(|key| node.get(*key).and_then(Value::as_array))
            .flatten()
            .filter(|branch| branch.is_object())
            .find_map(|branch| self.step_guarded(branch, segment, depth + 1, active))
    }
}
