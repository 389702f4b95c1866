//! Field path grammar.
//!
//! A field path is a dot-separated list of property names, each optionally
//! followed by `[]` markers that step into array items:
//!
//! | Path | Addresses |
//! |------|-----------|
//! | `invoice.total` | property `total` of object `invoice` |
//! | `lines[].sku` | `sku` of every element of array `lines` |
//! | `[].name` | `name` of every element of a root array |
//!
//! Leaf-only dotted paths (`invoice.total`) are the subset without markers,
//! so both spellings parse with [`FieldPath::parse`]. [`FieldPath::to_leaf_path`]
//! translates back to the leaf-only spelling.

use std::fmt;

/// Marker addressing the elements of an array.
pub const ITEMS_MARKER: &str = "[]";

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Property lookup by name.
    Key(String),
    /// Descent into the array's item schema.
    Items,
}

/// A parsed field path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parse a path in either grammar.
    ///
    /// Never fails: pieces are trimmed and empty pieces dropped, so a blank
    /// path yields an empty `FieldPath`.
    pub fn parse(path: &str) -> Self {
        let mut segments = Vec::new();
        for piece in path.split('.').map(str::trim).filter(|p| !p.is_empty()) {
            let mut name = piece;
            let mut markers = 0;
            while let Some(rest) = name.strip_suffix(ITEMS_MARKER) {
                name = rest.trim_end();
                markers += 1;
            }
            if !name.is_empty() {
                segments.push(PathSegment::Key(name.to_string()));
            }
            segments.extend(std::iter::repeat(PathSegment::Items).take(markers));
        }
        Self { segments }
    }

    /// Build a path from its segments.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true if the path steps into array items anywhere.
    pub fn has_items(&self) -> bool {
        self.segments.contains(&PathSegment::Items)
    }

    /// Append a property step.
    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(name.into()));
        self
    }

    /// Append an array-items step.
    pub fn items(mut self) -> Self {
        self.segments.push(PathSegment::Items);
        self
    }

    /// Render in the leaf-only dotted spelling (array markers dropped).
    pub fn to_leaf_path(&self) -> String {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                PathSegment::Key(name) => Some(name.as_str()),
                PathSegment::Items => None,
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(name) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Items => f.write_str(ITEMS_MARKER)?,
            }
            first = false;
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

/// Join a property name onto a walk prefix.
pub(crate) fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Append an array marker to a walk prefix.
pub(crate) fn join_items(prefix: &str) -> String {
    format!("{}{}", prefix, ITEMS_MARKER)
}
