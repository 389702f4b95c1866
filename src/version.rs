//! Content fingerprints for schema documents.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical::{canonicalize, canonicalize_serializable};
use crate::error::CanonicalError;

/// Lowercase hex SHA-256 of a schema's canonical form.
///
/// Opaque: two versions are equal iff the canonical content is equal. It
/// carries no ordering and is not a semantic version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(String);

impl SchemaVersion {
    /// Hash already-canonical text.
    pub fn from_canonical(canonical: &str) -> Self {
        let hash = Sha256::digest(canonical.as_bytes());
        Self(format!("{:x}", hash))
    }

    /// Get the hex string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if `schema` still hashes to this version.
    ///
    /// Used to answer "did the schema change since this job ran".
    pub fn matches(&self, schema: &Value) -> bool {
        compute_version(schema) == *self
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SchemaVersion {
    fn from(s: String) -> Self {
        Self(s.trim().to_ascii_lowercase())
    }
}

impl From<&str> for SchemaVersion {
    fn from(s: &str) -> Self {
        Self(s.trim().to_ascii_lowercase())
    }
}

/// Compute the version of a schema document.
pub fn compute_version(schema: &Value) -> SchemaVersion {
    let version = SchemaVersion::from_canonical(&canonicalize(schema));
    tracing::trace!(%version, "computed schema version");
    version
}

/// Compute the version of any serializable schema representation.
///
/// # Errors
///
/// Returns `CanonicalError` if the value has no JSON representation.
pub fn compute_version_of<T>(schema: &T) -> Result<SchemaVersion, CanonicalError>
where
    T: Serialize + ?Sized,
{
    canonicalize_serializable(schema).map(|canonical| SchemaVersion::from_canonical(&canonical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn version_is_lowercase_sha256_hex() {
        let version = compute_version(&json!({}));
        assert_eq!(version.as_str().len(), 64);
        assert!(version
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        // sha256("{}")
        assert_eq!(
            version.as_str(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn version_is_stable_across_key_order() {
        let a: Value = serde_json::from_str(r#"{"type":"object","title":"Invoice"}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"title":"Invoice","type":"object"}"#).unwrap();
        assert_eq!(compute_version(&a), compute_version(&b));
        assert_eq!(compute_version(&a), compute_version(&a));
    }

    #[test]
    fn version_changes_with_any_leaf() {
        let a = json!({ "properties": { "total": { "type": "number" } } });
        let b = json!({ "properties": { "total": { "type": "integer" } } });
        assert_ne!(compute_version(&a), compute_version(&b));
    }

    #[test]
    fn matches_detects_drift() {
        let schema = json!({ "type": "object" });
        let version = compute_version(&schema);
        assert!(version.matches(&schema));
        assert!(!version.matches(&json!({ "type": "array" })));
    }

    #[test]
    fn parsed_versions_are_normalized() {
        let version = compute_version(&json!({}));
        let stored = SchemaVersion::from(format!(" {} ", version.as_str().to_uppercase()));
        assert_eq!(stored, version);
    }

    #[test]
    fn serializable_and_value_paths_agree() {
        #[derive(Serialize)]
        struct Node {
            r#type: &'static str,
        }
        let from_struct = compute_version_of(&Node { r#type: "string" }).unwrap();
        assert_eq!(from_struct, compute_version(&json!({ "type": "string" })));
    }

    #[test]
    fn serializes_as_plain_string() {
        let version = compute_version(&json!(null));
        let encoded = serde_json::to_value(&version).unwrap();
        assert_eq!(encoded, Value::String(version.to_string()));
    }
}
