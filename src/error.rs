//! Error types for schema loading and canonicalization.
//!
//! Introspection itself (required fields, hints, semantics, normalization)
//! is total: malformed schemas degrade to empty results instead of erroring.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a schema document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// A value could not be turned into a JSON document for canonicalization.
///
/// Only reachable through the generic `Serialize` entry points; a parsed
/// `serde_json::Value` always canonicalizes.
#[derive(Debug, Error)]
pub enum CanonicalError {
    #[error("value is not JSON-serializable: {source}")]
    NotSerializable {
        #[source]
        source: serde_json::Error,
    },
}

impl CanonicalError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("schema.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = LoadError::InvalidJson { source };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn canonical_error_display() {
        let source = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = CanonicalError::NotSerializable { source };
        assert!(err.to_string().starts_with("value is not JSON-serializable"));
        assert_eq!(err.exit_code(), 2);
    }
}
