//! Schema linting - static analysis of extraction schema files.
//!
//! Checks schema files for:
//! - JSON syntax errors
//! - Documents that are not valid JSON Schema
//! - Local `$ref` pointers that do not resolve
//! - Malformed `x-extraction-hint` annotations
//! - Field definitions the normalizer would have to relocate

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::loader::load_schema;
use crate::normalize::misplaced_keys;
use crate::refs::resolve_local_ref;
use crate::types::{json_type_name, EXTRACTION_HINT_KEY};

/// Keywords whose values are instance data rather than subschemas.
const DATA_KEYWORDS: &[&str] = &["enum", "const", "default", "examples"];

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// JSON Pointer to the issue (e.g., "/properties/total/x-extraction-hint")
    pub path: String,
    pub message: String,
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

impl FileStatus {
    fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        if diagnostics.iter().any(|d| d.severity == Severity::Error) {
            FileStatus::Error
        } else if diagnostics.is_empty() {
            FileStatus::Ok
        } else {
            FileStatus::Warning
        }
    }
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if no file failed.
    ///
    /// In strict mode a file with only warnings counts as failed.
    pub fn is_ok(&self) -> bool {
        self.failed == 0
    }
}

/// Lint a file or directory.
///
/// If path is a directory, recursively finds all .json files.
/// If `strict` is true, warnings are treated as errors.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_schema_files(path);
    let base = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };

    let results: Vec<FileResult> = files.iter().map(|file| lint_file(file, base)).collect();

    let count = |severity: Severity| {
        results
            .iter()
            .flat_map(|r| &r.diagnostics)
            .filter(|d| d.severity == severity)
            .count()
    };
    let errors = count(Severity::Error);
    let warnings = count(Severity::Warning);

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    tracing::debug!(files = files.len(), errors, warnings, failed, "lint finished");

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors,
        warnings,
        results,
    }
}

/// Lint a single schema file.
///
/// The reported file name is relative to `base_path` when possible.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let display = file.strip_prefix(base_path).unwrap_or(file).to_path_buf();

    let diagnostics: Vec<Diagnostic> = match load_schema(file) {
        Ok(schema) => lint_schema(&schema)
            .into_iter()
            .map(|d| Diagnostic {
                file: display.clone(),
                ..d
            })
            .collect(),
        Err(e) => vec![Diagnostic {
            severity: Severity::Error,
            code: "E001".to_string(),
            file: display.clone(),
            path: "/".to_string(),
            message: format!("syntax error: {}", e),
        }],
    };

    FileResult {
        status: FileStatus::from_diagnostics(&diagnostics),
        file: display,
        diagnostics,
    }
}

/// Lint an already-parsed schema document.
///
/// Diagnostics carry an empty `file`.
pub fn lint_schema(schema: &Value) -> Vec<Diagnostic> {
    let mut lint = Lint {
        root: schema,
        diagnostics: Vec::new(),
    };

    lint.check_node(schema, "");
    let has_broken_refs = lint.diagnostics.iter().any(|d| d.code == "E003");
    if !has_broken_refs {
        lint.check_meta_schema();
    }
    lint.check_misplaced_fields();

    lint.diagnostics
}

struct Lint<'a> {
    root: &'a Value,
    diagnostics: Vec<Diagnostic>,
}

impl Lint<'_> {
    fn push(&mut self, severity: Severity, code: &str, path: &str, message: String) {
        self.diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            file: PathBuf::new(),
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            message,
        });
    }

    fn check_meta_schema(&mut self) {
        if let Err(e) = jsonschema::validator_for(self.root) {
            self.push(
                Severity::Error,
                "E002",
                "",
                format!("not a valid JSON Schema: {}", e),
            );
        }
    }

    fn check_misplaced_fields(&mut self) {
        for key in misplaced_keys(self.root) {
            self.push(
                Severity::Warning,
                "W001",
                &pointer(key, ""),
                format!("field definition \"{}\" sits outside properties", key),
            );
        }
    }

    fn check_node(&mut self, value: &Value, path: &str) {
        match value {
            Value::Object(map) => {
                self.check_ref(map, path);
                self.check_hint(map, path);
                self.check_required(map, path);

                for (key, child) in map {
                    if DATA_KEYWORDS.contains(&key.as_str()) {
                        continue;
                    }
                    self.check_node(child, &pointer(key, path));
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.check_node(item, &format!("{}/{}", path, i));
                }
            }
            _ => {}
        }
    }

    fn check_ref(&mut self, map: &Map<String, Value>, path: &str) {
        let Some(Value::String(reference)) = map.get("$ref") else {
            return;
        };
        // Only local pointers can be checked without loading other documents
        if !reference.trim().starts_with('#') {
            return;
        }
        if resolve_local_ref(self.root, reference).is_none() {
            self.push(
                Severity::Error,
                "E003",
                &pointer("$ref", path),
                format!("reference not found: {}", reference),
            );
        }
    }

    fn check_hint(&mut self, map: &Map<String, Value>, path: &str) {
        let Some(hint) = map.get(EXTRACTION_HINT_KEY) else {
            return;
        };
        let hint_path = pointer(EXTRACTION_HINT_KEY, path);
        match hint {
            Value::String(text) if text.trim().is_empty() => self.push(
                Severity::Warning,
                "W003",
                &hint_path,
                format!("blank {} is ignored", EXTRACTION_HINT_KEY),
            ),
            Value::String(_) => {}
            other => self.push(
                Severity::Error,
                "E004",
                &hint_path,
                format!(
                    "invalid {} type: expected string, got {}",
                    EXTRACTION_HINT_KEY,
                    json_type_name(other)
                ),
            ),
        }
    }

    fn check_required(&mut self, map: &Map<String, Value>, path: &str) {
        // Properties may come from elsewhere when the node composes schemas
        if ["$ref", "allOf", "anyOf", "oneOf"]
            .iter()
            .any(|key| map.contains_key(*key))
        {
            return;
        }
        let (Some(Value::Array(required)), Some(Value::Object(properties))) =
            (map.get("required"), map.get("properties"))
        else {
            return;
        };

        for (i, entry) in required.iter().enumerate() {
            let Some(name) = entry.as_str() else {
                continue;
            };
            if !properties.contains_key(name.trim()) {
                self.push(
                    Severity::Warning,
                    "W002",
                    &format!("{}/required/{}", path, i),
                    format!("required field \"{}\" is not declared in properties", name),
                );
            }
        }
    }
}

/// Append `key` to a JSON Pointer, escaping `~` and `/`.
fn pointer(key: &str, parent: &str) -> String {
    format!("{}/{}", parent, key.replace('~', "~0").replace('/', "~1"))
}

/// Collect all .json files in a path (file or directory).
fn collect_schema_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            files.push(path);
        }
    }
}
