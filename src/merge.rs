use std::fmt;

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::error::ScopefigError;
use crate::registry::Registry;
use crate::types::OptionType;

/// What went wrong with one key of a merged document.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// The JSON value cannot be stored in the option. Nothing was applied.
    TypeMismatch,
    /// A fractional number was rounded into an `Int64` option. The rounded
    /// value was applied.
    Truncation { difference: f64 },
}

/// A problem found while merging one key of a scope file.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeDiagnostic {
    pub key: String,
    pub got: JsonValue,
    pub expected: OptionType,
    pub kind: DiagnosticKind,
}

impl MergeDiagnostic {
    pub fn type_mismatch(key: &str, got: &JsonValue, expected: OptionType) -> Self {
        Self {
            key: key.to_string(),
            got: got.clone(),
            expected,
            kind: DiagnosticKind::TypeMismatch,
        }
    }

    pub fn truncation(key: &str, got: &JsonValue, expected: OptionType, difference: f64) -> Self {
        Self {
            key: key.to_string(),
            got: got.clone(),
            expected,
            kind: DiagnosticKind::Truncation { difference },
        }
    }
}

impl fmt::Display for MergeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::TypeMismatch => write!(
                f,
                "unexpected type: {:?}: expected {}, got {} ({})",
                self.key,
                self.expected,
                json_kind(&self.got),
                self.got
            ),
            DiagnosticKind::Truncation { difference } => write!(
                f,
                "possible truncation: {:?}: expected {}, got {} ({}); difference: {:e}",
                self.key,
                self.expected,
                json_kind(&self.got),
                self.got,
                difference
            ),
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Apply a parsed scope document to the registry, attributing every applied
/// value to `scope`.
///
/// A key naming an option is applied to it. A key that names no option but
/// holds an object is descended into with `key.` as the new prefix. Anything
/// else is ignored. Keys that fail do not stop the walk: every diagnostic in
/// the document is returned, and every key that did fit has been applied.
pub fn merge_document(
    registry: &mut Registry,
    scope: &str,
    document: &Map<String, JsonValue>,
) -> Vec<MergeDiagnostic> {
    let mut diagnostics = Vec::new();
    walk(registry, scope, document, "", &mut diagnostics);
    diagnostics
}

/// Like [`merge_document`], but folds any diagnostics into
/// [`ScopefigError::MergeErrors`].
pub fn merge_scope(
    registry: &mut Registry,
    scope: &str,
    document: &Map<String, JsonValue>,
) -> Result<(), ScopefigError> {
    let diagnostics = merge_document(registry, scope, document);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(ScopefigError::MergeErrors(diagnostics))
    }
}

fn walk(
    registry: &mut Registry,
    scope: &str,
    node: &Map<String, JsonValue>,
    prefix: &str,
    diagnostics: &mut Vec<MergeDiagnostic>,
) {
    for (key, value) in node {
        let name = format!("{prefix}{key}");
        if let Some(option) = registry.get_mut(&name) {
            if let Some(diag) = option.set_from_json(value, scope) {
                diagnostics.push(diag);
            }
        } else if let JsonValue::Object(child) = value {
            walk(registry, scope, child, &format!("{name}."), diagnostics);
        } else {
            debug!(event = "scopefig.merge.key_ignored", scope, key = %name);
        }
    }
}
