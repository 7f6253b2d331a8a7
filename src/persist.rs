//! Writing the registry back out as a scope file.
//!
//! Dot-separated option names become nested JSON objects
//! (`addend.a` → `{"addend": {"a": ..}}`), so an exported file merges back
//! into the same options it came from. Output is tab-indented with keys in
//! sorted order, which keeps diffs of saved configs stable.

use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::error::ScopefigError;

/// Nest `(dotted name, value)` pairs into one JSON object.
///
/// Fails when one name is a prefix section of another, e.g. both `a` and
/// `a.b`.
pub fn nest(entries: &[(String, JsonValue)]) -> Result<Map<String, JsonValue>, ScopefigError> {
    let mut root = Map::new();
    for (key, value) in entries {
        set_nested(&mut root, key, value.clone())?;
    }
    Ok(root)
}

fn set_nested(
    root: &mut Map<String, JsonValue>,
    key: &str,
    value: JsonValue,
) -> Result<(), ScopefigError> {
    let conflict = |at: &str| ScopefigError::ExportConflict {
        key: key.to_string(),
        conflict: at.to_string(),
    };

    let (parents, leaf) = match key.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, key),
    };

    let mut current = root;
    let mut path = String::new();
    for segment in parents.into_iter().flat_map(|p| p.split('.')) {
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(segment);
        current = match current
            .entry(segment)
            .or_insert_with(|| JsonValue::Object(Map::new()))
        {
            JsonValue::Object(map) => map,
            _ => return Err(conflict(&path)),
        };
    }

    if matches!(current.get(leaf), Some(JsonValue::Object(_))) {
        return Err(conflict(key));
    }
    current.insert(leaf.to_string(), value);
    Ok(())
}

/// Pretty-print with tab indentation and a trailing newline.
pub fn render(document: &Map<String, JsonValue>) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"\t"));
    document.serialize(&mut ser)?;
    out.push(b'\n');
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Write `document` to `path`, creating parent directories as needed.
/// Replaces any existing file.
pub fn write_document(path: &Path, document: &Map<String, JsonValue>) -> Result<(), ScopefigError> {
    let content = render(document).map_err(|e| ScopefigError::SerializeError {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| ScopefigError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, &content).map_err(|e| ScopefigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!(
        event = "scopefig.persist.written",
        path = %path.display(),
        keys = document.len(),
    );
    Ok(())
}
