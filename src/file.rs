//! Locating and reading scope files.
//!
//! A [`SearchScope`] path is a template: `$VAR`, `${VAR}` and a leading `~`
//! are expanded when the scope is read or written, so one scope list works
//! across users and machines. Missing files are not errors; a scope is only
//! a place where configuration *may* live.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value as JsonValue};

use crate::error::ScopefigError;
use crate::types::SearchScope;

/// The file every default scope points at.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// `app` (the working directory) then `user` (`~/.<app_name>/`).
///
/// The user scope is left out when no home directory can be determined.
pub fn default_scopes(app_name: &str) -> Vec<SearchScope> {
    let mut scopes = vec![SearchScope::new("app", &format!("./{CONFIG_FILE_NAME}"))];
    if let Some(user) = directories::UserDirs::new() {
        let path = user
            .home_dir()
            .join(format!(".{}", app_name.to_lowercase()))
            .join(CONFIG_FILE_NAME);
        scopes.push(SearchScope::new("user", &path.to_string_lossy()));
    }
    scopes
}

/// Expand environment variables and `~` in a scope path.
pub fn expand_path(raw: &str) -> Result<PathBuf, ScopefigError> {
    shellexpand::full(raw)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| ScopefigError::PathExpansion {
            path: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Read and parse a scope file.
///
/// Returns `Ok(None)` when the file does not exist. The top level must be a
/// JSON object.
pub fn read_scope(path: &Path) -> Result<Option<Map<String, JsonValue>>, ScopefigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ScopefigError::IoError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let value: JsonValue =
        serde_json::from_str(&content).map_err(|e| ScopefigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

    match value {
        JsonValue::Object(map) => Ok(Some(map)),
        _ => Err(ScopefigError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}
