//! Shared vocabulary: option types and values, search scopes, export modes,
//! and the names of the built-in control flags.
//!
//! # Precedence
//!
//! A search-scope list is ordered **highest precedence first**. The build
//! merges it in reverse, so the last entry is read first and every entry
//! above it overwrites what it set:
//!
//! ```text
//! Compiled defaults     ConfigOption::int("port", 8080, ..)
//!        ↑ overridden by
//! Last search scope     e.g. "user" → ~/.myapp/config.json
//!        ↑ overridden by
//! First search scope    e.g. "app"  → ./config.json
//!        ↑ overridden by
//! -config-file <path>   synthetic "flag" scope
//!        ↑ overridden by
//! Command-line flags    -port 3000
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scope name recorded for values that came from the command line. Also the
/// name of the synthetic search scope created by `-config-file`.
pub const FLAG_SCOPE: &str = "flag";

/// Path of an alternate config file, merged above every configured scope.
pub const CONFIG_FILE: &str = "config-file";
/// Show where every value came from after the build.
pub const CONFIG_DEBUG: &str = "config-debug";
/// Scope written by `-config-save` / `-config-write`.
pub const CONFIG_SCOPE: &str = "config-scope";
/// Write the resolved configuration to the target scope and continue.
pub const CONFIG_SAVE: &str = "config-save";
/// Write the resolved configuration to the target scope and stop.
pub const CONFIG_WRITE: &str = "config-write";
/// Only export options that were set on the command line.
pub const CONFIG_PARTIAL: &str = "config-partial";

/// Flags recognized during the built-in-only parse pass.
pub const BUILTIN_FLAGS: [&str; 6] = [
    CONFIG_FILE,
    CONFIG_DEBUG,
    CONFIG_SCOPE,
    CONFIG_SAVE,
    CONFIG_WRITE,
    CONFIG_PARTIAL,
];

pub fn is_builtin_flag(name: &str) -> bool {
    BUILTIN_FLAGS.contains(&name)
}

/// The declared type of an option. Fixed when the option is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    String,
    Bool,
    Int64,
    Float64,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionType::String => "String",
            OptionType::Bool => "Bool",
            OptionType::Int64 => "Int64",
            OptionType::Float64 => "Float64",
        };
        f.write_str(name)
    }
}

/// A typed option value.
///
/// Serializes untagged, so `Value::Int(4)` exports as the JSON number `4`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn kind(&self) -> OptionType {
        match self {
            Value::Str(_) => OptionType::String,
            Value::Bool(_) => OptionType::Bool,
            Value::Int(_) => OptionType::Int64,
            Value::Float(_) => OptionType::Float64,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

/// A named config file location.
///
/// `path` may contain `$VAR` or `${VAR}` placeholders; they are expanded when
/// the file is read or written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchScope {
    pub name: String,
    pub path: String,
}

impl SearchScope {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

/// Which options an export includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    /// Every option marked exportable.
    #[default]
    Exportable,
    /// Exportable options that were set on the command line at least once.
    FlagsOnly,
    /// Every option, exportable or not.
    All,
}
