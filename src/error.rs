use std::path::PathBuf;

use thiserror::Error;

use crate::merge::MergeDiagnostic;
use crate::types::OptionType;
use crate::validate::OptionViolation;

#[derive(Debug, Error)]
pub enum ScopefigError {
    #[error("bad flag syntax: {0}")]
    BadFlagSyntax(String),

    #[error("flag needs an argument: -{flag}")]
    MissingArgument { flag: String },

    #[error("error setting option {flag} to {value}: {reason}")]
    InvalidFlagValue {
        flag: String,
        value: String,
        reason: Box<ScopefigError>,
    },

    #[error("invalid boolean value: {0}")]
    InvalidBoolean(String),

    #[error("invalid {expected} value for '{key}': {reason}")]
    InvalidValue {
        key: String,
        expected: OptionType,
        reason: String,
    },

    #[error("undefined flag(s): {}", format_flags(.0))]
    UndefinedFlags(Vec<String>),

    #[error("option '{0}' is already registered")]
    DuplicateOption(String),

    #[error("json parse error(s):\n{}", format_lines(.0))]
    MergeErrors(Vec<MergeDiagnostic>),

    #[error("failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize configuration for {path}: {source}")]
    SerializeError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{path} does not contain a JSON object at the top level")]
    NotAnObject { path: PathBuf },

    #[error("cannot expand path '{path}': {reason}")]
    PathExpansion { path: String, reason: String },

    #[error("scope '{scope}' not found (available: {})", .available.join(", "))]
    ScopeNotFound {
        scope: String,
        available: Vec<String>,
    },

    #[error("cannot export '{key}': '{conflict}' is both a value and a section")]
    ExportConflict { key: String, conflict: String },

    #[error("some options were empty or invalid:\n{}", format_lines(.0))]
    Validation(Vec<OptionViolation>),

    #[error("app name is required: call .app_name() on the builder or pass a program name")]
    AppNameRequired,
}

fn format_lines<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("  {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_flags(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("-{n}"))
        .collect::<Vec<_>>()
        .join(", ")
}
