//! Help text rendered from the registry.
//!
//! ```text
//! calc (ver. 1.0)
//! Adds or subtracts two numbers
//!
//! Examples:
//!  # Subtract 2 from 5
//!  $ calc -addend.a 5 -addend.b 2 -subtract
//!
//! Flags:
//!  -addend.a (default: 10)
//!      The first addend
//! ```
//!
//! Options are listed by `(sort_order, name)`, with an extra blank line
//! wherever the sort order changes.

use std::fmt::Write;

use crate::registry::Registry;

/// A sample invocation shown in the usage text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub cmd: String,
    pub description: String,
}

impl Example {
    pub fn new(cmd: &str, description: &str) -> Self {
        Self {
            cmd: cmd.to_string(),
            description: description.to_string(),
        }
    }
}

/// Program metadata for the usage header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageInfo {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub examples: Vec<Example>,
}

pub fn render_usage(info: &UsageInfo, registry: &Registry) -> String {
    let mut out = String::new();

    match &info.version {
        Some(version) => writeln!(out, "{} (ver. {version})", info.name).ok(),
        None => writeln!(out, "{}", info.name).ok(),
    };
    if let Some(description) = &info.description {
        writeln!(out, "{description}").ok();
    }
    out.push('\n');

    if !info.examples.is_empty() {
        out.push_str("Examples:\n");
        for example in &info.examples {
            writeln!(out, " # {}", example.description).ok();
            writeln!(out, " $ {}\n", example.cmd).ok();
        }
    }

    let options = registry.sorted();
    let Some(first) = options.first() else {
        return out;
    };
    let width = options.iter().map(|o| o.name().len()).max().unwrap_or(0);

    out.push_str("Flags:\n");
    let mut last_order = first.meta().sort_order;
    for option in options {
        if option.meta().sort_order != last_order {
            out.push('\n');
        }
        writeln!(
            out,
            " -{:<width$} (default: {})\n     {}\n",
            option.name(),
            option.default_value_string(),
            option.description(),
        )
        .ok();
        last_order = option.meta().sort_order;
    }
    out
}
