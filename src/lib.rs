//! Typed, scoped configuration for command-line programs. Declare options,
//! point at a few JSON files, parse argv, and go.
//!
//! Scopefig resolves every option from layered sources (compiled defaults,
//! a list of named JSON scope files, and command-line flags) into one
//! [`Registry`], remembering which scopes set each value. It can write the
//! result back to any scope, so `-config-save` turns a one-off command line
//! into a persistent default.
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry.declare([
//!     ConfigOption::int("addend.a", 10, "The first addend").exportable(true),
//!     ConfigOption::bool("subtract", false, "Subtract instead of add").exportable(true),
//! ])?;
//!
//! match Scopefig::builder().app_name("calc").build(&mut registry)? {
//!     BuildOutcome::Ready(_) => {
//!         let a = registry.require("addend.a").as_int();
//!     }
//!     BuildOutcome::Help(usage) => print!("{usage}"),
//!     BuildOutcome::Written(_) => {}
//! }
//! ```
//!
//! # Options
//!
//! A [`ConfigOption`] has a name, a description, and a default whose type
//! (`String`, `Bool`, `Int64`, `Float64`) is fixed for the life of the
//! option. Dots in names are structure: `addend.a` is read from
//! `{"addend": {"a": 4}}` in a scope file and written back the same way.
//! Options can carry filters (see [`validate`]) that are checked once, after
//! every source has been applied.
//!
//! # Scopes and precedence
//!
//! A [`SearchScope`] pairs a name with a file path. Scopes are listed
//! highest precedence first; the default list is `app` (`./config.json`)
//! then `user` (`~/.<app>/config.json`). Paths may use `$VAR` and `~`.
//!
//! ```text
//! Compiled defaults
//!        ↑ overridden by
//! Scope files           last scope first, first scope last
//!        ↑ overridden by
//! -config-file <path>   a synthetic scope above all others
//!        ↑ overridden by
//! Command-line flags
//! ```
//!
//! Missing scope files are skipped. A file that cannot be read or is not
//! JSON is logged and skipped. A file whose keys do not fit their options
//! fails the build with every problem listed, after applying the keys that
//! did fit.
//!
//! # Flags
//!
//! Every option is also a flag: `-addend.a 4`, `-addend.a=4`,
//! `--addend.a=4`, and bare `-subtract` for booleans. Flags that match no
//! option are not swallowed; they are returned in [`Resolved::released`]
//! for another parser (see the `cli` module for clap, behind the default
//! `clap` feature).
//!
//! Built-in control flags, registered by [`Registry::new`]:
//!
//! | Flag | Effect |
//! |------|--------|
//! | `-config-file <path>` | merge this file above every scope |
//! | `-config-scope <name>` | scope written by save/write |
//! | `-config-save` | write the resolved configuration, then continue |
//! | `-config-write` | write the resolved configuration, then stop |
//! | `-config-partial` | only write options set by flags |
//! | `-config-debug` | report where each value came from |
//!
//! # Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events named
//! `scopefig.<area>.<what>` and never installs a subscriber.
//!
//! # Errors
//!
//! Every fallible operation returns [`ScopefigError`]. Aggregate variants
//! (merge diagnostics, validation failures, undefined flags) list one
//! problem per line. Asking for an option that was never declared, or
//! reading it as the wrong type, is a programming error and panics.

pub mod error;
pub mod types;
pub mod validate;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod file;
mod flags;
mod merge;
mod ops;
mod option;
mod persist;
mod registry;
mod usage;

#[cfg(test)]
mod fixtures;

pub use builder::{Scopefig, ScopefigBuilder};
#[cfg(feature = "clap")]
pub use cli::parse_released;
pub use error::ScopefigError;
pub use file::{default_scopes, expand_path, read_scope};
pub use flags::FlagParser;
pub use merge::{DiagnosticKind, MergeDiagnostic, merge_document, merge_scope};
pub use ops::{BuildOutcome, Resolved, provenance_listing};
pub use option::{ConfigOption, OptionMeta, TRUNCATION_EPSILON};
pub use persist::{nest, render, write_document};
pub use registry::{BUILTIN_SORT_ORDER, Registry};
pub use types::{ExportMode, OptionType, SearchScope, Value};
pub use usage::{Example, UsageInfo, render_usage};
pub use validate::{Filter, OptionViolation};
