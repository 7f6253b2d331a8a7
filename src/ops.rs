//! Build results and the provenance listing shown by `-config-debug`.

use std::fmt;
use std::path::PathBuf;

use crate::registry::Registry;
use crate::types::Value;

/// What a successful build hands back besides the mutated registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Program name, shelved flags, then trailing arguments; ready for
    /// another argument parser.
    pub released: Vec<String>,
    /// File written by `-config-save`, if any.
    pub saved: Option<PathBuf>,
    /// `-config-debug` was given.
    pub debug: bool,
}

/// How a build ended. Errors are returned separately as
/// [`ScopefigError`](crate::ScopefigError).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Configuration is resolved and validated; the program should run.
    Ready(Resolved),
    /// `-h`/`-help` was given. Holds the usage text; the program should print
    /// it and exit successfully.
    Help(String),
    /// `-config-write` wrote this file; the program should exit successfully.
    Written(PathBuf),
}

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildOutcome::Ready(Resolved {
                saved: Some(path), ..
            }) => write!(f, "Configuration saved to {}", path.display()),
            BuildOutcome::Ready(_) => Ok(()),
            BuildOutcome::Help(usage) => write!(f, "{usage}"),
            BuildOutcome::Written(path) => {
                write!(f, "Configuration written to {}", path.display())
            }
        }
    }
}

/// One line per option, `name = value  [scope, ..]`, in usage order.
/// Options nothing has set show `[default]`.
pub fn provenance_listing(registry: &Registry) -> String {
    registry
        .sorted()
        .into_iter()
        .map(|option| {
            let scopes = if option.scopes().is_empty() {
                "default".to_string()
            } else {
                option.scopes().join(", ")
            };
            format!(
                "{} = {}  [{scopes}]",
                option.name(),
                format_value(option.value())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::calc_registry;
    use crate::option::ConfigOption;

    #[test]
    fn listing_shows_scopes_in_order() {
        let mut registry = Registry::empty();
        registry
            .declare([
                ConfigOption::int("addend.a", 10, ""),
                ConfigOption::string("name", "x", ""),
            ])
            .unwrap();
        let a = registry.get_mut("addend.a").unwrap();
        a.set_from_str("2", "user").unwrap();
        a.set_from_str("4", "flag").unwrap();

        assert_eq!(
            provenance_listing(&registry),
            "addend.a = 4  [user, flag]\nname = \"x\"  [default]"
        );
    }

    #[test]
    fn listing_covers_every_option() {
        let registry = calc_registry();
        let listing = provenance_listing(&registry);
        assert_eq!(listing.lines().count(), registry.len());
    }

    #[test]
    fn outcome_display() {
        let written = BuildOutcome::Written(PathBuf::from("/tmp/app/config.json"));
        assert_eq!(
            written.to_string(),
            "Configuration written to /tmp/app/config.json"
        );

        let help = BuildOutcome::Help("calc\n".into());
        assert_eq!(help.to_string(), "calc\n");

        let ready = BuildOutcome::Ready(Resolved {
            released: vec!["calc".into()],
            saved: None,
            debug: false,
        });
        assert_eq!(ready.to_string(), "");
    }
}
