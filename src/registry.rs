//! The set of declared options, keyed by name.
//!
//! A registry is built once per program run (or per test), populated with
//! option declarations, then mutated in place by the build: scope files
//! first, flags last. Validation, export, and usage only read it.

use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};

use crate::error::ScopefigError;
use crate::option::ConfigOption;
use crate::persist;
use crate::types::{
    CONFIG_DEBUG, CONFIG_FILE, CONFIG_PARTIAL, CONFIG_SAVE, CONFIG_SCOPE, CONFIG_WRITE,
    ExportMode, FLAG_SCOPE, Value,
};
use crate::validate::OptionViolation;

/// Sort order of the built-in control options; places them after user options.
pub const BUILTIN_SORT_ORDER: i32 = 100;

#[derive(Debug, Clone)]
pub struct Registry {
    options: HashMap<String, ConfigOption>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry holding only the built-in control options.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for option in builtin_options() {
            registry.options.insert(option.name().to_string(), option);
        }
        registry
    }

    /// A registry with no options at all, not even the built-in ones.
    pub fn empty() -> Self {
        Self {
            options: HashMap::new(),
        }
    }

    /// Register an option. Names must be unique.
    pub fn add(&mut self, option: ConfigOption) -> Result<(), ScopefigError> {
        if self.options.contains_key(option.name()) {
            return Err(ScopefigError::DuplicateOption(option.name().to_string()));
        }
        self.options.insert(option.name().to_string(), option);
        Ok(())
    }

    /// Register several options, stopping at the first duplicate.
    pub fn declare(
        &mut self,
        options: impl IntoIterator<Item = ConfigOption>,
    ) -> Result<(), ScopefigError> {
        options.into_iter().try_for_each(|option| self.add(option))
    }

    pub fn get(&self, name: &str) -> Option<&ConfigOption> {
        self.options.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ConfigOption> {
        self.options.get_mut(name)
    }

    /// # Panics
    ///
    /// Panics if no option named `name` was declared.
    pub fn require(&self, name: &str) -> &ConfigOption {
        match self.options.get(name) {
            Some(option) => option,
            None => panic!("option with name {name} doesn't exist"),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Options in no particular order. Use [`sorted`](Self::sorted) for display.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigOption> {
        self.options.values()
    }

    /// Options ordered by `(sort_order, name)`.
    pub fn sorted(&self) -> Vec<&ConfigOption> {
        let mut options: Vec<&ConfigOption> = self.options.values().collect();
        options.sort_by(|a, b| {
            a.meta()
                .sort_order
                .cmp(&b.meta().sort_order)
                .then_with(|| a.name().cmp(b.name()))
        });
        options
    }

    /// Run every option's filters. Fails with one entry per invalid option,
    /// each listing all of that option's reasons.
    pub fn validate(&self) -> Result<(), ScopefigError> {
        let violations: Vec<OptionViolation> = self
            .sorted()
            .into_iter()
            .filter_map(|option| {
                option.validate().err().map(|reasons| OptionViolation {
                    name: option.name().to_string(),
                    reasons,
                })
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ScopefigError::Validation(violations))
        }
    }

    /// Nest the selected options into a JSON object by splitting their names
    /// on `.`. Keys come out sorted.
    pub fn export(&self, mode: ExportMode) -> Result<Map<String, JsonValue>, ScopefigError> {
        let mut entries = Vec::new();
        for option in self.sorted() {
            let include = match mode {
                ExportMode::All => true,
                ExportMode::Exportable => option.is_exportable(),
                ExportMode::FlagsOnly => option.is_exportable() && option.set_by(FLAG_SCOPE),
            };
            if include {
                entries.push((option.name().to_string(), json_value(option)?));
            }
        }
        persist::nest(&entries)
    }
}

/// JSON has no NaN or infinity; serde_json would silently write `null`.
fn json_value(option: &ConfigOption) -> Result<JsonValue, ScopefigError> {
    let invalid = |reason: String| ScopefigError::InvalidValue {
        key: option.name().to_string(),
        expected: option.option_type(),
        reason,
    };
    if let Value::Float(x) = option.value()
        && !x.is_finite()
    {
        return Err(invalid(format!("{x} cannot be exported to JSON")));
    }
    serde_json::to_value(option.value()).map_err(|e| invalid(e.to_string()))
}

fn builtin_options() -> [ConfigOption; 6] {
    [
        ConfigOption::string(
            CONFIG_FILE,
            "",
            "Read this config file on top of the usual search locations",
        ),
        ConfigOption::bool(
            CONFIG_DEBUG,
            false,
            "Show where each configuration value came from",
        ),
        ConfigOption::string(
            CONFIG_SCOPE,
            "",
            "The scope written by -config-save and -config-write",
        ),
        ConfigOption::bool(
            CONFIG_SAVE,
            false,
            "Save the resolved configuration to the target scope",
        ),
        ConfigOption::bool(
            CONFIG_WRITE,
            false,
            "Write the resolved configuration to the target scope and exit",
        ),
        ConfigOption::bool(
            CONFIG_PARTIAL,
            false,
            "Only export options that were set by command-line flags",
        ),
    ]
    .map(|option| option.sort_order(BUILTIN_SORT_ORDER))
}
