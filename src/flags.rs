//! Command-line tokenizer that shares argv with flags it does not own.
//!
//! Accepted forms: `-name value`, `-name=value`, `--name value`,
//! `--name=value`, and bare `-name` for `Bool` options (which never consume
//! the next token). `-h`/`-help` stops parsing and requests usage. `--`, a
//! lone `-`, or the first token that is not a flag ends flag parsing; the
//! rest are trailing arguments.
//!
//! Flags that do not resolve to an option are shelved, together with a
//! best guess at their value, and handed back by [`FlagParser::release`] so
//! another parser can consume them.

use tracing::debug;

use crate::error::ScopefigError;
use crate::registry::Registry;
use crate::types::{FLAG_SCOPE, OptionType, Value, is_builtin_flag};

/// Outcome of a single parse step.
enum Step {
    Consumed,
    Undefined(String),
    Done,
}

/// Which token after a shelved flag goes to the shelf with it.
#[derive(Clone, Copy)]
enum Trailing {
    None,
    /// The flag names a non-`Bool` option: the next token is its value.
    Value,
    /// Unknown flag: the next token, unless it looks like a flag.
    Guess,
}

/// Walks one argument vector once. Build a fresh parser for each pass.
#[derive(Debug, Clone)]
pub struct FlagParser {
    program: String,
    args: Vec<String>,
    pos: usize,
    trailing: Vec<String>,
    shelved: Vec<String>,
    undefined: Vec<String>,
    help: bool,
}

impl FlagParser {
    /// `args` excludes the program name.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            pos: 0,
            trailing: Vec::new(),
            shelved: Vec::new(),
            undefined: Vec::new(),
            help: false,
        }
    }

    /// Split a full argv (program name first) into a parser.
    pub fn from_argv(argv: &[String]) -> Self {
        match argv.split_first() {
            Some((program, rest)) => Self::new(program.clone(), rest.to_vec()),
            None => Self::new(String::new(), Vec::new()),
        }
    }

    /// Apply only the built-in control flags; every other flag is shelved
    /// without complaint.
    pub fn parse_builtin_only(&mut self, registry: &mut Registry) -> Result<(), ScopefigError> {
        self.run(registry, true)
    }

    /// Apply every flag that names a registered option. Unknown flags are
    /// shelved and recorded in [`undefined`](Self::undefined).
    pub fn parse(&mut self, registry: &mut Registry) -> Result<(), ScopefigError> {
        self.run(registry, false)
    }

    pub fn help_requested(&self) -> bool {
        self.help
    }

    /// Names of flags seen in a full pass that matched no option.
    pub fn undefined(&self) -> &[String] {
        &self.undefined
    }

    /// Program name, then shelved flags, then trailing arguments.
    pub fn release(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.shelved.iter().cloned())
            .chain(self.trailing.iter().cloned())
            .collect()
    }

    fn run(&mut self, registry: &mut Registry, builtin_only: bool) -> Result<(), ScopefigError> {
        loop {
            match self.parse_one(registry, builtin_only)? {
                Step::Consumed => {}
                Step::Undefined(name) => {
                    debug!(event = "scopefig.flags.undefined", flag = %name);
                }
                Step::Done => return Ok(()),
            }
        }
    }

    fn parse_one(
        &mut self,
        registry: &mut Registry,
        builtin_only: bool,
    ) -> Result<Step, ScopefigError> {
        let Some(arg) = self.args.get(self.pos).cloned() else {
            return Ok(Step::Done);
        };

        if arg.len() < 2 || !arg.starts_with('-') {
            self.trailing = self.args[self.pos..].to_vec();
            self.pos = self.args.len();
            return Ok(Step::Done);
        }
        if arg == "--" {
            self.trailing = self.args[self.pos + 1..].to_vec();
            self.pos = self.args.len();
            return Ok(Step::Done);
        }

        let body = arg.strip_prefix("--").unwrap_or(&arg[1..]);
        if body.is_empty() || body.starts_with(['-', '=']) {
            return Err(ScopefigError::BadFlagSyntax(arg));
        }
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        if name == "help" || name == "h" {
            self.help = true;
            return Ok(Step::Done);
        }

        if builtin_only && !is_builtin_flag(name) {
            // Take the same tokens the full pass will, so a value such as
            // `-name -config-save` is never read as a control flag here.
            let value = match (inline, registry.get(name).map(|o| o.option_type())) {
                (Some(_), _) | (None, Some(OptionType::Bool)) => Trailing::None,
                (None, Some(_)) => Trailing::Value,
                (None, None) => Trailing::Guess,
            };
            self.shelve(value);
            debug!(event = "scopefig.flags.shelved", flag = name);
            return Ok(Step::Consumed);
        }

        let Some(option) = registry.get_mut(name) else {
            self.shelve(if inline.is_none() {
                Trailing::Guess
            } else {
                Trailing::None
            });
            self.undefined.push(name.to_string());
            return Ok(Step::Undefined(name.to_string()));
        };

        let invalid = |value: &str, reason: ScopefigError| ScopefigError::InvalidFlagValue {
            flag: name.to_string(),
            value: value.to_string(),
            reason: Box::new(reason),
        };

        if let Some(value) = inline {
            self.pos += 1;
            option
                .set_from_str(value, FLAG_SCOPE)
                .map_err(|e| invalid(value, e))?;
        } else if option.option_type() == OptionType::Bool {
            self.pos += 1;
            option.set_value(Value::Bool(true), FLAG_SCOPE)?;
        } else {
            let Some(value) = self.args.get(self.pos + 1) else {
                return Err(ScopefigError::MissingArgument {
                    flag: name.to_string(),
                });
            };
            option
                .set_from_str(value, FLAG_SCOPE)
                .map_err(|e| invalid(value.as_str(), e))?;
            self.pos += 2;
        }
        Ok(Step::Consumed)
    }

    /// Move the current flag to the shelf, along with the token after it
    /// when `value` says so.
    fn shelve(&mut self, value: Trailing) {
        self.shelved.push(self.args[self.pos].clone());
        self.pos += 1;
        let Some(next) = self.args.get(self.pos) else {
            return;
        };
        let take = match value {
            Trailing::None => false,
            Trailing::Value => true,
            Trailing::Guess => !next.starts_with('-'),
        };
        if take {
            self.shelved.push(next.clone());
            self.pos += 1;
        }
    }
}
