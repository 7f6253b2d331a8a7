//! Clap adapter for scopefig.
//!
//! Compiled only with the `clap` Cargo feature (on by default). A build
//! consumes every flag that names a registered option and releases the rest
//! (program name, flags it did not own, trailing arguments). This module
//! hands that released vector to a clap parser, so an application can keep
//! clap for its own subcommands and positionals while scopefig owns the
//! configuration flags.
//!
//! ```ignore
//! let outcome = Scopefig::builder()
//!     .allow_undefined_flags(true)
//!     .build(&mut registry)?;
//! if let BuildOutcome::Ready(resolved) = outcome {
//!     let cli: Cli = resolved.parse_released()?;
//! }
//! ```
//!
//! Released flags are passed through verbatim, so a flag shelved as
//! `-verbose` reaches clap as a short-flag cluster. Prefer `--name` forms
//! for flags meant for clap.

use clap::Parser;

use crate::ops::Resolved;

/// Parse released arguments into `P`. The first element is the program name.
pub fn parse_released<P: Parser>(released: &[String]) -> Result<P, clap::Error> {
    P::try_parse_from(released)
}

impl Resolved {
    /// Parse [`released`](Resolved::released) into a clap parser.
    pub fn parse_released<P: Parser>(&self) -> Result<P, clap::Error> {
        parse_released(&self.released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Scopefig;
    use crate::fixtures::test::{argv, calc_registry};
    use crate::ops::BuildOutcome;
    use std::path::PathBuf;

    #[derive(Debug, Parser, PartialEq)]
    struct TestCli {
        #[arg(long)]
        color: Option<String>,
        #[arg(short, long)]
        verbose: bool,
        files: Vec<PathBuf>,
    }

    fn resolved(args: &[&str]) -> Resolved {
        let mut registry = calc_registry();
        let outcome = Scopefig::builder()
            .app_name("calc")
            .search_scopes(vec![])
            .args(argv(args))
            .allow_undefined_flags(true)
            .build(&mut registry)
            .unwrap();
        match outcome {
            BuildOutcome::Ready(resolved) => resolved,
            other => panic!("Expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn released_flags_reach_clap() {
        let r = resolved(&["-addend.a=3", "--color=red", "-v", "a.txt", "b.txt"]);
        let cli: TestCli = r.parse_released().unwrap();
        assert_eq!(
            cli,
            TestCli {
                color: Some("red".into()),
                verbose: true,
                files: vec!["a.txt".into(), "b.txt".into()],
            }
        );
    }

    #[test]
    fn trailing_after_terminator() {
        let r = resolved(&["-subtract", "--", "--verbose"]);
        let cli: TestCli = r.parse_released().unwrap();
        assert!(cli.verbose);
        assert!(cli.files.is_empty());
    }

    #[test]
    fn nothing_released() {
        let r = resolved(&["-subtract"]);
        let cli: TestCli = parse_released(&r.released).unwrap();
        assert_eq!(cli.color, None);
        assert!(!cli.verbose);
    }

    #[test]
    fn clap_rejects_unknown_released_flag() {
        let r = resolved(&["--bogus"]);
        assert!(r.parse_released::<TestCli>().is_err());
    }
}
