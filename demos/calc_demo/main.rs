//! # scopefig demo: a two-number calculator
//!
//! Exercises the whole build: defaults, scope files, flags, save/write, and
//! handing leftover arguments to clap.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example calc_demo -- -addend.a 5 -addend.b 2 -subtract
//! cargo run --example calc_demo -- -h
//! ```
//!
//! | Feature             | How to exercise it                                              |
//! |---------------------|-----------------------------------------------------------------|
//! | Compiled defaults   | run with no arguments                                           |
//! | App scope file      | put `{"addend": {"a": 1}}` in `./config.json`                   |
//! | User scope file     | same, in `~/.calc_demo/config.json`                             |
//! | Flag override       | `-addend.b=7.5`                                                 |
//! | Save a default      | `-addend.a 3 -config-save` then run again with no flags         |
//! | Write and exit      | `-config-write -config-scope user`                              |
//! | Flags-only export   | `-subtract -config-save -config-partial`                        |
//! | Alternate file      | `-config-file /tmp/calc.json`                                   |
//! | Provenance          | `-config-debug`                                                 |
//! | Released to clap    | `-subtract --precision 4`                                       |

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use scopefig::{BuildOutcome, ConfigOption, Registry, Scopefig, provenance_listing, validate};

/// Options the calculator leaves to clap.
#[derive(Parser, Debug)]
#[command(name = "calc_demo")]
struct Cli {
    /// Digits after the decimal point.
    #[arg(long, default_value_t = 2)]
    precision: usize,
}

fn init_logging(debug: bool) {
    let default = if debug { "scopefig=debug" } else { "scopefig=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn declare(registry: &mut Registry) -> Result<(), scopefig::ScopefigError> {
    registry.declare([
        ConfigOption::int("addend.a", 10, "The first addend")
            .exportable(true)
            .sort_order(-1),
        ConfigOption::float("addend.b", std::f64::consts::PI, "The second addend")
            .exportable(true)
            .sort_order(-1),
        ConfigOption::bool("subtract", false, "Subtract instead of add").exportable(true),
        ConfigOption::string("name", "Basic Example", "Name of the example")
            .exportable(true)
            .sort_order(1)
            .filter(validate::non_empty_string()),
    ])
}

fn main() {
    let debug = std::env::args().any(|a| a.trim_start_matches('-') == "config-debug");
    init_logging(debug);

    let mut registry = Registry::new();
    if let Err(e) = declare(&mut registry) {
        eprintln!("{e}");
        std::process::exit(2);
    }

    let outcome = Scopefig::builder()
        .app_name("calc_demo")
        .version(env!("CARGO_PKG_VERSION"))
        .description("Adds or subtracts two numbers")
        .example("calc_demo -addend.a 5 -addend.b 2 -subtract", "Subtract 2 from 5")
        .example("calc_demo -addend.a 3 -config-save", "Make 3 the default first addend")
        .allow_undefined_flags(true)
        .build(&mut registry)
        .unwrap_or_else(|e| {
            eprintln!("Configuration error:\n{e}");
            std::process::exit(1);
        });

    let resolved = match outcome {
        BuildOutcome::Ready(resolved) => resolved,
        BuildOutcome::Help(usage) => {
            print!("{usage}");
            return;
        }
        written @ BuildOutcome::Written(_) => {
            println!("{written}");
            return;
        }
    };

    if resolved.debug {
        eprintln!("{}", provenance_listing(&registry));
    }
    if let Some(path) = &resolved.saved {
        eprintln!("Configuration saved to {}", path.display());
    }

    let cli: Cli = resolved.parse_released().unwrap_or_else(|e| e.exit());

    let a = registry.require("addend.a").as_int() as f64;
    let b = registry.require("addend.b").as_float();
    let (op, result) = if registry.require("subtract").as_bool() {
        ("-", a - b)
    } else {
        ("+", a + b)
    };
    println!(
        "{}: {a} {op} {b} = {result:.prec$}",
        registry.require("name").as_str(),
        prec = cli.precision
    );
}
