//! sfscore - situation frame scoring CLI
//!
//! Scores a system's situation frames against reference annotation and
//! writes one report file per metric.
//!
//! # Usage
//!
//! ```bash
//! # Score a run; the threshold 0.35 is read from the file name
//! sfscore score -s run_0.35.json -g ref/ -o out/ -m run1
//!
//! # Map NIL places through entity-linking output before SEC
//! sfscore score -s run.json -g ref/ -o out/ -m run1 -e run.tab -r ref/edl.tab
//!
//! # Check a submission package (one .json, one .tab)
//! sfscore validate submission/
//!
//! # Print the bundled gain configuration
//! sfscore config show
//! ```
//!
//! Log verbosity follows `RUST_LOG` when set, else `-v` / `-q`.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sfscore::cli::commands::{config, score, validate};
use sfscore::cli::{color, Cli, Commands};

fn init_logging(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    // Reports go to stdout; logs stay on stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);
    log::debug!("sfscore {}", env!("CARGO_PKG_VERSION"));

    let result: Result<(), String> = match cli.command {
        Commands::Score(args) => score::run(args),
        Commands::Validate(args) => validate::run(args),
        Commands::Config(args) => config::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", color("31", "error:"), e);
            ExitCode::FAILURE
        }
    }
}
