//! CLI argument parsing and structure definitions

use clap::{Parser, Subcommand};

use crate::cli::commands;

/// Situation frame scorer
#[derive(Parser)]
#[command(name = "sfscore")]
#[command(
    author,
    version,
    about = "Score situation frame submissions against reference annotation",
    long_about = r#"
sfscore - situation frame scoring

METRICS:
  nDCG@k       ranking quality under standard, vindictive and forgiving tie-breaks
  Precision@N  precision over the N most urgent reference situations
  MAP/MAR      mean average precision/recall over five equivalence classes + GRAVE
  SEC          sentiment polarity, sentiment value and emotion concordance
  F1           Type and Type+Place detection

EXAMPLES:
  sfscore score -s run_0.35.json -g ref/ -o out/ -m run1
  sfscore score -s run.json -g ref/ -o out/ -m run1 -e run.tab -r ref/edl.tab --pr-curves
  sfscore validate run.json
  sfscore config show
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// sfscore subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Score a system submission against a reference directory
    #[command(visible_alias = "s")]
    Score(commands::ScoreArgs),

    /// Check a submission file or package without scoring it
    #[command(visible_alias = "v")]
    Validate(commands::ValidateArgs),

    /// Show or check scoring configuration
    Config(commands::ConfigArgs),
}

impl Cli {
    /// Default log filter implied by `-v` / `-q`.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}
