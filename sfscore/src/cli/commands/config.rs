//! Config command - show or check scoring configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::super::output::color;
use crate::config::{ScoringConfig, DEFAULT_CONFIG_TOML};

/// Show or check scoring configuration
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Action to perform
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// `config` actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the bundled configuration (a starting point for `--config`)
    Show,

    /// Parse a configuration file and print the gain tiers it defines
    Check {
        /// Config file
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

pub fn run(args: ConfigArgs) -> Result<(), String> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", DEFAULT_CONFIG_TOML);
            Ok(())
        }
        ConfigAction::Check { path } => {
            let config = ScoringConfig::load(&path).map_err(|e| e.to_string())?;
            let t = config.thresholds;
            let g = config.gains;
            println!("{} {}", color("32", "ok"), path.display());
            println!("  low:    gravity <  {:<6} gain {}", t.medium, g.low);
            println!("  medium: gravity >= {:<6} gain {}", t.medium, g.medium);
            println!("  high:   gravity >= {:<6} gain {}", t.high, g.high);
            println!("  seed:   {}", config.run.seed);
            Ok(())
        }
    }
}
