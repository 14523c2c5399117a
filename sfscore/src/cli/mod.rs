//! CLI module for the sfscore binary
//!
//! Argument parsing lives in [`parser`]; each subcommand's implementation is
//! in the `commands` submodule.

pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;

pub use output::*;
pub use parser::*;
pub use utils::*;
