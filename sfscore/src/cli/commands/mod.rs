//! Command implementations for the sfscore CLI
//!
//! Each command has its own module/file.

pub mod config;
pub mod score;
pub mod validate;

// Re-export argument types for parser
pub use config::{ConfigAction, ConfigArgs};
pub use score::ScoreArgs;
pub use validate::ValidateArgs;
