//! Error types for sfscore-core.

use thiserror::Error;

/// Result type for sfscore operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sfscore operations.
///
/// Every variant is fatal to a scoring run. Numeric edge cases (empty
/// groups, zero denominators) are never reported through this type; they
/// resolve to `0.0` or `NaN` at the metric that hits them.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided (missing path, bad argument).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (malformed TSV, JSON or TOML).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Scoring configuration is missing or inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Submission failed structural or semantic validation.
    #[error("System submission failed validation: {0}")]
    Validation(String),

    /// No text reference annotations were found under the reference root.
    #[error("Text reference list is empty: {0}")]
    EmptyReference(String),
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an empty-reference error.
    #[must_use]
    pub fn empty_reference(msg: impl Into<String>) -> Self {
        Self::EmptyReference(msg.into())
    }
}
