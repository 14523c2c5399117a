//! Utility functions for CLI commands

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ScoringConfig;

/// Format error message consistently
pub fn format_error(operation: &str, details: &str) -> String {
    format!("Failed to {}: {}", operation, details)
}

/// Load the scoring configuration from `path`, or the bundled one.
pub fn load_config(path: Option<&Path>) -> Result<ScoringConfig, String> {
    match path {
        Some(p) => ScoringConfig::load(p),
        None => ScoringConfig::bundled(),
    }
    .map_err(|e| format_error("load scoring configuration", &e.to_string()))
}

/// Seeded RNG for annotator selection. An explicit seed beats the config's.
pub fn seeded_rng(seed: Option<u64>, config: &ScoringConfig) -> StdRng {
    let seed = seed.unwrap_or(config.run.seed);
    log::debug!("annotator selection seed {}", seed);
    StdRng::seed_from_u64(seed)
}
