//! Scoring configuration: gain-tier thresholds and values.
//!
//! Loaded from TOML with the same section and key names the evaluation plan
//! uses:
//!
//! ```toml
//! [GraveFrameCounts]
//! MediumGravity = 2
//! HighGravity = 3
//!
//! [Gain]
//! Low = 1
//! Medium = 5
//! High = 10
//! ```
//!
//! The configuration is a plain value passed into the gain classifier; there
//! is no process-wide state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The configuration shipped with the scorer.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../sfscore.toml");

/// Default seed for annotator selection.
pub const DEFAULT_SEED: u64 = 1;

/// Gravity thresholds that separate the gain tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityThresholds {
    /// Lowest summed gravity that earns the medium gain.
    #[serde(rename = "MediumGravity")]
    pub medium: f64,
    /// Lowest summed gravity that earns the high gain.
    #[serde(rename = "HighGravity")]
    pub high: f64,
}

/// Gain awarded per tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainValues {
    /// Gain for a low-gravity situation.
    #[serde(rename = "Low")]
    pub low: f64,
    /// Gain for a medium-gravity situation.
    #[serde(rename = "Medium")]
    pub medium: f64,
    /// Gain for a high-gravity situation.
    #[serde(rename = "High")]
    pub high: f64,
}

/// Run-level settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Seed for the annotator-selection RNG.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for RunSettings {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED }
    }
}

/// Discrete gain tier of a reference situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GainTier {
    /// Below `MediumGravity`.
    Low,
    /// From `MediumGravity` up to (not including) `HighGravity`.
    Medium,
    /// At or above `HighGravity`.
    High,
}

/// Full scoring configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// `[GraveFrameCounts]`
    #[serde(rename = "GraveFrameCounts")]
    pub thresholds: GravityThresholds,
    /// `[Gain]`
    #[serde(rename = "Gain")]
    pub gains: GainValues,
    /// `[Run]` (optional)
    #[serde(rename = "Run", default)]
    pub run: RunSettings,
}

impl ScoringConfig {
    /// Parse and check a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ScoringConfig = toml::from_str(text)
            .map_err(|e| Error::config(format!("invalid scoring configuration: {}", e)))?;
        config.check()?;
        Ok(config)
    }

    /// Load a configuration file. A missing or unreadable file is fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot open config file {}: {}", path.display(), e))
        })?;
        log::debug!("loaded scoring config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// The configuration shipped with the scorer.
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CONFIG_TOML)
    }

    fn check(&self) -> Result<()> {
        let t = self.thresholds;
        if !t.medium.is_finite() || !t.high.is_finite() {
            return Err(Error::config("gravity thresholds must be finite"));
        }
        if t.medium > t.high {
            return Err(Error::config(format!(
                "MediumGravity ({}) exceeds HighGravity ({})",
                t.medium, t.high
            )));
        }
        Ok(())
    }

    /// Tier for a situation's summed gravity.
    #[must_use]
    pub fn tier(&self, gravity: f64) -> GainTier {
        if gravity >= self.thresholds.high {
            GainTier::High
        } else if gravity >= self.thresholds.medium {
            GainTier::Medium
        } else {
            GainTier::Low
        }
    }

    /// Gain value for a tier.
    #[must_use]
    pub fn gain_of(&self, tier: GainTier) -> f64 {
        match tier {
            GainTier::Low => self.gains.low,
            GainTier::Medium => self.gains.medium,
            GainTier::High => self.gains.high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_config_parses() {
        let config = ScoringConfig::bundled().unwrap();
        assert_eq!(config.thresholds.medium, 2.0);
        assert_eq!(config.thresholds.high, 3.0);
        assert_eq!(config.gains.high, 10.0);
        assert_eq!(config.run.seed, 1);
    }

    #[test]
    fn test_tiers() {
        let config = ScoringConfig::bundled().unwrap();
        assert_eq!(config.tier(3.0), GainTier::High);
        assert_eq!(config.tier(7.4), GainTier::High);
        assert_eq!(config.tier(2.0), GainTier::Medium);
        assert_eq!(config.tier(2.99), GainTier::Medium);
        assert_eq!(config.tier(1.0), GainTier::Low);
        assert_eq!(config.tier(0.0), GainTier::Low);
        assert_eq!(config.gain_of(config.tier(2.5)), 5.0);
    }

    #[test]
    fn test_missing_key_is_error() {
        let text = "[GraveFrameCounts]\nMediumGravity = 2\n\n[Gain]\nLow = 1\nMedium = 5\nHigh = 10\n";
        let err = ScoringConfig::from_toml_str(text).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_run_section_optional() {
        let text = "[GraveFrameCounts]\nMediumGravity = 1\nHighGravity = 4\n\n[Gain]\nLow = 0\nMedium = 2\nHigh = 3\n";
        let config = ScoringConfig::from_toml_str(text).unwrap();
        assert_eq!(config.run.seed, DEFAULT_SEED);
        assert_eq!(config.tier(1.0), GainTier::Medium);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let text = "[GraveFrameCounts]\nMediumGravity = 5\nHighGravity = 3\n\n[Gain]\nLow = 1\nMedium = 5\nHigh = 10\n";
        assert!(ScoringConfig::from_toml_str(text).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScoringConfig::load("/nonexistent/sfscore.toml").unwrap_err();
        assert!(err.to_string().contains("cannot open config file"));
    }
}
