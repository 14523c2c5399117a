//! # sfscore
//!
//! Scoring for situation-frame extraction: how well a system's frames (need
//! or issue type, place, status, urgency, resolution, sentiment) agree with
//! human annotation.
//!
//! - **Ranking**: nDCG@k with standard, vindictive and forgiving tie-breaks; Precision@N
//! - **Set overlap**: MAP/MAR over five equivalence classes and the GRAVE subset
//! - **Sentiment**: polarity, value and emotion concordance (SEC)
//! - **Detection**: Type and Type+Place precision/recall/F1, PR curves
//!
//! Record types (`ReferenceFrame`, `SystemFrame`, ...) are in `sfscore-core`
//! and re-exported here.

#![warn(missing_docs)]

pub mod config;
pub mod eval;
pub mod gravity;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{GainTier, ScoringConfig};
pub use gravity::{Gravity, GravityKind};

// Re-export sfscore-core types
pub use sfscore_core::{
    is_known_situation_type, Emotions, Error, FrameFacts, FrameKind, Modality, ReferenceFrame,
    Result, SecBlock, SentimentAnnotation, SystemFrame,
};
