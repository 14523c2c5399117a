//! Situation-frame scoring.
//!
//! # Overview
//!
//! A run compares one system submission against a reference directory:
//!
//! ```text
//! loader ──► reference frames ─┐
//!                              ├─► reconcile ─► ranking  (nDCG@k, Precision@N)
//! submission ─► system frames ─┘                mapmar   (MAP/MAR, GRAVE)
//!                                               overlap  (detection F1)
//!                                               pr_curve (Type+Place sweep)
//!                                               sec      (sentiment/emotion)
//! ```
//!
//! ```rust,ignore
//! use sfscore::eval::{load_reference, load_submission, score_tables, ScoreOptions};
//!
//! let reference = load_reference(root, &ref_opts, &mut rng)?;
//! let system = load_submission(path, &sub_opts)?;
//! let report = score_tables(&reference, system, &config, &NilMapping::identity(), &options);
//! println!("{}", render_diagnostic("run1", &report.diagnostic));
//! ```
//!
//! # Metrics
//!
//! | Module | Metric | Unit |
//! |--------|--------|------|
//! | [`ranking`] | nDCG@k, three tie-break policies | `(place, type)` situation |
//! | [`ranking`] | Precision@N | high-gain situation |
//! | [`mapmar`] | MAP/MAR, five equivalence classes | frame |
//! | [`overlap`] | precision/recall/F1 | `(doc, type[, place])` |
//! | [`pr_curve`] | precision/recall per confidence | `(doc, type, place)` |
//! | [`sec`] | polarity, sentiment value, emotion | sentiment entry |

pub mod edl;
pub mod loader;
pub mod mapmar;
pub mod overlap;
pub mod plot;
pub mod pr_curve;
pub mod ranking;
pub mod reconcile;
pub mod report;
pub mod sec;
pub mod submission;

pub use edl::NilMapping;
pub use loader::{load_reference, ReferenceOptions, ReferenceSet, TsvTable};
pub use mapmar::{diagnostic_scores, mapmar, DiagnosticScores, EqClass, MapMar};
pub use overlap::{type_place_scores, type_scores, Prf};
pub use pr_curve::{pr_curve, PrCurve, PrPoint};
pub use ranking::{ndcg_curve, precision_at_n, reference_gains, DiscountMethod, NdcgCurve, TieBreak};
pub use reconcile::{correct_kb_ids, exclude_nil};
pub use report::{py_float, ReportWriter, ScoreReport};
pub use sec::{sec_scores, SecEqClass, SecScores};
pub use submission::{
    find_package, load_submission, resolve_threshold, threshold_from_filename, SubmissionOptions,
};

use sfscore_core::SystemFrame;

use crate::config::ScoringConfig;

/// What to compute for a run, beyond the always-on metrics.
#[derive(Debug, Clone, Default)]
pub struct ScoreOptions {
    /// Name written into report headers.
    pub system_name: String,
    /// DCG discount.
    pub method: DiscountMethod,
    /// Confidence threshold for the PR operating point.
    pub threshold: f64,
    /// Skip the SEC scorer.
    pub skip_sec: bool,
    /// Compute the Type+Place PR curve.
    pub pr_curves: bool,
    /// Drop unlinked places from both sides before scoring.
    pub exclude_nil: bool,
}

/// Score a loaded submission against a loaded reference.
///
/// System place IDs are reconciled against the reference first; every metric
/// then sees the same reconciled tables.
#[must_use]
pub fn score_tables(
    reference: &ReferenceSet,
    system: Vec<SystemFrame>,
    config: &ScoringConfig,
    mapping: &NilMapping,
    options: &ScoreOptions,
) -> ScoreReport {
    let mut frames = reference.frames.clone();
    let mut system = correct_kb_ids(&system, &frames);
    if options.exclude_nil {
        exclude_nil(&mut frames, &mut system);
    }

    let gains = reference_gains(&frames, config);
    let ndcg = TieBreak::ALL
        .iter()
        .map(|&t| ndcg_curve(&gains, &system, t, options.method))
        .collect();

    let sec = if options.skip_sec {
        log::info!("SEC scoring skipped");
        None
    } else {
        Some(sec_scores(&frames, &reference.sentiments, &system, mapping))
    };

    ScoreReport {
        system_name: options.system_name.clone(),
        threshold: options.threshold,
        diagnostic: diagnostic_scores(&frames, &system),
        ndcg,
        precision_at_n: precision_at_n(&gains, &system, config),
        type_f1: type_scores(&frames, &system),
        type_place_f1: type_place_scores(&frames, &system),
        sec,
        pr_curve: options
            .pr_curves
            .then(|| pr_curve(&frames, &system, options.threshold)),
    }
}
