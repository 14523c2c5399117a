//! Confidence-swept precision/recall over `(document, type, place)` triples.
//!
//! Each distinct triple a system claims keeps its highest confidence. Walking
//! the claims from most to least confident, every distinct confidence value
//! contributes one point with the cumulative precision and recall of all
//! claims at or above it. The system's own threshold picks the operating
//! point: the least confident point that still clears the threshold.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use sfscore_core::{ReferenceFrame, SystemFrame};

/// One point of the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrPoint {
    /// Claims at or above this confidence are counted.
    pub confidence: f64,
    /// Correct claims over claims counted.
    pub precision: f64,
    /// Correct claims over reference triples.
    pub recall: f64,
}

/// A full curve and its operating point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrCurve {
    /// Points in descending confidence.
    pub points: Vec<PrPoint>,
    /// Point at the system threshold, if any point clears it.
    pub operating_point: Option<PrPoint>,
    /// Distinct reference triples.
    pub reference_count: usize,
}

/// Build the Type+Place curve. The operating point is absent when no claim
/// reaches `threshold`.
#[must_use]
pub fn pr_curve(
    reference: &[ReferenceFrame],
    system: &[SystemFrame],
    threshold: f64,
) -> PrCurve {
    let truth: HashSet<(&str, &str, &str)> = reference
        .iter()
        .map(|r| (r.doc_id.as_str(), r.situation_type.as_str(), r.kb_id.as_str()))
        .collect();

    let mut best: HashMap<(&str, &str, &str), f64> = HashMap::new();
    for s in system {
        let key = (
            s.document_id.as_str(),
            s.situation_type.as_str(),
            s.place_kb_id.as_str(),
        );
        let conf = best.entry(key).or_insert(s.confidence);
        if s.confidence > *conf {
            *conf = s.confidence;
        }
    }
    let mut claims: Vec<(f64, bool)> = best
        .into_iter()
        .map(|(key, conf)| (conf, truth.contains(&key)))
        .collect();
    claims.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut points = Vec::new();
    let (mut tp, mut seen) = (0usize, 0usize);
    let mut i = 0;
    while i < claims.len() {
        let confidence = claims[i].0;
        while i < claims.len() && claims[i].0.total_cmp(&confidence).is_eq() {
            tp += usize::from(claims[i].1);
            seen += 1;
            i += 1;
        }
        let recall = if truth.is_empty() {
            0.0
        } else {
            tp as f64 / truth.len() as f64
        };
        points.push(PrPoint {
            confidence,
            precision: tp as f64 / seen as f64,
            recall,
        });
    }

    let operating_point = points.iter().rev().find(|p| p.confidence >= threshold).copied();
    PrCurve {
        points,
        operating_point,
        reference_count: truth.len(),
    }
}
