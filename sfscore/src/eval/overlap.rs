//! Detection precision, recall and F1 over distinct frame keys.
//!
//! Confidence and gravity play no part: a system either detected a
//! `(document, type)` (or `(document, type, place)`) that the reference has,
//! or it did not.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use sfscore_core::{ReferenceFrame, SystemFrame};

/// Precision, recall and F1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prf {
    /// Matched over system.
    pub precision: f64,
    /// Matched over reference.
    pub recall: f64,
    /// Harmonic mean of the two.
    pub f1: f64,
}

impl Prf {
    /// Harmonic mean, following whatever sentinel the inputs carry
    /// (`0/0` gives `NaN`).
    #[must_use]
    pub fn new(precision: f64, recall: f64) -> Self {
        Self {
            precision,
            recall,
            f1: 2.0 * precision * recall / (precision + recall),
        }
    }

    /// Scores from set counts, where any zero denominator gives `0.0`.
    #[must_use]
    pub fn from_counts(matched: usize, system: usize, reference: usize) -> Self {
        let precision = if system == 0 { 0.0 } else { matched as f64 / system as f64 };
        let recall = if reference == 0 { 0.0 } else { matched as f64 / reference as f64 };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self { precision, recall, f1 }
    }
}

fn set_scores<K: Eq + Hash>(reference: HashSet<K>, system: HashSet<K>) -> Prf {
    let matched = system.intersection(&reference).count();
    Prf::from_counts(matched, system.len(), reference.len())
}

/// Scores over distinct `(document, type)` pairs.
#[must_use]
pub fn type_scores(reference: &[ReferenceFrame], system: &[SystemFrame]) -> Prf {
    set_scores(
        reference
            .iter()
            .map(|r| (r.doc_id.as_str(), r.situation_type.as_str()))
            .collect(),
        system
            .iter()
            .map(|s| (s.document_id.as_str(), s.situation_type.as_str()))
            .collect(),
    )
}

/// Scores over distinct `(document, type, place)` triples.
#[must_use]
pub fn type_place_scores(reference: &[ReferenceFrame], system: &[SystemFrame]) -> Prf {
    set_scores(
        reference
            .iter()
            .map(|r| (r.doc_id.as_str(), r.situation_type.as_str(), r.kb_id.as_str()))
            .collect(),
        system
            .iter()
            .map(|s| {
                (
                    s.document_id.as_str(),
                    s.situation_type.as_str(),
                    s.place_kb_id.as_str(),
                )
            })
            .collect(),
    )
}
