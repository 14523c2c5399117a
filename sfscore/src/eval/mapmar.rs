//! Mean average precision and mean average recall per equivalence class.
//!
//! For every reference situation `(type, place)`:
//!
//! 1. System claims for that type and place are ranked by confidence and
//!    reduced to the best claim per document.
//! 2. **AP**: each claim is paired with every reference frame of the
//!    situation in the same document (a claim with no such frame is a
//!    negative) and labelled by the equivalence class. AP is computed over
//!    the confidence-ranked labels, with tied confidences forming one
//!    threshold.
//! 3. **Recall**: each reference frame is paired with the claim for its
//!    document, if any; recall is the share labelled true.
//!
//! MAP and MAR are the means over situations. A situation whose claims are
//! all negative has AP `0.0`.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use sfscore_core::{ReferenceFrame, SystemFrame};

/// What must agree between a claim and a reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EqClass {
    /// Document, type and place.
    TypePlace,
    /// ... and status (`current`).
    TypePlaceStatus,
    /// ... status and urgency.
    TypePlaceStatusUrgency,
    /// ... status and resolution.
    TypePlaceStatusResolution,
    /// ... status, urgency and resolution.
    TypePlaceStatusUrgencyResolution,
}

impl EqClass {
    /// All classes in report order.
    pub const ALL: [EqClass; 5] = [
        EqClass::TypePlace,
        EqClass::TypePlaceStatus,
        EqClass::TypePlaceStatusUrgency,
        EqClass::TypePlaceStatusResolution,
        EqClass::TypePlaceStatusUrgencyResolution,
    ];

    /// Report label, e.g. `EqClass_Type+Place+Status`.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            EqClass::TypePlace => "EqClass_Type+Place",
            EqClass::TypePlaceStatus => "EqClass_Type+Place+Status",
            EqClass::TypePlaceStatusUrgency => "EqClass_Type+Place+Status+Urgency",
            EqClass::TypePlaceStatusResolution => "EqClass_Type+Place+Status+Resolution",
            EqClass::TypePlaceStatusUrgencyResolution => {
                "EqClass_Type+Place+Status+Urgency+Resolution"
            }
        }
    }

    /// Does `claim` describe the same situation as `frame` under this class?
    #[must_use]
    pub fn matches(&self, frame: &ReferenceFrame, claim: &SystemFrame) -> bool {
        let base = frame.doc_id == claim.document_id
            && frame.situation_type == claim.situation_type
            && frame.kb_id == claim.place_kb_id;
        if !base {
            return false;
        }
        let status = frame.current == claim.current;
        let urgency = frame.urgent == claim.urgent;
        let resolution = frame.unresolved == claim.unresolved;
        match self {
            EqClass::TypePlace => true,
            EqClass::TypePlaceStatus => status,
            EqClass::TypePlaceStatusUrgency => status && urgency,
            EqClass::TypePlaceStatusResolution => status && resolution,
            EqClass::TypePlaceStatusUrgencyResolution => status && urgency && resolution,
        }
    }
}

impl std::fmt::Display for EqClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// MAP and MAR of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapMar {
    /// Mean average precision (`NaN` with no reference situations).
    pub map: f64,
    /// Mean average recall (`NaN` with no reference situations).
    pub mar: f64,
    /// Number of reference situations averaged over.
    pub situations: usize,
}

/// Average precision of `(score, label)` pairs.
///
/// Equal scores form a single threshold, so their order does not matter.
/// Returns `0.0` when there are no pairs or no positive labels.
#[must_use]
pub fn average_precision(scored: &[(f64, bool)]) -> f64 {
    let positives = scored.iter().filter(|(_, l)| *l).count();
    if positives == 0 {
        return 0.0;
    }
    let mut ranked: Vec<(f64, bool)> = scored.to_vec();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut ap = 0.0;
    let mut tp = 0usize;
    let mut seen = 0usize;
    let mut prev_recall = 0.0;
    let mut i = 0;
    while i < ranked.len() {
        let score = ranked[i].0;
        while i < ranked.len() && ranked[i].0.total_cmp(&score).is_eq() {
            tp += usize::from(ranked[i].1);
            seen += 1;
            i += 1;
        }
        let precision = tp as f64 / seen as f64;
        let recall = tp as f64 / positives as f64;
        ap += (recall - prev_recall) * precision;
        prev_recall = recall;
    }
    ap
}

/// Best claim per document for one situation, in descending confidence.
fn situation_claims<'a>(system: &'a [SystemFrame], ty: &str, kb: &str) -> Vec<&'a SystemFrame> {
    let mut claims: Vec<&SystemFrame> = system
        .iter()
        .filter(|s| s.place_kb_id == kb && s.situation_type == ty)
        .collect();
    claims.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut docs = HashSet::new();
    claims.retain(|s| docs.insert(s.document_id.as_str()));
    claims
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// MAP/MAR of `system` against `reference` under `class`.
#[must_use]
pub fn mapmar(reference: &[ReferenceFrame], system: &[SystemFrame], class: EqClass) -> MapMar {
    let mut situations: BTreeMap<(&str, &str), Vec<&ReferenceFrame>> = BTreeMap::new();
    for r in reference.iter().filter(|r| !r.kb_id.is_empty()) {
        situations
            .entry((r.situation_type.as_str(), r.kb_id.as_str()))
            .or_default()
            .push(r);
    }

    let mut precisions = Vec::with_capacity(situations.len());
    let mut recalls = Vec::with_capacity(situations.len());
    for ((ty, kb), frames) in &situations {
        let claims = situation_claims(system, ty, kb);

        let mut scored = Vec::new();
        for claim in &claims {
            let mut paired = false;
            for frame in frames.iter().filter(|f| f.doc_id == claim.document_id) {
                scored.push((claim.confidence, class.matches(frame, claim)));
                paired = true;
            }
            if !paired {
                scored.push((claim.confidence, false));
            }
        }
        precisions.push(average_precision(&scored));

        let returned = frames
            .iter()
            .filter(|f| {
                claims
                    .iter()
                    .find(|c| c.document_id == f.doc_id)
                    .is_some_and(|c| class.matches(f, c))
            })
            .count();
        recalls.push(returned as f64 / frames.len() as f64);
    }

    MapMar {
        map: mean(&precisions),
        mar: mean(&recalls),
        situations: situations.len(),
    }
}

/// MAP/MAR on the urgent and unresolved subset, under the strictest class.
#[must_use]
pub fn grave_mapmar(reference: &[ReferenceFrame], system: &[SystemFrame]) -> MapMar {
    let reference: Vec<ReferenceFrame> =
        reference.iter().filter(|r| r.is_grave()).cloned().collect();
    let system: Vec<SystemFrame> = system.iter().filter(|s| s.is_grave()).cloned().collect();
    mapmar(&reference, &system, EqClass::TypePlaceStatusUrgencyResolution)
}

/// Every equivalence class plus the GRAVE subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticScores {
    /// One entry per class in [`EqClass::ALL`] order.
    pub classes: Vec<(EqClass, MapMar)>,
    /// Urgent and unresolved frames only.
    pub grave: MapMar,
}

/// Score all equivalence classes and the GRAVE subset.
#[must_use]
pub fn diagnostic_scores(reference: &[ReferenceFrame], system: &[SystemFrame]) -> DiagnosticScores {
    let classes = EqClass::ALL
        .iter()
        .map(|&c| (c, mapmar(reference, system, c)))
        .collect();
    DiagnosticScores {
        classes,
        grave: grave_mapmar(reference, system),
    }
}
