//! Sentiment, emotion and polarity concordance (SEC).
//!
//! Submitted frames carry `SEC` blocks: who holds a sentiment about the
//! situation (`Source`), its signed strength and three emotion flags. The
//! reference equivalent is the sentiment table joined to the reference frame
//! each row targets.
//!
//! Each side is flattened to one entry per sentiment, keyed by document,
//! place and type (and status for the stricter class). A submitted entry
//! matches a reference entry when keys, polarity and source all agree.
//!
//! | Score | Numerator | Precision denominator | Recall denominator |
//! |-------|-----------|-----------------------|--------------------|
//! | Polarity | matched submissions | submissions | matched + missed references |
//! | Sentiment | Σ value penalty | submissions | matched + missed references |
//! | Emotion | Σ equal flags | 3 × submissions | 3 × references |
//!
//! Zero denominators yield `NaN` rather than an error.

#![allow(missing_docs)] // Entry structs mirror the table columns

use serde::{Deserialize, Serialize};
use sfscore_core::{Emotions, ReferenceFrame, SentimentAnnotation, SystemFrame};

use super::edl::NilMapping;
use super::overlap::Prf;

/// Value penalty factor per band of disagreement.
pub const PENALTY_FACTOR: f64 = 0.97;

/// Which frame fields must agree for sentiments to be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecEqClass {
    /// Document, place and type.
    TypePlace,
    /// Document, place, type and raw status.
    TypePlaceStatus,
}

impl SecEqClass {
    /// Both classes in report order.
    pub const ALL: [SecEqClass; 2] = [SecEqClass::TypePlace, SecEqClass::TypePlaceStatus];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            SecEqClass::TypePlace => "EqClass_Type+Place",
            SecEqClass::TypePlaceStatus => "EqClass_Type+Place+Status",
        }
    }

    fn uses_status(&self) -> bool {
        matches!(self, SecEqClass::TypePlaceStatus)
    }
}

/// One submitted sentiment with its frame key.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedSentiment {
    pub document_id: String,
    /// Place ID after NIL remapping.
    pub place_kb_id: String,
    pub situation_type: String,
    pub status: Option<String>,
    pub source: String,
    pub sentiment: f64,
    pub polarity: &'static str,
    pub emotions: Emotions,
}

/// One reference sentiment joined to the frame it targets.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSentiment {
    pub doc_id: String,
    pub kb_id: String,
    pub situation_type: String,
    pub status: Option<String>,
    pub source: String,
    pub polarity: Option<String>,
    pub sentiment_value: Option<f64>,
    pub emotions: Emotions,
}

/// One entry per SEC block, place IDs passed through `mapping`.
#[must_use]
pub fn flatten_submission(system: &[SystemFrame], mapping: &NilMapping) -> Vec<SubmittedSentiment> {
    system
        .iter()
        .flat_map(|frame| {
            frame.sec.iter().map(move |block| SubmittedSentiment {
                document_id: frame.document_id.clone(),
                place_kb_id: mapping.map(&frame.place_kb_id).to_string(),
                situation_type: frame.situation_type.clone(),
                status: frame.status.clone(),
                source: block.source.clone(),
                sentiment: block.sentiment,
                polarity: block.polarity(),
                emotions: block.emotions(),
            })
        })
        .collect()
}

/// Join sentiments to the reference frames they target.
///
/// Sentiments whose target is not in `frames` are dropped. Key fields come
/// from the frame; the source is the sentiment's own entity ID.
#[must_use]
pub fn reference_entries(
    frames: &[ReferenceFrame],
    sentiments: &[SentimentAnnotation],
) -> Vec<ReferenceSentiment> {
    let mut out = Vec::new();
    for s in sentiments {
        for f in frames
            .iter()
            .filter(|f| f.doc_id == s.doc_id && f.frame_id == s.target)
        {
            out.push(ReferenceSentiment {
                doc_id: f.doc_id.clone(),
                kb_id: f.kb_id.clone(),
                situation_type: f.situation_type.clone(),
                status: f.status.clone(),
                source: s.source.clone(),
                polarity: s.polarity.clone(),
                sentiment_value: s.sentiment_value,
                emotions: s.emotions,
            });
        }
    }
    out
}

fn same_key(class: SecEqClass, r: &ReferenceSentiment, s: &SubmittedSentiment) -> bool {
    let base = r.doc_id == s.document_id
        && r.kb_id == s.place_kb_id
        && r.situation_type == s.situation_type;
    if !class.uses_status() {
        return base;
    }
    // A missing status equals nothing, not even another missing status.
    base && matches!((&r.status, &s.status), (Some(a), Some(b)) if a == b)
}

fn is_match(class: SecEqClass, r: &ReferenceSentiment, s: &SubmittedSentiment) -> bool {
    same_key(class, r, s) && r.polarity.as_deref() == Some(s.polarity) && r.source == s.source
}

/// Credit for a matched sentiment value.
///
/// Full within 0.5 of the reference, [`PENALTY_FACTOR`] within 1.5, its
/// square beyond that or when the reference has no value.
#[must_use]
pub fn penalty(reference: Option<f64>, submitted: f64) -> f64 {
    match reference.map(|r| (submitted - r).abs()) {
        Some(diff) if diff <= 0.5 => 1.0,
        Some(diff) if diff <= 1.5 => PENALTY_FACTOR,
        _ => PENALTY_FACTOR * PENALTY_FACTOR,
    }
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        f64::NAN
    } else {
        numerator / denominator as f64
    }
}

/// SEC scores for one equivalence class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecScores {
    pub class: SecEqClass,
    pub polarity: Prf,
    pub sentiment: Prf,
    pub emotion: Prf,
}

/// Score already-flattened entries under `class`.
///
/// Under the status class, submitted entries without a status are left out.
#[must_use]
pub fn score_entries(
    class: SecEqClass,
    reference: &[ReferenceSentiment],
    submitted: &[SubmittedSentiment],
) -> SecScores {
    let submitted: Vec<&SubmittedSentiment> = submitted
        .iter()
        .filter(|s| !class.uses_status() || s.status.is_some())
        .collect();

    let mut tp = 0usize;
    let mut penalized = 0.0;
    let mut agreeing = 0usize;
    for s in &submitted {
        if let Some(first) = reference.iter().find(|r| is_match(class, r, s)) {
            tp += 1;
            penalized += penalty(first.sentiment_value, s.sentiment);
            agreeing += s.emotions.agreement(&first.emotions);
        }
    }
    let fp = submitted.len() - tp;
    let missed = reference
        .iter()
        .filter(|r| !submitted.iter().any(|s| is_match(class, r, s)))
        .count();

    SecScores {
        class,
        polarity: Prf::new(ratio(tp as f64, tp + fp), ratio(tp as f64, tp + missed)),
        sentiment: Prf::new(ratio(penalized, tp + fp), ratio(penalized, tp + missed)),
        emotion: Prf::new(
            ratio(agreeing as f64, 3 * submitted.len()),
            ratio(agreeing as f64, 3 * reference.len()),
        ),
    }
}

/// SEC scores for both equivalence classes.
#[must_use]
pub fn sec_scores(
    frames: &[ReferenceFrame],
    sentiments: &[SentimentAnnotation],
    system: &[SystemFrame],
    mapping: &NilMapping,
) -> Vec<SecScores> {
    let reference = reference_entries(frames, sentiments);
    let submitted = flatten_submission(system, mapping);
    log::info!(
        "SEC: {} reference and {} submitted sentiment entries",
        reference.len(),
        submitted.len()
    );
    SecEqClass::ALL
        .iter()
        .map(|&class| score_entries(class, &reference, &submitted))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::edl::EDL_COLUMNS;
    use crate::eval::loader::TsvTable;
    use sfscore_core::SecBlock;

    fn block(source: &str, sentiment: f64, fear: bool) -> SecBlock {
        SecBlock {
            source: source.into(),
            sentiment,
            anger: false,
            fear,
            joy: false,
        }
    }

    fn sentiment(
        target: &str,
        source: &str,
        polarity: &str,
        value: f64,
        cell: &str,
    ) -> SentimentAnnotation {
        SentimentAnnotation {
            doc_id: "D1".into(),
            target: target.into(),
            source: source.into(),
            polarity: Some(polarity.into()),
            sentiment_value: Some(value),
            emotions: Emotions::from_cell(cell),
        }
    }

    fn frames() -> Vec<ReferenceFrame> {
        let mut f1 = ReferenceFrame::new("D1", "F1", "100", "food");
        f1.status = Some("current".into());
        let f2 = ReferenceFrame::new("D1", "F2", "200", "water");
        vec![f1, f2]
    }

    #[test]
    fn test_penalty_bands() {
        assert_eq!(penalty(Some(-2.0), -2.4), 1.0);
        assert_eq!(penalty(Some(-2.0), -1.0), PENALTY_FACTOR);
        assert_eq!(penalty(Some(-2.0), 1.0), PENALTY_FACTOR * PENALTY_FACTOR);
        assert_eq!(penalty(None, 1.0), PENALTY_FACTOR * PENALTY_FACTOR);
    }

    #[test]
    fn test_flatten_preserves_entry_count() {
        let mut a = SystemFrame::new(0.9, "D1", "NIL7", "food");
        a.sec = vec![block("E1", -1.0, true), block("E2", 2.0, false)];
        let b = SystemFrame::new(0.8, "D1", "100", "food");
        let mut c = SystemFrame::new(0.8, "D2", "5", "med");
        c.sec = vec![block("E3", 0.0, false)];
        let flat = flatten_submission(&[a, b, c], &NilMapping::identity());
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0].polarity, "negative");
        assert_eq!(flat[1].polarity, "positive");
        // Zero sentiment is not positive.
        assert_eq!(flat[2].polarity, "negative");
    }

    #[test]
    fn test_reference_join_drops_unknown_targets() {
        let sentiments = vec![
            sentiment("F1", "E1", "negative", -2.0, "fear"),
            sentiment("F9", "E1", "negative", -2.0, "none"),
        ];
        let entries = reference_entries(&frames(), &sentiments);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kb_id, "100");
        assert_eq!(entries[0].source, "E1");
        assert!(entries[0].emotions.fear);
    }

    #[test]
    fn test_perfect_match() {
        let sentiments = vec![sentiment("F1", "E1", "negative", -2.0, "fear")];
        let mut s = SystemFrame::new(0.9, "D1", "100", "food");
        s.status = Some("current".into());
        s.sec = vec![block("E1", -2.0, true)];
        let scores = sec_scores(&frames(), &sentiments, &[s], &NilMapping::identity());
        assert_eq!(scores.len(), 2);
        for sc in &scores {
            assert_eq!(sc.polarity.f1, 1.0);
            assert_eq!(sc.sentiment.f1, 1.0);
            assert_eq!(sc.emotion.f1, 1.0);
        }
    }

    #[test]
    fn test_partial_credit() {
        let sentiments = vec![
            sentiment("F1", "E1", "negative", -2.0, "fear"),
            sentiment("F2", "E2", "positive", 1.0, "joyhappiness"),
        ];
        let mut s = SystemFrame::new(0.9, "D1", "100", "food");
        s.sec = vec![block("E1", -1.0, false), block("E9", -1.0, false)];
        let r = sec_scores(&frames(), &sentiments, &[s], &NilMapping::identity());
        let tp = &r[0];
        assert_eq!(tp.class, SecEqClass::TypePlace);
        assert_eq!(tp.polarity.precision, 0.5);
        assert_eq!(tp.polarity.recall, 0.5);
        assert!((tp.sentiment.precision - PENALTY_FACTOR / 2.0).abs() < 1e-12);
        // Two of three flags agree with the first matched reference.
        assert!((tp.emotion.precision - 2.0 / 6.0).abs() < 1e-12);
        assert!((tp.emotion.recall - 2.0 / 6.0).abs() < 1e-12);

        // The submission has no status, so the stricter class sees nothing.
        let strict = &r[1];
        assert!(strict.polarity.precision.is_nan());
        assert_eq!(strict.polarity.recall, 0.0);
    }

    #[test]
    fn test_nil_mapping_applies_to_place() {
        let sentiments = vec![sentiment("F1", "E1", "negative", -2.0, "none")];
        let mut s = SystemFrame::new(0.9, "D1", "NIL1", "food");
        s.sec = vec![block("E1", -2.0, false)];
        let unmapped = sec_scores(&frames(), &sentiments, &[s.clone()], &NilMapping::identity());
        assert_eq!(unmapped[0].polarity.precision, 0.0);

        let sub =
            TsvTable::parse_with_columns("t\tm\tx\tD1:0-3\tNIL1\tGPE\tNAM\t1\n", EDL_COLUMNS)
                .unwrap();
        let reference = TsvTable::parse(
            "team\tmid\tloc\tdoc_and_range\tkbid\ttype\totype\tconf\nL\tm\tx\tD1:0-3\t100\tGPE\tNAM\t1\n",
        )
        .unwrap();
        let mapping = NilMapping::from_tables(&sub, &reference).unwrap();
        let mapped = sec_scores(&frames(), &sentiments, &[s], &mapping);
        assert_eq!(mapped[0].polarity.precision, 1.0);
    }

    #[test]
    fn test_no_submitted_entries_is_nan_not_error() {
        let sentiments = vec![sentiment("F1", "E1", "negative", -2.0, "fear")];
        let r = sec_scores(&frames(), &sentiments, &[], &NilMapping::identity());
        assert!(r[0].polarity.precision.is_nan());
        assert!(r[0].sentiment.precision.is_nan());
        assert!(r[0].emotion.precision.is_nan());
        assert_eq!(r[0].polarity.recall, 0.0);
        assert!(r[0].polarity.f1.is_nan());
    }
}
