//! Ranking metrics over situations: nDCG@k and Precision@N.
//!
//! A *situation* is a `(place, type)` pair. The reference assigns each
//! situation a gain from its summed gravity ([`reference_gains`]); the system
//! is ranked by the gravity it reports for the same situations.
//!
//! # Tie-break policies
//!
//! Situations are ordered by system gravity, descending. Equal gravity is
//! resolved by the policy:
//!
//! | Policy | Secondary key | Effect |
//! |--------|---------------|--------|
//! | `standard` | none | insertion order |
//! | `vindictive` | system gain ascending | hits pushed later |
//! | `forgiving` | system gain descending | hits pulled earlier |
//!
//! Insertion order is lexicographic `(place, type)`. Genuine ties (same
//! gravity and same system gain) keep that order.
//!
//! # Discount
//!
//! ```text
//! method0: DCG@k = r1 + Σ_{i=2..k} r_i / log2(i)
//! method1: DCG@k = Σ_{i=1..k} r_i / log2(i + 1)
//! ```
//!
//! nDCG@k divides by the DCG of all merged gains sorted descending, and is
//! `0.0` when that ideal is zero.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sfscore_core::{ReferenceFrame, SystemFrame};

use crate::config::{GainTier, ScoringConfig};
use crate::{Error, Result};

// =============================================================================
// Policies
// =============================================================================

/// Ordering of situations with equal gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum TieBreak {
    /// Gravity only.
    Standard,
    /// Gravity, then system gain ascending.
    Vindictive,
    /// Gravity, then system gain descending.
    Forgiving,
}

impl TieBreak {
    /// All policies in report order.
    pub const ALL: [TieBreak; 3] = [TieBreak::Standard, TieBreak::Vindictive, TieBreak::Forgiving];

    /// Lowercase name used in file names.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TieBreak::Standard => "standard",
            TieBreak::Vindictive => "vindictive",
            TieBreak::Forgiving => "forgiving",
        }
    }
}

impl std::fmt::Display for TieBreak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TieBreak {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(TieBreak::Standard),
            "vindictive" => Ok(TieBreak::Vindictive),
            "forgiving" => Ok(TieBreak::Forgiving),
            other => Err(Error::config(format!(
                "unrecognized nDCG tie breaking method: {other}"
            ))),
        }
    }
}

/// DCG discount variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DiscountMethod {
    /// First rank undiscounted, rank i ≥ 2 divided by log2(i).
    #[default]
    Method0,
    /// Rank i divided by log2(i + 1).
    Method1,
}

impl std::fmt::Display for DiscountMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountMethod::Method0 => write!(f, "method0"),
            DiscountMethod::Method1 => write!(f, "method1"),
        }
    }
}

impl FromStr for DiscountMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "method0" | "0" => Ok(DiscountMethod::Method0),
            "method1" | "1" => Ok(DiscountMethod::Method1),
            other => Err(Error::config(format!("unrecognized DCG method: {other}"))),
        }
    }
}

// =============================================================================
// Reference gains
// =============================================================================

/// Summed counts of one situation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SituationTotals {
    pub urgent: u32,
    pub unresolved: u32,
    pub current: u32,
    pub gravity: f64,
    pub frame_count: u32,
}

impl SituationTotals {
    fn add(&mut self, urgent: bool, unresolved: bool, current: bool, gravity: f64, count: u32) {
        self.urgent += u32::from(urgent);
        self.unresolved += u32::from(unresolved);
        self.current += u32::from(current);
        self.gravity += gravity;
        self.frame_count += count;
    }
}

/// One reference situation with its gain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainRow {
    pub kb_id: String,
    pub situation_type: String,
    pub totals: SituationTotals,
    pub tier: GainTier,
    pub gain: f64,
}

impl GainRow {
    /// A row with explicit gravity, frame count and gain.
    pub fn new(
        kb_id: impl Into<String>,
        situation_type: impl Into<String>,
        gravity: f64,
        frame_count: u32,
        tier: GainTier,
        gain: f64,
    ) -> Self {
        Self {
            kb_id: kb_id.into(),
            situation_type: situation_type.into(),
            totals: SituationTotals {
                gravity,
                frame_count,
                ..SituationTotals::default()
            },
            tier,
            gain,
        }
    }
}

/// Group the reference by `(kb_id, type)`, sum the counts and assign gains.
///
/// Rows are ordered by gravity then frame count, both descending. The group
/// with an empty place ID is dropped.
#[must_use]
pub fn reference_gains(reference: &[ReferenceFrame], config: &ScoringConfig) -> Vec<GainRow> {
    let mut groups: BTreeMap<(&str, &str), SituationTotals> = BTreeMap::new();
    for r in reference {
        groups
            .entry((r.kb_id.as_str(), r.situation_type.as_str()))
            .or_default()
            .add(r.urgent, r.unresolved, r.current, r.gravity, r.frame_count);
    }

    let mut rows: Vec<GainRow> = groups
        .into_iter()
        .filter(|((kb, _), _)| !kb.is_empty())
        .map(|((kb, ty), totals)| {
            let tier = config.tier(totals.gravity);
            GainRow {
                kb_id: kb.to_string(),
                situation_type: ty.to_string(),
                totals,
                tier,
                gain: config.gain_of(tier),
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.totals
            .gravity
            .total_cmp(&a.totals.gravity)
            .then(b.totals.frame_count.cmp(&a.totals.frame_count))
    });
    rows
}

// =============================================================================
// System merge
// =============================================================================

/// Sum system frames per `(place, type)`, dropping the empty-place group.
#[must_use]
pub fn system_totals(system: &[SystemFrame]) -> BTreeMap<(String, String), SituationTotals> {
    let mut groups: BTreeMap<(String, String), SituationTotals> = BTreeMap::new();
    for s in system.iter().filter(|s| !s.place_kb_id.is_empty()) {
        groups
            .entry((s.place_kb_id.clone(), s.situation_type.clone()))
            .or_default()
            .add(s.urgent, s.unresolved, s.current, s.gravity, s.frame_count);
    }
    groups
}

/// One situation after joining reference gains with system totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSituation {
    pub kb_id: String,
    pub situation_type: String,
    /// Reference tier, `None` when only the system reported the situation.
    pub tier: Option<GainTier>,
    /// Reference gain (0 when absent).
    pub gain: f64,
    /// System gravity (0 when absent).
    pub gravity: f64,
    /// System frame count (0 when absent).
    pub frame_count: u32,
    /// Reference gain if the system reported the situation, else 0.
    pub sysgain: f64,
}

/// Full outer join of reference gains and system totals, in `(place, type)` order.
#[must_use]
pub fn merge_situations(gains: &[GainRow], system: &[SystemFrame]) -> Vec<RankedSituation> {
    let mut merged: BTreeMap<(String, String), RankedSituation> = BTreeMap::new();
    for g in gains {
        merged.insert(
            (g.kb_id.clone(), g.situation_type.clone()),
            RankedSituation {
                kb_id: g.kb_id.clone(),
                situation_type: g.situation_type.clone(),
                tier: Some(g.tier),
                gain: g.gain,
                gravity: 0.0,
                frame_count: 0,
                sysgain: 0.0,
            },
        );
    }
    for (key, totals) in system_totals(system) {
        let row = merged.entry(key).or_insert_with_key(|(kb, ty)| RankedSituation {
            kb_id: kb.clone(),
            situation_type: ty.clone(),
            tier: None,
            gain: 0.0,
            gravity: 0.0,
            frame_count: 0,
            sysgain: 0.0,
        });
        row.gravity = totals.gravity;
        row.frame_count = totals.frame_count;
    }
    merged
        .into_values()
        .map(|mut row| {
            row.sysgain = if row.frame_count > 0 { row.gain } else { 0.0 };
            row
        })
        .collect()
}

/// Merge and order situations under a tie-break policy.
#[must_use]
pub fn rank_situations(
    gains: &[GainRow],
    system: &[SystemFrame],
    tie_break: TieBreak,
) -> Vec<RankedSituation> {
    let mut rows = merge_situations(gains, system);
    rows.sort_by(|a, b| {
        let by_gravity = b.gravity.total_cmp(&a.gravity);
        match tie_break {
            TieBreak::Standard => by_gravity,
            TieBreak::Vindictive => by_gravity.then(a.sysgain.total_cmp(&b.sysgain)),
            TieBreak::Forgiving => by_gravity.then(b.sysgain.total_cmp(&a.sysgain)),
        }
    });
    rows
}

// =============================================================================
// nDCG
// =============================================================================

/// DCG of the first `k` gains.
#[must_use]
pub fn dcg_at_k(gains: &[f64], k: usize, method: DiscountMethod) -> f64 {
    gains
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, &g)| {
            let rank = i + 1;
            match method {
                DiscountMethod::Method0 if rank == 1 => g,
                DiscountMethod::Method0 => g / (rank as f64).log2(),
                DiscountMethod::Method1 => g / (rank as f64 + 1.0).log2(),
            }
        })
        .sum()
}

/// nDCG@k of `ranked` against `ideal` (already sorted descending).
#[must_use]
pub fn ndcg_at_k(ranked: &[f64], ideal: &[f64], k: usize, method: DiscountMethod) -> f64 {
    let max = dcg_at_k(ideal, k, method);
    if max == 0.0 {
        return 0.0;
    }
    dcg_at_k(ranked, k, method) / max
}

/// nDCG@k for k = 1..N under one policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdcgCurve {
    pub tie_break: TieBreak,
    pub method: DiscountMethod,
    /// `values[k - 1]` is nDCG@k.
    pub values: Vec<f64>,
}

impl NdcgCurve {
    /// `(k, nDCG@k)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values.iter().enumerate().map(|(i, &v)| (i + 1, v))
    }
}

/// nDCG curve of the system against the reference gain table.
#[must_use]
pub fn ndcg_curve(
    gains: &[GainRow],
    system: &[SystemFrame],
    tie_break: TieBreak,
    method: DiscountMethod,
) -> NdcgCurve {
    let ranked = rank_situations(gains, system, tie_break);
    let sysgains: Vec<f64> = ranked.iter().map(|r| r.sysgain).collect();
    let mut ideal: Vec<f64> = ranked.iter().map(|r| r.gain).collect();
    ideal.sort_by(|a, b| b.total_cmp(a));
    let values = (1..=ranked.len())
        .map(|k| ndcg_at_k(&sysgains, &ideal, k, method))
        .collect();
    NdcgCurve {
        tie_break,
        method,
        values,
    }
}

// =============================================================================
// Precision@N
// =============================================================================

/// Precision@N over high-gain reference situations.
///
/// Situations are taken in `(place, type)` order; precision@N is the share of
/// the first N that the system reported. A situation counts as high when its
/// reference gain equals the configured `High` gain, so tiers configured with
/// the same gain are included too. Empty when there is none.
#[must_use]
pub fn precision_at_n(
    gains: &[GainRow],
    system: &[SystemFrame],
    config: &ScoringConfig,
) -> Vec<(usize, f64)> {
    let high: Vec<bool> = merge_situations(gains, system)
        .into_iter()
        .filter(|r| r.gain == config.gains.high)
        .map(|r| r.frame_count > 0)
        .collect();
    let mut hits = 0usize;
    high.iter()
        .enumerate()
        .map(|(i, &hit)| {
            hits += usize::from(hit);
            let n = i + 1;
            (n, hits as f64 / n as f64)
        })
        .collect()
}
