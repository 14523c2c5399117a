//! Gravity: the per-frame severity signal used to rank situations.
//!
//! | Kind | Value |
//! |------|-------|
//! | `boolean` | `1.0` when current, unresolved and urgent, else `0.0` |
//! | `numeric` | `1.0` base plus `0.2` bonuses for fear/anger (see below) |
//!
//! Numeric gravity treats needs and issues differently: an issue has no
//! resolution state, so only `current` and `urgent` gate its base score,
//! and fear or anger together add a single bonus.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sfscore_core::{FrameFacts, FrameKind, ReferenceFrame, SystemFrame};

/// Bonus per emotion for numeric gravity.
pub const EMOTION_BONUS: f64 = 0.2;

/// A severity function over frame facts.
pub trait Gravity {
    /// Severity of one frame.
    fn severity(&self, facts: &FrameFacts) -> f64;
}

/// AND of current, unresolved and urgent.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanGravity;

impl Gravity for BooleanGravity {
    fn severity(&self, facts: &FrameFacts) -> f64 {
        if facts.current && facts.unresolved && facts.urgent {
            1.0
        } else {
            0.0
        }
    }
}

/// Emotion-weighted gravity, split by frame kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericGravity;

impl Gravity for NumericGravity {
    fn severity(&self, facts: &FrameFacts) -> f64 {
        let e = facts.emotions;
        match facts.kind {
            FrameKind::Need => {
                if !(facts.current && facts.unresolved && facts.urgent) {
                    return 0.0;
                }
                let mut g = 1.0;
                if e.fear {
                    g += EMOTION_BONUS;
                }
                if e.anger {
                    g += EMOTION_BONUS;
                }
                g
            }
            FrameKind::Issue => {
                if !(facts.current && facts.urgent) {
                    return 0.0;
                }
                if e.fear || e.anger {
                    1.0 + EMOTION_BONUS
                } else {
                    1.0
                }
            }
        }
    }
}

/// Selector for the gravity function of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum GravityKind {
    /// [`NumericGravity`]
    #[default]
    Numeric,
    /// [`BooleanGravity`]
    Boolean,
}

impl Gravity for GravityKind {
    fn severity(&self, facts: &FrameFacts) -> f64 {
        match self {
            GravityKind::Numeric => NumericGravity.severity(facts),
            GravityKind::Boolean => BooleanGravity.severity(facts),
        }
    }
}

impl std::fmt::Display for GravityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GravityKind::Numeric => write!(f, "numeric"),
            GravityKind::Boolean => write!(f, "boolean"),
        }
    }
}

impl FromStr for GravityKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "numeric" => Ok(GravityKind::Numeric),
            "boolean" => Ok(GravityKind::Boolean),
            other => Err(crate::Error::config(format!(
                "unrecognized gravity function: {other} (expected numeric or boolean)"
            ))),
        }
    }
}

/// Set `gravity` on every reference frame.
pub fn annotate_reference(frames: &mut [ReferenceFrame], gravity: &impl Gravity) {
    for frame in frames.iter_mut() {
        frame.gravity = gravity.severity(&frame.facts());
    }
}

/// Set `gravity` on every system frame.
pub fn annotate_system(frames: &mut [SystemFrame], gravity: &impl Gravity) {
    for frame in frames.iter_mut() {
        frame.gravity = gravity.severity(&frame.facts());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfscore_core::Emotions;

    fn facts(kind: FrameKind, current: bool, unresolved: bool, urgent: bool) -> FrameFacts {
        FrameFacts {
            kind,
            current,
            unresolved,
            urgent,
            emotions: Emotions::default(),
        }
    }

    #[test]
    fn test_boolean_gravity() {
        let g = BooleanGravity;
        assert_eq!(g.severity(&facts(FrameKind::Need, true, true, true)), 1.0);
        assert_eq!(g.severity(&facts(FrameKind::Need, true, false, true)), 0.0);
        // Issues are not exempt from resolution under boolean gravity.
        assert_eq!(g.severity(&facts(FrameKind::Issue, true, false, true)), 0.0);
    }

    #[test]
    fn test_numeric_need_bonuses() {
        let g = NumericGravity;
        let mut f = facts(FrameKind::Need, true, true, true);
        assert_eq!(g.severity(&f), 1.0);
        f.emotions.fear = true;
        assert!((g.severity(&f) - 1.2).abs() < 1e-12);
        f.emotions.anger = true;
        assert!((g.severity(&f) - 1.4).abs() < 1e-12);
        // Bonuses never apply without the base condition.
        f.urgent = false;
        assert_eq!(g.severity(&f), 0.0);
    }

    #[test]
    fn test_numeric_issue_ignores_resolution() {
        let g = NumericGravity;
        let mut f = facts(FrameKind::Issue, true, false, true);
        assert_eq!(g.severity(&f), 1.0);
        f.emotions.fear = true;
        f.emotions.anger = true;
        // Single bonus for issues.
        assert!((g.severity(&f) - 1.2).abs() < 1e-12);
        f.current = false;
        assert_eq!(g.severity(&f), 0.0);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("boolean".parse::<GravityKind>().unwrap(), GravityKind::Boolean);
        assert_eq!("Numeric".parse::<GravityKind>().unwrap(), GravityKind::Numeric);
        assert!("advanced".parse::<GravityKind>().is_err());
    }

    #[test]
    fn test_annotate_reference() {
        let mut r = ReferenceFrame::new("D1", "F1", "1", "food");
        r.current = true;
        r.unresolved = true;
        r.urgent = true;
        let mut frames = vec![r];
        annotate_reference(&mut frames, &GravityKind::Boolean);
        assert_eq!(frames[0].gravity, 1.0);
    }
}
