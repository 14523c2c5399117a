//! Situation frame records shared by every scoring stage.
//!
//! Two sides are compared:
//!
//! | Side | Type | Origin |
//! |------|------|--------|
//! | Reference | [`ReferenceFrame`] | annotator TSV tables (text and speech) |
//! | System | [`SystemFrame`] | one entry of a JSON submission |
//!
//! Both carry the same derived facts (`urgent`, `unresolved`, `current`)
//! so that a single [`FrameFacts`] view drives gravity and matching.

use serde::{Deserialize, Serialize};

/// Situation types that describe an issue rather than a need.
pub const ISSUE_TYPES: &[&str] = &["regimechange", "crimeviolence", "terrorism"];

/// Situation types that describe a need.
pub const NEED_TYPES: &[&str] = &[
    "evac", "food", "infra", "med", "search", "shelter", "utils", "water",
];

/// Returns true if `ty` is a situation type a submission may use.
#[must_use]
pub fn is_known_situation_type(ty: &str) -> bool {
    ISSUE_TYPES.contains(&ty) || NEED_TYPES.contains(&ty)
}

// =============================================================================
// FrameKind
// =============================================================================

/// Whether a frame reports a need or an issue.
///
/// Issue frames ignore resolution when computing numeric gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// Need frame (food, water, shelter, ...)
    #[default]
    Need,
    /// Issue frame (regime change, crime, terrorism)
    Issue,
}

impl FrameKind {
    /// Classify a situation type. Anything not an issue type is a need.
    #[must_use]
    pub fn from_situation_type(ty: &str) -> Self {
        if ISSUE_TYPES.contains(&ty) {
            FrameKind::Issue
        } else {
            FrameKind::Need
        }
    }
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameKind::Need => write!(f, "need"),
            FrameKind::Issue => write!(f, "issue"),
        }
    }
}

impl std::str::FromStr for FrameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "need" => Ok(FrameKind::Need),
            "issue" => Ok(FrameKind::Issue),
            other => Err(format!("unknown frame kind: {other}")),
        }
    }
}

// =============================================================================
// Emotions
// =============================================================================

/// Emotion flags attached to a frame or a sentiment entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Emotions {
    /// `anger`
    pub anger: bool,
    /// `fear`
    pub fear: bool,
    /// `joyhappiness`
    pub joy: bool,
}

impl Emotions {
    /// Parse annotator labels. Unknown labels are ignored.
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut out = Emotions::default();
        for label in labels {
            match label.trim() {
                "anger" => out.anger = true,
                "fear" => out.fear = true,
                "joyhappiness" => out.joy = true,
                _ => {}
            }
        }
        out
    }

    /// Parse a comma-separated `emotion_value` cell (`none` or empty means no emotion).
    #[must_use]
    pub fn from_cell(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() || cell == "none" {
            return Emotions::default();
        }
        Self::from_labels(cell.split(','))
    }

    /// Union of two flag sets.
    #[must_use]
    pub fn union(self, other: Emotions) -> Self {
        Emotions {
            anger: self.anger || other.anger,
            fear: self.fear || other.fear,
            joy: self.joy || other.joy,
        }
    }

    /// Number of flags (out of three) equal between `self` and `other`.
    #[must_use]
    pub fn agreement(&self, other: &Emotions) -> usize {
        usize::from(self.anger == other.anger)
            + usize::from(self.fear == other.fear)
            + usize::from(self.joy == other.joy)
    }
}

// =============================================================================
// FrameFacts
// =============================================================================

/// The derived facts that gravity functions read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFacts {
    pub kind: FrameKind,
    pub current: bool,
    pub unresolved: bool,
    pub urgent: bool,
    pub emotions: Emotions,
}

// =============================================================================
// Reference side
// =============================================================================

/// Where a reference frame was annotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    #[default]
    Text,
    Speech,
}

/// One human annotation of a situation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFrame {
    pub doc_id: String,
    pub frame_id: String,
    /// Place identifier. May hold several equally valid IDs joined by `|`.
    pub kb_id: String,
    pub user_id: String,
    /// Situation type (`food`, `terrorism`, ...).
    pub situation_type: String,
    pub kind: FrameKind,
    /// Raw status string (`current`, `past`, ...). Speech frames carry none.
    pub status: Option<String>,
    pub urgent: bool,
    pub unresolved: bool,
    pub current: bool,
    /// Emotions from sentiment annotations that target this frame.
    #[serde(default)]
    pub emotions: Emotions,
    /// Severity signal, set by the gravity classifier.
    pub gravity: f64,
    pub frame_count: u32,
    #[serde(default)]
    pub modality: Modality,
}

impl ReferenceFrame {
    /// A frame with every derived fact false and gravity zero.
    pub fn new(
        doc_id: impl Into<String>,
        frame_id: impl Into<String>,
        kb_id: impl Into<String>,
        situation_type: impl Into<String>,
    ) -> Self {
        let situation_type = situation_type.into();
        Self {
            doc_id: doc_id.into(),
            frame_id: frame_id.into(),
            kb_id: kb_id.into(),
            user_id: String::new(),
            kind: FrameKind::from_situation_type(&situation_type),
            situation_type,
            status: None,
            urgent: false,
            unresolved: false,
            current: false,
            emotions: Emotions::default(),
            gravity: 0.0,
            frame_count: 1,
            modality: Modality::Text,
        }
    }

    #[must_use]
    pub fn facts(&self) -> FrameFacts {
        FrameFacts {
            kind: self.kind,
            current: self.current,
            unresolved: self.unresolved,
            urgent: self.urgent,
            emotions: self.emotions,
        }
    }

    /// True if `kb_id` lists several alternative IDs.
    #[must_use]
    pub fn is_aliased(&self) -> bool {
        self.kb_id.contains('|')
    }

    /// Iterate the alternative IDs of an aliased `kb_id` (a single ID yields itself).
    pub fn kb_aliases(&self) -> impl Iterator<Item = &str> {
        self.kb_id.split('|')
    }

    /// Urgent and unresolved: the GRAVE subset.
    #[must_use]
    pub fn is_grave(&self) -> bool {
        self.urgent && self.unresolved
    }
}

/// One row of a reference sentiment table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnnotation {
    pub doc_id: String,
    /// Frame ID the sentiment is about.
    pub target: String,
    /// Entity holding the sentiment.
    pub source: String,
    pub polarity: Option<String>,
    pub sentiment_value: Option<f64>,
    pub emotions: Emotions,
}

// =============================================================================
// System side
// =============================================================================

/// One sentiment entry of a submitted frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecBlock {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Sentiment")]
    pub sentiment: f64,
    #[serde(rename = "Emotion_Anger", default)]
    pub anger: bool,
    #[serde(rename = "Emotion_Fear", default)]
    pub fear: bool,
    #[serde(rename = "Emotion_Joy", default)]
    pub joy: bool,
}

impl SecBlock {
    #[must_use]
    pub fn emotions(&self) -> Emotions {
        Emotions {
            anger: self.anger,
            fear: self.fear,
            joy: self.joy,
        }
    }

    /// `positive` for a strictly positive sentiment, else `negative`.
    #[must_use]
    pub fn polarity(&self) -> &'static str {
        if self.sentiment > 0.0 {
            "positive"
        } else {
            "negative"
        }
    }
}

/// One machine-submitted frame claim, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemFrame {
    pub confidence: f64,
    /// Document ID without a trailing `.txt`.
    pub document_id: String,
    pub justification_id: String,
    pub place_kb_id: String,
    pub situation_type: String,
    pub kind: FrameKind,
    pub status: Option<String>,
    pub resolution: Option<String>,
    pub urgent: bool,
    pub unresolved: bool,
    pub current: bool,
    pub gravity: f64,
    pub frame_count: u32,
    #[serde(default)]
    pub sec: Vec<SecBlock>,
}

impl SystemFrame {
    /// A claim with every derived fact false and no sentiment blocks.
    pub fn new(
        confidence: f64,
        document_id: impl Into<String>,
        place_kb_id: impl Into<String>,
        situation_type: impl Into<String>,
    ) -> Self {
        let situation_type = situation_type.into();
        Self {
            confidence,
            document_id: document_id.into(),
            justification_id: String::new(),
            place_kb_id: place_kb_id.into(),
            kind: FrameKind::from_situation_type(&situation_type),
            situation_type,
            status: None,
            resolution: None,
            urgent: false,
            unresolved: false,
            current: false,
            gravity: 0.0,
            frame_count: 1,
            sec: Vec::new(),
        }
    }

    /// Emotions are the union over all sentiment blocks.
    #[must_use]
    pub fn facts(&self) -> FrameFacts {
        let emotions = self
            .sec
            .iter()
            .fold(Emotions::default(), |acc, b| acc.union(b.emotions()));
        FrameFacts {
            kind: self.kind,
            current: self.current,
            unresolved: self.unresolved,
            urgent: self.urgent,
            emotions,
        }
    }

    #[must_use]
    pub fn is_grave(&self) -> bool {
        self.urgent && self.unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_kind_from_type() {
        assert_eq!(FrameKind::from_situation_type("terrorism"), FrameKind::Issue);
        assert_eq!(FrameKind::from_situation_type("food"), FrameKind::Need);
        // Unknown types fall back to need.
        assert_eq!(FrameKind::from_situation_type("weather"), FrameKind::Need);
        assert_eq!("Issue".parse::<FrameKind>().unwrap(), FrameKind::Issue);
        assert!("other".parse::<FrameKind>().is_err());
    }

    #[test]
    fn test_emotions_from_cell() {
        let e = Emotions::from_cell("fear,anger");
        assert!(e.fear && e.anger && !e.joy);
        assert_eq!(Emotions::from_cell("none"), Emotions::default());
        assert_eq!(Emotions::from_cell(""), Emotions::default());
        assert!(Emotions::from_cell("joyhappiness").joy);
    }

    #[test]
    fn test_emotion_agreement() {
        let a = Emotions { anger: true, fear: false, joy: false };
        let b = Emotions { anger: true, fear: true, joy: false };
        assert_eq!(a.agreement(&b), 2);
        assert_eq!(a.agreement(&a), 3);
    }

    #[test]
    fn test_aliases() {
        let r = ReferenceFrame::new("DOC2", "f1", "11186696|384272", "water");
        assert!(r.is_aliased());
        assert_eq!(r.kb_aliases().collect::<Vec<_>>(), vec!["11186696", "384272"]);
        let r = ReferenceFrame::new("DOC1", "f1", "7690208", "food");
        assert!(!r.is_aliased());
    }

    #[test]
    fn test_sec_block_serde_names() {
        let json = r#"{"Source":"E1","Sentiment":-1.5,"Emotion_Anger":true,"Emotion_Fear":false,"Emotion_Joy":false}"#;
        let block: SecBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.source, "E1");
        assert_eq!(block.polarity(), "negative");
        assert!(block.anger);
    }

    #[test]
    fn test_system_facts_union_emotions() {
        let mut f = SystemFrame::new(0.5, "D", "1", "food");
        f.sec.push(SecBlock {
            source: "a".into(),
            sentiment: 1.0,
            anger: true,
            fear: false,
            joy: false,
        });
        f.sec.push(SecBlock {
            source: "b".into(),
            sentiment: 0.0,
            anger: false,
            fear: true,
            joy: false,
        });
        let facts = f.facts();
        assert!(facts.emotions.anger && facts.emotions.fear);
        // Zero sentiment is negative.
        assert_eq!(f.sec[1].polarity(), "negative");
    }
}
