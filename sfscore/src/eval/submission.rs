//! System submission loading and validation.
//!
//! A submission is one JSON array of frame objects:
//!
//! ```json
//! [{"Confidence": 0.9, "DocumentID": "IL9_NW_020583_20180425_I0040RLRK.txt",
//!   "Justification_ID": "segment-0", "Place_KB_ID": "2220956",
//!   "Resolution": "insufficient", "Status": "current", "Type": "food",
//!   "Urgent": true,
//!   "SEC": [{"Source": "1234", "Sentiment": -1.5,
//!            "Emotion_Anger": false, "Emotion_Fear": true, "Emotion_Joy": false}]}]
//! ```
//!
//! Validation runs in two passes: typed deserialization rejects structural
//! problems (missing or mistyped fields), then semantic checks reject an
//! empty `DocumentID`, a `Confidence` outside `[0, 1]`, a `Type` outside the
//! need and issue vocabularies, and non-finite sentiment values. Either
//! failure aborts the run with the offending index and message.

#![allow(missing_docs)] // Wire fields are documented by the JSON example

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::glob;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use sfscore_core::{is_known_situation_type, SecBlock, SystemFrame};

use crate::gravity::{annotate_system, GravityKind};
use crate::{Error, Result};

/// One submitted frame as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFrame {
    #[serde(rename = "Confidence")]
    pub confidence: f64,
    #[serde(rename = "DocumentID")]
    pub document_id: String,
    #[serde(rename = "Justification_ID", default)]
    pub justification_id: String,
    #[serde(rename = "Place_KB_ID")]
    pub place_kb_id: String,
    #[serde(rename = "Resolution", default)]
    pub resolution: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Type")]
    pub situation_type: String,
    #[serde(rename = "Urgent", default)]
    pub urgent: Option<bool>,
    #[serde(rename = "SEC", default)]
    pub sec: Vec<SecBlock>,
}

/// Check the values of already-deserialized frames.
pub fn validate(frames: &[RawFrame]) -> Result<()> {
    for (i, f) in frames.iter().enumerate() {
        if f.document_id.trim().is_empty() {
            return Err(Error::validation(format!("[{}]: DocumentID is empty", i)));
        }
        if !f.confidence.is_finite() || !(0.0..=1.0).contains(&f.confidence) {
            return Err(Error::validation(format!(
                "[{}]: Confidence {} is not within [0, 1]",
                i, f.confidence
            )));
        }
        if !is_known_situation_type(&f.situation_type) {
            return Err(Error::validation(format!(
                "[{}]: '{}' is not a valid Type",
                i, f.situation_type
            )));
        }
        for (j, block) in f.sec.iter().enumerate() {
            if !block.sentiment.is_finite() {
                return Err(Error::validation(format!(
                    "[{}].SEC[{}]: Sentiment is not a finite number",
                    i, j
                )));
            }
        }
    }
    Ok(())
}

/// Drop a trailing `.txt` from a document ID.
#[must_use]
pub fn strip_txt(document_id: &str) -> &str {
    document_id.strip_suffix(".txt").unwrap_or(document_id)
}

impl From<RawFrame> for SystemFrame {
    fn from(raw: RawFrame) -> Self {
        let mut frame = SystemFrame::new(
            raw.confidence,
            strip_txt(&raw.document_id),
            raw.place_kb_id,
            raw.situation_type,
        );
        frame.justification_id = raw.justification_id;
        frame.urgent = raw.urgent == Some(true);
        frame.unresolved = raw.resolution.as_deref() == Some("insufficient");
        frame.current = raw.status.as_deref() == Some("current");
        frame.status = raw.status;
        frame.resolution = raw.resolution;
        frame.sec = raw.sec;
        frame
    }
}

/// Parse and validate submission JSON. Gravity is left at zero.
pub fn parse_submission(json: &str) -> Result<Vec<SystemFrame>> {
    let raw: Vec<RawFrame> =
        serde_json::from_str(json).map_err(|e| Error::validation(e.to_string()))?;
    validate(&raw)?;
    Ok(raw.into_iter().map(SystemFrame::from).collect())
}

/// Options for [`load_submission`].
#[derive(Debug, Clone, Default)]
pub struct SubmissionOptions {
    pub gravity: GravityKind,
    pub filelist: Option<HashSet<String>>,
}

/// Read, validate, normalize, filter and gravity-annotate a submission file.
pub fn load_submission(path: &Path, options: &SubmissionOptions) -> Result<Vec<SystemFrame>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::invalid_input(format!("cannot open JSON submission file {}: {}", path.display(), e))
    })?;
    let mut frames = parse_submission(&text)?;
    log::info!("submission: {} frames from {}", frames.len(), path.display());

    if let Some(docs) = &options.filelist {
        let before = frames.len();
        frames.retain(|f| docs.contains(&f.document_id));
        log::info!(
            "reference filelist present: kept {} of {} submitted frames",
            frames.len(),
            before
        );
    }
    annotate_system(&mut frames, &options.gravity);
    Ok(frames)
}

static TRAILING_FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d*\.\d+|\d+)$").expect("static regex"));

/// Confidence threshold encoded at the end of a submission file name
/// (`run_0.35.json` gives `0.35`). Values outside `[0, 1]` are ignored.
#[must_use]
pub fn threshold_from_filename(path: &Path) -> Option<f64> {
    let stem = path.file_stem()?.to_str()?;
    let caps = TRAILING_FLOAT.captures(stem)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    (0.0..=1.0).contains(&value).then_some(value)
}

/// The threshold a run is scored at: `explicit` if given, else the one in
/// the file name, else 0.0.
#[must_use]
pub fn resolve_threshold(explicit: Option<f64>, path: &Path) -> f64 {
    explicit
        .or_else(|| threshold_from_filename(path))
        .unwrap_or_else(|| {
            log::warn!(
                "no system threshold given and none found in {}; using 0.0",
                path.display()
            );
            0.0
        })
}

// =============================================================================
// Submission packages
// =============================================================================

fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(format!("*.{}", ext));
    let pattern = pattern.to_string_lossy();
    let matches = glob(&pattern)
        .map_err(|e| Error::invalid_input(format!("invalid glob '{}': {}", pattern, e)))?;
    let mut files: Vec<PathBuf> = matches
        .filter_map(|m| m.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Locate the JSON frame file and `.tab` entity-linking file of a
/// submission package. Exactly one of each must sit directly in `dir`.
pub fn find_package(dir: &Path) -> Result<(PathBuf, PathBuf)> {
    if !dir.is_dir() {
        return Err(Error::invalid_input(format!(
            "submission package {} is not a directory",
            dir.display()
        )));
    }
    let mut json = files_with_extension(dir, "json")?;
    let mut tab = files_with_extension(dir, "tab")?;
    if json.len() != 1 {
        return Err(Error::validation(format!(
            "Expected one .json situation frame file in {}, found {}",
            dir.display(),
            json.len()
        )));
    }
    if tab.len() != 1 {
        return Err(Error::validation(format!(
            "Expected one .tab EDL file in {}, found {}",
            dir.display(),
            tab.len()
        )));
    }
    match (json.pop(), tab.pop()) {
        (Some(j), Some(t)) => Ok((j, t)),
        _ => Err(Error::validation("incomplete submission package")),
    }
}
