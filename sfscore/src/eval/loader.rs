//! Reference table loading.
//!
//! The reference root follows a fixed directory convention:
//!
//! ```text
//! <root>/needs/*.tab        need frames (text)
//! <root>/issues/*.tab       issue frames (text)
//! <root>/sentiments/*.tab   sentiment annotations targeting frames
//! <root>/speech/*.tab       speech situations (optional)
//! ```
//!
//! All files are tab-separated with a header row and no quoting. Columns are
//! located by header name, so column order does not matter.
//!
//! # Annotator selection
//!
//! Text documents may be annotated by several people. Counting every
//! annotation would weight those documents more, so one annotator per
//! `doc_id` is drawn from a caller-supplied seeded RNG. Candidates are taken
//! in first-seen order over the sorted file list, which makes the draw
//! reproducible for a given seed and input tree.

#![allow(missing_docs)] // Option structs mirror the CLI flags

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use glob::glob;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use sfscore_core::{Emotions, FrameKind, Modality, ReferenceFrame, SentimentAnnotation};

use crate::gravity::{annotate_reference, GravityKind};
use crate::{Error, Result};

/// Annotator ID given to every speech frame.
pub const SPEECH_ANNOTATOR: &str = "Appn1";

// =============================================================================
// TSV reader
// =============================================================================

/// Cells that count as missing values.
const MISSING: &[&str] = &["", "NA", "N/A", "NaN", "nan", "NULL", "null", "#N/A"];

/// A parsed tab-separated table.
#[derive(Debug, Clone, Default)]
pub struct TsvTable {
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
    /// Extra cell values treated as missing (e.g. `none` in sentiment files).
    na_values: Vec<String>,
}

impl TsvTable {
    /// Parse text whose first non-empty line is the header.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = lines
            .next()
            .ok_or_else(|| Error::parse("tab-separated file has no header row"))?;
        let columns: Vec<String> = header
            .trim_end_matches('\r')
            .split('\t')
            .map(|c| c.trim().to_string())
            .collect();
        Self::build(columns, lines)
    }

    /// Parse headerless text with the given column names.
    pub fn parse_with_columns(text: &str, columns: &[&str]) -> Result<Self> {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        Self::build(columns, text.lines().filter(|l| !l.trim().is_empty()))
    }

    fn build<'a>(columns: Vec<String>, lines: impl Iterator<Item = &'a str>) -> Result<Self> {
        let width = columns.len();
        let index = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| (c, i))
            .collect();
        let mut rows = Vec::new();
        for (line_num, line) in lines.enumerate() {
            let mut cells: Vec<String> = line
                .trim_end_matches('\r')
                .split('\t')
                .map(str::to_string)
                .collect();
            if cells.len() > width {
                return Err(Error::parse(format!(
                    "row {} has {} fields, header has {}",
                    line_num + 2,
                    cells.len(),
                    width
                )));
            }
            // Short rows are padded with missing cells.
            cells.resize(width, String::new());
            rows.push(cells);
        }
        Ok(Self {
            index,
            rows,
            na_values: Vec::new(),
        })
    }

    /// Read and parse a file with a header row.
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::invalid_input(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&text).map_err(|e| Error::parse(format!("{}: {}", path.display(), e)))
    }

    /// Treat `value` as missing in addition to the default markers.
    #[must_use]
    pub fn with_na_value(mut self, value: &str) -> Self {
        self.na_values.push(value.to_string());
        self
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fail unless every named column is present.
    pub fn require(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !self.has_column(n))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::parse(format!("missing column(s): {}", missing.join(", "))))
        }
    }

    /// Cell value, or `None` when the column is absent or the cell is missing.
    #[must_use]
    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        let col = *self.index.get(name)?;
        let cell = self.rows.get(row)?.get(col)?.trim();
        if MISSING.contains(&cell) || self.na_values.iter().any(|v| v == cell) {
            None
        } else {
            Some(cell)
        }
    }
}

/// Sorted `*.tab` files directly under `dir`. A missing directory yields none.
pub fn tab_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let pattern = dir.join("*.tab");
    let pattern = pattern.to_string_lossy();
    let matches = glob(&pattern)
        .map_err(|e| Error::invalid_input(format!("invalid glob '{}': {}", pattern, e)))?;
    let mut files = Vec::new();
    for entry in matches {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => log::warn!("glob match error: {}", e),
        }
    }
    files.sort();
    Ok(files)
}

// =============================================================================
// Field mappings
// =============================================================================

/// Numeric severity level (0 when absent or unrecognized).
#[must_use]
pub fn severity_level(cell: Option<&str>) -> u8 {
    match cell {
        Some("1_discomfort") => 1,
        Some("2_injury") => 2,
        Some("3_possibledeath") => 3,
        Some("4_certaindeath") => 4,
        Some(other) => digit_level(other),
        None => 0,
    }
}

/// Numeric scope level (0 when absent or unrecognized).
#[must_use]
pub fn scope_level(cell: Option<&str>) -> u8 {
    match cell {
        Some("1_smallgroup") => 1,
        Some("2_largegroup") => 2,
        Some("3_municipality") => 3,
        Some("4_region") => 4,
        Some(other) => digit_level(other),
        None => 0,
    }
}

// `none`, `Severity_Not_Required`, `Scope_Not_Required` and anything else
// non-numeric land here and map to 0.
fn digit_level(cell: &str) -> u8 {
    cell.parse::<f64>()
        .ok()
        .filter(|v| (0.0..=4.0).contains(v) && v.fract() == 0.0)
        .map_or(0, |v| v as u8)
}

/// Both scope and severity above the first level.
#[must_use]
pub fn is_urgent(scope: u8, severity: u8) -> bool {
    scope > 1 && severity > 1
}

// =============================================================================
// Text reference
// =============================================================================

const TEXT_COLUMNS: &[&str] = &["doc_id", "frame_id", "kb_id", "place_id", "user_id"];

/// One text annotation row before annotator selection.
#[derive(Debug, Clone)]
struct TextRow {
    frame: ReferenceFrame,
    has_place: bool,
}

fn text_rows(table: &TsvTable, path: &Path) -> Result<Vec<TextRow>> {
    table
        .require(TEXT_COLUMNS)
        .map_err(|e| Error::parse(format!("{}: {}", path.display(), e)))?;
    let mut out = Vec::with_capacity(table.len());
    for i in 0..table.len() {
        let status = table
            .get(i, "issue_status")
            .or_else(|| table.get(i, "need_status"))
            .map(str::to_string);
        let situation_type = table
            .get(i, "need_type")
            .or_else(|| table.get(i, "issue_type"))
            .unwrap_or_default()
            .to_string();
        let kind = table
            .get(i, "frame_type")
            .and_then(|k| k.parse::<FrameKind>().ok())
            .unwrap_or_else(|| FrameKind::from_situation_type(&situation_type));
        let scope = scope_level(table.get(i, "scope"));
        let severity = severity_level(table.get(i, "severity"));

        let mut frame = ReferenceFrame::new(
            table.get(i, "doc_id").unwrap_or_default(),
            table.get(i, "frame_id").unwrap_or_default(),
            table.get(i, "kb_id").unwrap_or_default(),
            situation_type,
        );
        frame.kind = kind;
        frame.user_id = table.get(i, "user_id").unwrap_or_default().to_string();
        frame.urgent = is_urgent(scope, severity);
        frame.unresolved = table.get(i, "resolution_status") == Some("insufficient");
        frame.current = status.as_deref() == Some("current");
        frame.status = status;
        frame.modality = Modality::Text;

        let has_place = matches!(table.get(i, "place_id"), Some(p) if p != "none");
        out.push(TextRow { frame, has_place });
    }
    Ok(out)
}

/// Keep one annotator's rows per document.
fn select_annotators(rows: Vec<TextRow>, rng: &mut StdRng) -> Vec<TextRow> {
    let mut doc_order: Vec<&str> = Vec::new();
    let mut users: HashMap<&str, Vec<&str>> = HashMap::new();
    for row in &rows {
        let doc = row.frame.doc_id.as_str();
        let entry = users.entry(doc).or_insert_with(|| {
            doc_order.push(doc);
            Vec::new()
        });
        let user = row.frame.user_id.as_str();
        if !entry.contains(&user) {
            entry.push(user);
        }
    }

    let mut chosen: HashMap<String, String> = HashMap::new();
    for doc in doc_order {
        let candidates = &users[doc];
        if let Some(user) = candidates.choose(rng) {
            if candidates.len() > 1 {
                log::debug!(
                    "doc {}: kept annotator {} of {}",
                    doc,
                    user,
                    candidates.len()
                );
            }
            chosen.insert(doc.to_string(), user.to_string());
        }
    }

    rows.into_iter()
        .filter(|r| chosen.get(&r.frame.doc_id) == Some(&r.frame.user_id))
        .collect()
}

/// Load `needs/` and `issues/`, select one annotator per document and drop
/// frames without a place. Gravity is left at zero.
///
/// # Errors
///
/// [`Error::EmptyReference`] when neither directory contains a `.tab` file.
pub fn load_text_reference(root: &Path, rng: &mut StdRng) -> Result<Vec<ReferenceFrame>> {
    let mut files = tab_files(&root.join("needs"))?;
    files.extend(tab_files(&root.join("issues"))?);
    if files.is_empty() {
        return Err(Error::empty_reference(format!(
            "no needs/ or issues/ .tab files under {}",
            root.display()
        )));
    }

    let mut rows = Vec::new();
    for path in &files {
        let table = TsvTable::read(path)?;
        rows.extend(text_rows(&table, path)?);
    }
    let total = rows.len();
    let selected = select_annotators(rows, rng);
    let kept: Vec<ReferenceFrame> = selected
        .into_iter()
        .filter(|r| r.has_place)
        .map(|r| r.frame)
        .collect();
    log::info!(
        "text reference: {} files, {} rows, {} kept after annotator selection and place filter",
        files.len(),
        total,
        kept.len()
    );
    Ok(kept)
}

// =============================================================================
// Speech reference
// =============================================================================

const SPEECH_COLUMNS: &[&str] = &["situation_id", "file_id", "situation_type", "place_id"];

/// Load `speech/`, or `None` when it has no `.tab` files.
///
/// Speech situations are single-annotator, carry no status string and no
/// emotions. Out-of-domain situations and unlinked (`NIL`) places are dropped.
pub fn load_speech_reference(root: &Path) -> Result<Option<Vec<ReferenceFrame>>> {
    let files = tab_files(&root.join("speech"))?;
    if files.is_empty() {
        log::info!("speech reference list is empty");
        return Ok(None);
    }

    let mut frames = Vec::new();
    for path in &files {
        let table = TsvTable::read(path)?;
        table
            .require(SPEECH_COLUMNS)
            .map_err(|e| Error::parse(format!("{}: {}", path.display(), e)))?;
        for i in 0..table.len() {
            let situation_type = table.get(i, "situation_type").unwrap_or_default();
            if situation_type == "out-of-domain" {
                continue;
            }
            let kb_id = match table.get(i, "place_id") {
                Some(id) if id != "NIL" => id,
                _ => continue,
            };
            let mut frame = ReferenceFrame::new(
                table.get(i, "situation_id").unwrap_or_default(),
                table.get(i, "file_id").unwrap_or_default(),
                kb_id,
                situation_type,
            );
            frame.user_id = SPEECH_ANNOTATOR.to_string();
            frame.current = table.get(i, "situation_status") == Some("Current");
            frame.unresolved = matches!(
                table.get(i, "resolution_status"),
                Some("Insufficent") | Some("Insufficient/Unknown")
            );
            frame.urgent = is_urgent(
                scope_level(table.get(i, "scope")),
                severity_level(table.get(i, "severity")),
            );
            frame.modality = Modality::Speech;
            frames.push(frame);
        }
    }
    log::info!("speech reference: {} files, {} frames", files.len(), frames.len());
    Ok(Some(frames))
}

// =============================================================================
// Sentiments
// =============================================================================

const SENTIMENT_COLUMNS: &[&str] = &["doc_id", "target", "kb_id"];

/// Load `sentiments/`. An empty directory is a warning, not an error.
pub fn load_sentiments(root: &Path) -> Result<Vec<SentimentAnnotation>> {
    let files = tab_files(&root.join("sentiments"))?;
    if files.is_empty() {
        log::warn!(
            "no sentiment files under {}; emotions and SEC reference will be empty",
            root.display()
        );
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    for path in &files {
        let table = TsvTable::read(path)?.with_na_value("none");
        table
            .require(SENTIMENT_COLUMNS)
            .map_err(|e| Error::parse(format!("{}: {}", path.display(), e)))?;
        for i in 0..table.len() {
            let sentiment_value = match table.get(i, "sentiment_value") {
                Some(v) => Some(v.parse::<f64>().map_err(|_| {
                    Error::parse(format!(
                        "{}: row {}: sentiment_value '{}' is not a number",
                        path.display(),
                        i + 2,
                        v
                    ))
                })?),
                None => None,
            };
            out.push(SentimentAnnotation {
                doc_id: table.get(i, "doc_id").unwrap_or_default().to_string(),
                target: table.get(i, "target").unwrap_or_default().to_string(),
                source: table.get(i, "kb_id").unwrap_or_default().to_string(),
                polarity: table.get(i, "polarity").map(str::to_string),
                sentiment_value,
                emotions: table
                    .get(i, "emotion_value")
                    .map(Emotions::from_cell)
                    .unwrap_or_default(),
            });
        }
    }
    log::info!("sentiments: {} files, {} rows", files.len(), out.len());
    Ok(out)
}

/// Union the emotions of all sentiments targeting each frame into it.
pub fn attach_emotions(frames: &mut [ReferenceFrame], sentiments: &[SentimentAnnotation]) {
    let mut by_target: HashMap<(&str, &str), Emotions> = HashMap::new();
    for s in sentiments {
        let e = by_target
            .entry((s.doc_id.as_str(), s.target.as_str()))
            .or_default();
        *e = e.union(s.emotions);
    }
    for frame in frames.iter_mut() {
        if let Some(e) = by_target.get(&(frame.doc_id.as_str(), frame.frame_id.as_str())) {
            frame.emotions = frame.emotions.union(*e);
        }
    }
}

// =============================================================================
// Document filter
// =============================================================================

/// Read a document list: first comma-separated field of each non-empty line.
pub fn load_filelist(path: &Path) -> Result<HashSet<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::invalid_input(format!(
            "failed to open reference list file {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(text
        .lines()
        .filter_map(|l| l.split(',').next())
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect())
}

// =============================================================================
// Full reference
// =============================================================================

/// Reference tables for one scoring run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    /// Text and speech frames, gravity annotated.
    pub frames: Vec<ReferenceFrame>,
    /// Raw sentiment annotations (not filtered; SEC joins them to `frames`).
    pub sentiments: Vec<SentimentAnnotation>,
}

/// Options for [`load_reference`].
#[derive(Debug, Clone, Default)]
pub struct ReferenceOptions {
    pub gravity: GravityKind,
    pub filelist: Option<HashSet<String>>,
}

/// Load text, speech and sentiment tables, attach emotions, filter by the
/// document list and annotate gravity.
pub fn load_reference(
    root: &Path,
    options: &ReferenceOptions,
    rng: &mut StdRng,
) -> Result<ReferenceSet> {
    if !root.exists() {
        return Err(Error::invalid_input(format!("path not found: {}", root.display())));
    }
    let mut frames = load_text_reference(root, rng)?;
    let sentiments = load_sentiments(root)?;
    attach_emotions(&mut frames, &sentiments);
    if let Some(speech) = load_speech_reference(root)? {
        frames.extend(speech);
    }
    if let Some(docs) = &options.filelist {
        let before = frames.len();
        frames.retain(|f| docs.contains(&f.doc_id));
        log::info!(
            "reference filelist present: kept {} of {} frames",
            frames.len(),
            before
        );
    }
    annotate_reference(&mut frames, &options.gravity);
    Ok(ReferenceSet { frames, sentiments })
}
