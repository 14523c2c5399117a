//! NIL place-ID remapping from entity-linking output.
//!
//! A system that cannot link a place mention to the knowledge base emits a
//! cluster ID such as `NIL00042`. When an entity-linking submission and its
//! reference are both available, each NIL cluster is mapped to the reference
//! ID of a mention at the same document span, so SEC matching can still
//! credit the sentiment source.
//!
//! Both files have eight tab-separated columns:
//!
//! | # | Column | Meaning |
//! |---|--------|---------|
//! | 1 | `team` | run name |
//! | 2 | `mid` | mention ID |
//! | 3 | `loc` | mention text |
//! | 4 | `doc_and_range` | `DOC:start-end` |
//! | 5 | `kbid` | knowledge-base or NIL ID |
//! | 6 | `type` | entity type |
//! | 7 | `otype` | mention type |
//! | 8 | `conf` | confidence |
//!
//! The submission file has no header row; the reference file has one.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::loader::TsvTable;
use crate::{Error, Result};

/// Column names of an entity-linking file.
pub const EDL_COLUMNS: &[&str] = &[
    "team",
    "mid",
    "loc",
    "doc_and_range",
    "kbid",
    "type",
    "otype",
    "conf",
];

static SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^:\s]+:(\d+)-(\d+)$").expect("static regex"));

/// Check a headerless entity-linking submission and return its row count.
///
/// Every row needs all eight columns, a `DOC:start-end` span with
/// `start <= end`, a non-empty KB ID and a confidence in `[0, 1]`.
pub fn validate_edl(text: &str) -> Result<usize> {
    for (i, line) in text.lines().filter(|l| !l.trim().is_empty()).enumerate() {
        let row = i + 1;
        let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        if fields.len() != EDL_COLUMNS.len() {
            return Err(Error::validation(format!(
                "EDL row {}: expected {} tab-separated fields, found {}",
                row,
                EDL_COLUMNS.len(),
                fields.len()
            )));
        }
        let span = fields[3];
        let bounds = SPAN.captures(span).and_then(|c| {
            let start: u64 = c.get(1)?.as_str().parse().ok()?;
            let end: u64 = c.get(2)?.as_str().parse().ok()?;
            Some((start, end))
        });
        match bounds {
            None => {
                return Err(Error::validation(format!(
                    "EDL row {}: '{}' is not a DOC:start-end span",
                    row, span
                )))
            }
            Some((start, end)) if start > end => {
                return Err(Error::validation(format!(
                    "EDL row {}: span {} ends before it starts",
                    row, span
                )))
            }
            Some(_) => {}
        }
        if fields[4].trim().is_empty() {
            return Err(Error::validation(format!("EDL row {}: empty KB ID", row)));
        }
        match fields[7].trim().parse::<f64>() {
            Ok(c) if (0.0..=1.0).contains(&c) => {}
            _ => {
                return Err(Error::validation(format!(
                    "EDL row {}: confidence '{}' is not within [0, 1]",
                    row, fields[7]
                )))
            }
        }
    }
    Ok(text.lines().filter(|l| !l.trim().is_empty()).count())
}

/// Lookup from submitted NIL cluster IDs to reference IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NilMapping {
    map: HashMap<String, String>,
}

impl NilMapping {
    /// An empty mapping: every ID maps to itself.
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Build the mapping from parsed submission and reference tables.
    pub fn from_tables(submission: &TsvTable, reference: &TsvTable) -> Result<Self> {
        submission.require(&["doc_and_range", "kbid"])?;
        reference.require(&["doc_and_range", "kbid"])?;

        // Reference span -> first ID recorded at it.
        let mut by_span: HashMap<&str, &str> = HashMap::new();
        for i in 0..reference.len() {
            if let (Some(span), Some(kb)) =
                (reference.get(i, "doc_and_range"), reference.get(i, "kbid"))
            {
                by_span.entry(span).or_insert(kb);
            }
        }

        // NIL cluster -> its submitted spans, both in file order.
        let mut order: Vec<&str> = Vec::new();
        let mut spans: HashMap<&str, Vec<&str>> = HashMap::new();
        for i in 0..submission.len() {
            let Some(kb) = submission.get(i, "kbid").filter(|k| k.starts_with("NIL")) else {
                continue;
            };
            let Some(span) = submission.get(i, "doc_and_range") else {
                continue;
            };
            spans
                .entry(kb)
                .or_insert_with(|| {
                    order.push(kb);
                    Vec::new()
                })
                .push(span);
        }

        // The earliest submitted span with a reference mention wins.
        let mut map = HashMap::new();
        for nil in order {
            if let Some(kb) = spans[nil].iter().find_map(|span| by_span.get(span).copied()) {
                map.insert(nil.to_string(), kb.to_string());
            } else {
                log::debug!("NIL cluster {} has no reference mention", nil);
            }
        }
        log::info!("NIL mapping: {} of {} NIL clusters mapped", map.len(), spans.len());
        Ok(Self { map })
    }

    /// Read a headerless submission file and a headed reference file.
    pub fn from_edl(submission: &Path, reference: &Path) -> Result<Self> {
        let sub_text = std::fs::read_to_string(submission).map_err(|e| {
            Error::invalid_input(format!(
                "cannot read EDL submission {}: {}",
                submission.display(),
                e
            ))
        })?;
        let sub = TsvTable::parse_with_columns(&sub_text, EDL_COLUMNS)
            .map_err(|e| Error::parse(format!("{}: {}", submission.display(), e)))?;
        let reference_table = TsvTable::read(reference)?;
        Self::from_tables(&sub, &reference_table)
    }

    /// Mapped ID, or `id` itself when it has no mapping.
    #[must_use]
    pub fn map<'a>(&'a self, id: &'a str) -> &'a str {
        self.map.get(id).map_or(id, String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
