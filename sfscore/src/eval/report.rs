//! Plain-text score files, SVG curves and the JSON summary.
//!
//! | File | Content |
//! |------|---------|
//! | `DiagnosticScores.txt` | MAP/MAR per equivalence class and GRAVE |
//! | `{policy}_nDCG_Scores.txt` | `k`, nDCG@k |
//! | `{policy}_curve_nDCG.svg` | the same curve, plotted |
//! | `precisionN.txt` | `N`, precision@N over high-gain situations |
//! | `diagnostic_SEC_scores.txt` | SEC polarity/sentiment/emotion scores |
//! | `_F1_type.txt`, `_F1_type_place.txt` | detection F1 |
//! | `PR_curve_Type+Place.txt`, `.svg` | confidence sweep (optional) |
//! | `summary.json` | everything above |
//!
//! Every file name gets the run's prefix prepended. Floats are written in
//! shortest round-trip form with `nan` for undefined scores.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::mapmar::DiagnosticScores;
use super::overlap::Prf;
use super::plot::ScatterPlot;
use super::pr_curve::PrCurve;
use super::ranking::NdcgCurve;
use super::sec::SecScores;
use crate::{Error, Result};

/// Column header of the SEC score file.
pub const SEC_HEADER: &[&str] = &[
    "EqClass",
    "PrecisionPolarity",
    "RecallPolarity",
    "F1Polarity",
    "PrecisionSentiment",
    "RecallSentiment",
    "F1Sentiment",
    "PrecisionEmotion",
    "RecallEmotion",
    "F1Emotion",
];

/// Format a score: `nan`, `inf`, or the shortest representation that
/// round-trips (`1.0`, `0.75`). Exponents carry a sign and at least two
/// digits (`1e-05`, `1e+16`).
#[must_use]
pub fn py_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return (if v > 0.0 { "inf" } else { "-inf" }).to_string();
    }
    let s = format!("{:?}", v);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => s,
    }
}

/// Every score of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    /// Name printed in each file header.
    pub system_name: String,
    /// Confidence threshold the run was scored at.
    pub threshold: f64,
    /// MAP/MAR.
    pub diagnostic: DiagnosticScores,
    /// One curve per tie-break policy.
    pub ndcg: Vec<NdcgCurve>,
    /// `(N, precision@N)` pairs.
    pub precision_at_n: Vec<(usize, f64)>,
    /// Detection over `(document, type)`.
    pub type_f1: Prf,
    /// Detection over `(document, type, place)`.
    pub type_place_f1: Prf,
    /// `None` when SEC scoring was skipped.
    pub sec: Option<Vec<SecScores>>,
    /// `None` unless PR curves were requested.
    pub pr_curve: Option<PrCurve>,
}

// =============================================================================
// Renderers
// =============================================================================

/// `DiagnosticScores.txt`.
#[must_use]
pub fn render_diagnostic(system_name: &str, scores: &DiagnosticScores) -> String {
    let mut out = format!("SF Diagnostic Scores for System: {}\n", system_name);
    for (class, m) in &scores.classes {
        let _ = writeln!(out, "{}_MAP: {}", class.label(), py_float(m.map));
        let _ = writeln!(out, "{}_MAR: {}", class.label(), py_float(m.mar));
    }
    let grave = "GRAVE_EqClass_Type+Place+Status+Urgency+Resolution";
    let _ = writeln!(out, "{}_MAP: {}", grave, py_float(scores.grave.map));
    let _ = writeln!(out, "{}_MAR: {}", grave, py_float(scores.grave.mar));
    out
}

/// `{policy}_nDCG_Scores.txt`.
#[must_use]
pub fn render_ndcg(system_name: &str, curve: &NdcgCurve) -> String {
    let mut out = format!("SF nDCG Scores for System: {}\nk\tnDCG\n", system_name);
    for (k, v) in curve.points() {
        let _ = writeln!(out, "{}\t{}", k, py_float(v));
    }
    out
}

/// `precisionN.txt`.
#[must_use]
pub fn render_precision_at_n(system_name: &str, values: &[(usize, f64)]) -> String {
    let mut out = format!("SF Precision at N Scores for System: {}\n", system_name);
    for (n, p) in values {
        let _ = writeln!(out, "{}\t{}", n, py_float(*p));
    }
    if values.is_empty() {
        out.push_str("NOTE: No high gravity situations were found\n");
    }
    out
}

/// `diagnostic_SEC_scores.txt`.
#[must_use]
pub fn render_sec(scores: &[SecScores]) -> String {
    let mut out = SEC_HEADER.join("\t");
    out.push('\n');
    for s in scores {
        let cells = [
            s.polarity.precision,
            s.polarity.recall,
            s.polarity.f1,
            s.sentiment.precision,
            s.sentiment.recall,
            s.sentiment.f1,
            s.emotion.precision,
            s.emotion.recall,
            s.emotion.f1,
        ];
        out.push_str(s.class.label());
        for c in cells {
            out.push('\t');
            out.push_str(&py_float(c));
        }
        out.push('\n');
    }
    out
}

/// `_F1_type.txt` (`suffix = "Type"`) or `_F1_type_place.txt` (`"TypePlace"`).
#[must_use]
pub fn render_f1(suffix: &str, prf: &Prf) -> String {
    format!(
        "F1_{s}:\t{}\nPrecision_{s}:\t{}\nRecall_{s}:\t{}\n",
        py_float(prf.f1),
        py_float(prf.precision),
        py_float(prf.recall),
        s = suffix
    )
}

/// `PR_curve_Type+Place.txt`.
#[must_use]
pub fn render_pr_curve(system_name: &str, curve: &PrCurve) -> String {
    let mut out = format!(
        "SF Type+Place PR Curve for System: {}\nconfidence\tprecision\trecall\n",
        system_name
    );
    for p in &curve.points {
        let _ = writeln!(
            out,
            "{}\t{}\t{}",
            py_float(p.confidence),
            py_float(p.precision),
            py_float(p.recall)
        );
    }
    match &curve.operating_point {
        Some(p) => {
            let _ = writeln!(
                out,
                "OperatingPoint:\t{}\t{}\t{}",
                py_float(p.confidence),
                py_float(p.precision),
                py_float(p.recall)
            );
        }
        None => out.push_str("NOTE: No operating point at the system threshold\n"),
    }
    out
}

// =============================================================================
// Writer
// =============================================================================

/// Writes a report's files into one directory under a common prefix.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
    prefix: String,
}

impl ReportWriter {
    /// Create the output directory if needed.
    pub fn create(dir: &Path, prefix: &str) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::invalid_input(format!("cannot create output directory {}: {}", dir.display(), e))
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
        })
    }

    /// Full path of an output file.
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.prefix, name))
    }

    fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(name);
        std::fs::write(&path, content)?;
        log::debug!("wrote {}", path.display());
        Ok(path)
    }

    /// Write every file of `report`. Returns the paths written.
    pub fn write_all(&self, report: &ScoreReport) -> Result<Vec<PathBuf>> {
        let name = report.system_name.as_str();
        let mut written = Vec::new();

        if let Some(sec) = &report.sec {
            written.push(self.write("diagnostic_SEC_scores.txt", &render_sec(sec))?);
        }
        for curve in &report.ndcg {
            let policy = curve.tie_break.as_str();
            written.push(self.write(
                &format!("{}_nDCG_Scores.txt", policy),
                &render_ndcg(name, curve),
            )?);
            let svg = ScatterPlot::new(format!("nDCG@k for {}", name), "k", "nDCG")
                .points(curve.points().map(|(k, v)| (k as f64, v)))
                .render();
            written.push(self.write(&format!("{}_curve_nDCG.svg", policy), &svg)?);
        }
        written.push(self.write(
            "DiagnosticScores.txt",
            &render_diagnostic(name, &report.diagnostic),
        )?);
        written.push(self.write(
            "precisionN.txt",
            &render_precision_at_n(name, &report.precision_at_n),
        )?);
        written.push(self.write("_F1_type.txt", &render_f1("Type", &report.type_f1))?);
        written.push(self.write(
            "_F1_type_place.txt",
            &render_f1("TypePlace", &report.type_place_f1),
        )?);

        if let Some(curve) = &report.pr_curve {
            written.push(self.write("PR_curve_Type+Place.txt", &render_pr_curve(name, curve))?);
            let title = format!("Type+Place PR curve for {}", name);
            let svg = ScatterPlot::new(title, "recall", "precision")
                .points(curve.points.iter().map(|p| (p.recall, p.precision)))
                .highlight(curve.operating_point.map(|p| (p.recall, p.precision)))
                .x_max(1.0)
                .render();
            written.push(self.write("PR_curve_Type+Place.svg", &svg)?);
        }

        let json = serde_json::to_string_pretty(report)
            .map_err(|e| Error::invalid_input(format!("cannot serialize summary: {}", e)))?;
        written.push(self.write("summary.json", &json)?);
        Ok(written)
    }
}
