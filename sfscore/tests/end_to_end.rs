//! Load a reference tree and a submission from disk, score, and write reports.

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use sfscore::eval::{
    load_reference, load_submission, resolve_threshold, score_tables, threshold_from_filename,
    NilMapping, ReferenceOptions, ReportWriter, ScoreOptions, SubmissionOptions,
};
use sfscore::{GravityKind, ScoringConfig};

const TEXT_HEADER: &str = "description\tdoc_id\tframe_id\tframe_type\tissue_status\tissue_type\tkb_id\tneed_status\tneed_type\tplace_id\tproxy_status\treported_by\tresolution_status\tresolved_by\tscope\tseverity\tuser_id";

fn need_row(doc: &str, frame: &str, kb: &str, ty: &str) -> String {
    format!(
        "desc\t{doc}\t{frame}\tneed\t\t\t{kb}\tcurrent\t{ty}\tP1\tnone\tnone\tinsufficient\tnone\t3_municipality\t3_possibledeath\tu1"
    )
}

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Food at place 100 and water at place 200 in one document, each with a
/// sentiment from a different source.
fn reference_tree(root: &Path) {
    write(
        root,
        "needs/needs.tab",
        &[
            TEXT_HEADER.to_string(),
            need_row("D1", "F1", "100", "food"),
            need_row("D1", "F2", "200", "water"),
        ]
        .join("\n"),
    );
    write(
        root,
        "sentiments/sent.tab",
        "doc_id\ttarget\tkb_id\tsentiment_value\tpolarity\temotion_value\n\
         D1\tF1\tE1\t-2\tnegative\tfear\n\
         D1\tF2\tE2\t1.5\tpositive\tnone\n",
    );
    write(
        root,
        "edl.tab",
        "team\tmid\tloc\tdoc_and_range\tkbid\ttype\totype\tconf\n\
         LDC\tm1\tTown\tD1:10-14\t100\tGPE\tNAM\t1.0\n",
    );
}

/// The food frame is linked to a NIL cluster instead of place 100.
const SUBMISSION: &str = r#"[
  {"Confidence": 0.9, "DocumentID": "D1.txt", "Justification_ID": "segment-0",
   "Place_KB_ID": "NIL001", "Resolution": "insufficient", "Status": "current",
   "Type": "food", "Urgent": true,
   "SEC": [{"Source": "E1", "Sentiment": -2.0,
            "Emotion_Anger": false, "Emotion_Fear": true, "Emotion_Joy": false}]},
  {"Confidence": 0.8, "DocumentID": "D1.txt", "Justification_ID": "segment-1",
   "Place_KB_ID": "200", "Resolution": "insufficient", "Status": "current",
   "Type": "water", "Urgent": true,
   "SEC": [{"Source": "E2", "Sentiment": 1.5,
            "Emotion_Anger": false, "Emotion_Fear": false, "Emotion_Joy": false}]}
]"#;

const SUBMISSION_EDL: &str = "run\tq1\tTown\tD1:10-14\tNIL001\tGPE\tNAM\t0.9\n";

#[test]
fn score_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("ref");
    reference_tree(&root);
    let sub_path = dir.path().join("run_0.5.json");
    fs::write(&sub_path, SUBMISSION).unwrap();
    let edl_path = dir.path().join("run.tab");
    fs::write(&edl_path, SUBMISSION_EDL).unwrap();

    let config = ScoringConfig::bundled().unwrap();
    let mut rng = StdRng::seed_from_u64(config.run.seed);
    let reference = load_reference(&root, &ReferenceOptions::default(), &mut rng).unwrap();
    assert_eq!(reference.frames.len(), 2);
    assert_eq!(reference.sentiments.len(), 2);

    let system = load_submission(
        &sub_path,
        &SubmissionOptions {
            gravity: GravityKind::Numeric,
            filelist: None,
        },
    )
    .unwrap();
    assert_eq!(system.len(), 2);

    let mapping = NilMapping::from_edl(&edl_path, &root.join("edl.tab")).unwrap();
    assert_eq!(mapping.map("NIL001"), "100");

    assert_eq!(threshold_from_filename(&sub_path), Some(0.5));
    let threshold = resolve_threshold(None, &sub_path);
    assert_eq!(threshold, 0.5);

    let options = ScoreOptions {
        system_name: "run".into(),
        threshold,
        pr_curves: true,
        ..Default::default()
    };
    let report = score_tables(&reference, system, &config, &mapping, &options);

    // Detection ignores the NIL mapping: the food place is wrong.
    assert_eq!(report.type_f1.f1, 1.0);
    assert_eq!(report.type_place_f1.precision, 0.5);
    assert_eq!(report.type_place_f1.recall, 0.5);
    let type_place = report.diagnostic.classes[0].1;
    assert_eq!(type_place.situations, 2);
    assert_eq!(type_place.map, 0.5);

    // SEC sees the mapped place, so both sentiments agree fully.
    let sec = report.sec.as_ref().unwrap();
    assert_eq!(sec.len(), 2);
    for s in sec {
        assert_eq!(s.polarity.f1, 1.0);
        assert_eq!(s.sentiment.f1, 1.0);
        assert_eq!(s.emotion.f1, 1.0);
    }

    let curve = report.pr_curve.as_ref().unwrap();
    assert_eq!(curve.operating_point.map(|p| p.confidence), Some(0.8));

    let out = dir.path().join("out");
    let written = ReportWriter::create(&out, "PREFIX_")
        .unwrap()
        .write_all(&report)
        .unwrap();
    assert_eq!(written.len(), 14);

    let sec_file = fs::read_to_string(out.join("PREFIX_diagnostic_SEC_scores.txt")).unwrap();
    let lines: Vec<&str> = sec_file.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("EqClass\tPrecisionPolarity"));
    assert_eq!(
        lines[1],
        "EqClass_Type+Place\t1.0\t1.0\t1.0\t1.0\t1.0\t1.0\t1.0\t1.0\t1.0"
    );

    let f1 = fs::read_to_string(out.join("PREFIX__F1_type_place.txt")).unwrap();
    assert_eq!(
        f1,
        "F1_TypePlace:\t0.5\nPrecision_TypePlace:\t0.5\nRecall_TypePlace:\t0.5\n"
    );

    let diagnostic = fs::read_to_string(out.join("PREFIX_DiagnosticScores.txt")).unwrap();
    assert!(diagnostic.starts_with("SF Diagnostic Scores for System: run\n"));
    assert!(diagnostic.contains("EqClass_Type+Place_MAP: 0.5\n"));
    assert!(out.join("PREFIX_PR_curve_Type+Place.svg").is_file());
}

#[test]
fn filelist_restricts_both_sides() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("ref");
    reference_tree(&root);
    let sub_path = dir.path().join("run.json");
    fs::write(&sub_path, SUBMISSION).unwrap();

    let docs: std::collections::HashSet<String> = ["D2".to_string()].into_iter().collect();
    let mut rng = StdRng::seed_from_u64(1);
    let reference = load_reference(
        &root,
        &ReferenceOptions {
            gravity: GravityKind::Numeric,
            filelist: Some(docs.clone()),
        },
        &mut rng,
    )
    .unwrap();
    let system = load_submission(
        &sub_path,
        &SubmissionOptions {
            gravity: GravityKind::Numeric,
            filelist: Some(docs),
        },
    )
    .unwrap();
    assert!(reference.frames.is_empty());
    assert!(system.is_empty());
    assert_eq!(threshold_from_filename(&sub_path), None);
    assert_eq!(resolve_threshold(None, &sub_path), 0.0);

    let report = score_tables(
        &reference,
        system,
        &ScoringConfig::bundled().unwrap(),
        &NilMapping::identity(),
        &ScoreOptions::default(),
    );
    assert!(report.diagnostic.classes[0].1.map.is_nan());
    assert!(report.precision_at_n.is_empty());
    assert!(report.ndcg.iter().all(|c| c.values.is_empty()));
}

#[test]
fn missing_threshold_scores_at_zero() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("ref");
    reference_tree(&root);
    let sub_path = dir.path().join("run.json");
    fs::write(&sub_path, SUBMISSION).unwrap();

    let config = ScoringConfig::bundled().unwrap();
    let mut rng = StdRng::seed_from_u64(config.run.seed);
    let reference = load_reference(&root, &ReferenceOptions::default(), &mut rng).unwrap();
    let system = load_submission(&sub_path, &SubmissionOptions::default()).unwrap();

    assert_eq!(resolve_threshold(Some(0.85), &sub_path), 0.85);
    let threshold = resolve_threshold(None, &sub_path);
    assert_eq!(threshold, 0.0);

    let options = ScoreOptions {
        system_name: "run".into(),
        threshold,
        pr_curves: true,
        ..Default::default()
    };
    let report = score_tables(&reference, system, &config, &NilMapping::identity(), &options);

    // At 0.0 every claim counts, so the least confident point is chosen.
    let point = report.pr_curve.as_ref().unwrap().operating_point.unwrap();
    assert_eq!(point.confidence, 0.8);
    assert_eq!(point.precision, 0.5);
    assert_eq!(point.recall, 0.5);

    let out = dir.path().join("out");
    ReportWriter::create(&out, "")
        .unwrap()
        .write_all(&report)
        .unwrap();
    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["threshold"], serde_json::json!(0.0));
    let pr = fs::read_to_string(out.join("PR_curve_Type+Place.txt")).unwrap();
    assert!(pr.contains("OperatingPoint:\t0.8\t0.5\t0.5\n"));
}
