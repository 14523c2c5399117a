//! Tests for the sfscore binary: score, validate, config

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TEXT_HEADER: &str = "description\tdoc_id\tframe_id\tframe_type\tissue_status\tissue_type\tkb_id\tneed_status\tneed_type\tplace_id\tproxy_status\treported_by\tresolution_status\tresolved_by\tscope\tseverity\tuser_id";

const SUBMISSION: &str = r#"[
  {"Confidence": 0.9, "DocumentID": "D1.txt", "Justification_ID": "segment-0",
   "Place_KB_ID": "100", "Resolution": "insufficient", "Status": "current",
   "Type": "food", "Urgent": true,
   "SEC": [{"Source": "E1", "Sentiment": -2.0,
            "Emotion_Anger": false, "Emotion_Fear": true, "Emotion_Joy": false}]}
]"#;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Reference root with one food need, its sentiment, and a matching submission.
fn setup() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let row = "desc\tD1\tF1\tneed\t\t\t100\tcurrent\tfood\tP1\tnone\tnone\tinsufficient\tnone\t3_municipality\t3_possibledeath\tu1";
    write(dir.path(), "ref/needs/a.tab", &format!("{}\n{}\n", TEXT_HEADER, row));
    write(
        dir.path(),
        "ref/sentiments/s.tab",
        "doc_id\ttarget\tkb_id\tsentiment_value\tpolarity\temotion_value\nD1\tF1\tE1\t-2\tnegative\tfear\n",
    );
    write(dir.path(), "run_0.5.json", SUBMISSION);
    dir
}

fn sfscore() -> Command {
    Command::cargo_bin("sfscore").unwrap()
}

#[test]
fn test_score_writes_reports() {
    let dir = setup();
    let out = dir.path().join("out");
    sfscore()
        .arg("score")
        .arg("-s")
        .arg(dir.path().join("run_0.5.json"))
        .arg("-g")
        .arg(dir.path().join("ref"))
        .arg("-o")
        .arg(&out)
        .args(["-m", "TEST_SYSTEM", "-p", "PREFIX_", "--pr-curves", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("System: TEST_SYSTEM"))
        .stdout(predicate::str::contains("GRAVE"));

    let diagnostic = fs::read_to_string(out.join("PREFIX_DiagnosticScores.txt")).unwrap();
    assert!(diagnostic.contains("EqClass_Type+Place_MAP: 1.0"));
    let sec = fs::read_to_string(out.join("PREFIX_diagnostic_SEC_scores.txt")).unwrap();
    assert!(sec.contains("EqClass_Type+Place\t1.0\t1.0\t1.0"));
    for policy in ["standard", "vindictive", "forgiving"] {
        assert!(out.join(format!("PREFIX_{}_nDCG_Scores.txt", policy)).is_file());
        assert!(out.join(format!("PREFIX_{}_curve_nDCG.svg", policy)).is_file());
    }
    let pr = fs::read_to_string(out.join("PREFIX_PR_curve_Type+Place.txt")).unwrap();
    assert!(pr.contains("OperatingPoint:\t0.9\t1.0\t1.0"));
}

#[test]
fn test_score_without_threshold_uses_zero() {
    let dir = setup();
    write(dir.path(), "run.json", SUBMISSION);
    let out = dir.path().join("out");
    sfscore()
        .arg("score")
        .arg("-s")
        .arg(dir.path().join("run.json"))
        .arg("-g")
        .arg(dir.path().join("ref"))
        .arg("-o")
        .arg(&out)
        .args(["-m", "TEST_SYSTEM", "--pr-curves"])
        .assert()
        .success();

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["threshold"], serde_json::json!(0.0));
    let pr = fs::read_to_string(out.join("PR_curve_Type+Place.txt")).unwrap();
    assert!(pr.contains("OperatingPoint:\t0.9\t1.0\t1.0"));
}

#[test]
fn test_score_skip_sec() {
    let dir = setup();
    let out = dir.path().join("out");
    sfscore()
        .arg("score")
        .arg("-s")
        .arg(dir.path().join("run_0.5.json"))
        .arg("-g")
        .arg(dir.path().join("ref"))
        .arg("-o")
        .arg(&out)
        .args(["-m", "sys", "--skip-sec", "-q"])
        .assert()
        .success();
    assert!(out.join("DiagnosticScores.txt").is_file());
    assert!(!out.join("diagnostic_SEC_scores.txt").exists());
}

#[test]
fn test_score_missing_reference_fails() {
    let dir = setup();
    sfscore()
        .arg("score")
        .arg("-s")
        .arg(dir.path().join("run_0.5.json"))
        .arg("-g")
        .arg(dir.path().join("nope"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .args(["-m", "sys"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load reference"));
}

#[test]
fn test_score_invalid_submission_fails() {
    let dir = setup();
    write(
        dir.path(),
        "bad.json",
        r#"[{"Confidence": 2.0, "DocumentID": "D1", "Place_KB_ID": "1", "Type": "food"}]"#,
    );
    sfscore()
        .arg("score")
        .arg("-s")
        .arg(dir.path().join("bad.json"))
        .arg("-g")
        .arg(dir.path().join("ref"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .args(["-m", "sys"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed validation"));
}

#[test]
fn test_edl_flags_come_in_pairs() {
    let dir = setup();
    sfscore()
        .arg("score")
        .arg("-s")
        .arg(dir.path().join("run_0.5.json"))
        .arg("-g")
        .arg(dir.path().join("ref"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .args(["-m", "sys", "-e", "run.tab"])
        .assert()
        .failure();
}

#[test]
fn test_validate_file_and_package() {
    let dir = setup();
    sfscore()
        .arg("validate")
        .arg(dir.path().join("run_0.5.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1 frames"));

    let pkg = dir.path().join("pkg");
    write(&pkg, "run.json", SUBMISSION);
    write(&pkg, "run.tab", "run\tq1\tTown\tD1:10-14\tNIL001\tGPE\tNAM\t0.9\n");
    sfscore()
        .arg("validate")
        .arg(&pkg)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 EDL rows"));
}

#[test]
fn test_validate_reports_failures() {
    let dir = setup();
    let pkg = dir.path().join("pkg");
    write(&pkg, "run.json", SUBMISSION);
    sfscore()
        .arg("validate")
        .arg(&pkg)
        .arg(dir.path().join("run_0.5.json"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("Expected one .tab EDL file"))
        .stderr(predicate::str::contains("1 of 2 inputs failed validation"));
}

#[test]
fn test_config_show_and_check() {
    sfscore()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[GraveFrameCounts]"))
        .stdout(predicate::str::contains("[Gain]"));

    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.toml");
    fs::write(
        &bad,
        "[GraveFrameCounts]\nMediumGravity = 5\nHighGravity = 3\n[Gain]\nLow = 1\nMedium = 5\nHigh = 10\n",
    )
    .unwrap();
    sfscore()
        .args(["config", "check"])
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds HighGravity"));
}
