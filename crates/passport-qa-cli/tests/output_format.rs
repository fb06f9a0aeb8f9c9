//! Output format tests.
//!
//! Checks the shape of JSON Lines and JSON array reports.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::Path;

use assert_cmd::Command;
use passport_qa_test_support::SyntheticPortraitBuilder;
use predicates::prelude::*;
use serde_json::Value;

/// Command isolated from any user or project config.
fn passport_qa(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("passport-qa").unwrap();
    cmd.current_dir(dir).env("XDG_CONFIG_HOME", dir).arg("-q");
    cmd
}

/// Two compliant portraits in `dir`.
fn two_portraits(dir: &Path) {
    let portrait = SyntheticPortraitBuilder::new().build();
    portrait.write_to(dir, "a").unwrap();
    portrait.write_to(dir, "b").unwrap();
}

#[test]
fn test_jsonl_one_report_per_line() {
    let temp_dir = tempfile::tempdir().unwrap();
    two_portraits(temp_dir.path());

    let output = passport_qa(temp_dir.path())
        .arg(temp_dir.path())
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let report: Value = serde_json::from_str(line).unwrap();
        assert!(report.is_object());
    }
}

#[test]
fn test_json_array() {
    let temp_dir = tempfile::tempdir().unwrap();
    two_portraits(temp_dir.path());

    let output = passport_qa(temp_dir.path())
        .args(["--format", "json"])
        .arg(temp_dir.path())
        .output()
        .unwrap();
    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = parsed.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    // directory entries are sorted
    assert!(reports[0]["path"].as_str().unwrap().ends_with("a.png"));
    assert!(reports[1]["path"].as_str().unwrap().ends_with("b.png"));
}

#[test]
fn test_json_array_empty_batch() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .args(["--format", "json"])
        .arg(temp_dir.path())
        .assert()
        .code(0)
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_pretty_json_spans_lines() {
    let temp_dir = tempfile::tempdir().unwrap();
    two_portraits(temp_dir.path());

    let output = passport_qa(temp_dir.path())
        .args(["--format", "json", "--pretty"])
        .arg(temp_dir.path())
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.lines().count() > 2);
    assert!(serde_json::from_str::<Value>(&stdout).is_ok());
}

#[test]
fn test_report_fields() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = SyntheticPortraitBuilder::new()
        .build()
        .write_to(temp_dir.path(), "anna")
        .unwrap();

    let output = passport_qa(temp_dir.path()).arg(&path).output().unwrap();
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(report["path"], path.to_string_lossy().as_ref());
    assert_eq!(report["standard"], "us");
    assert_eq!(report["dimensions"]["width"], 600);
    assert_eq!(report["dimensions"]["height"], 600);
    assert!(report["timestamp"].as_str().unwrap().contains('T'));
    assert!(report.get("analysis").is_none());

    let result = &report["result"];
    for key in [
        "is_compliant",
        "overall_score",
        "critical_failures",
        "passed_count",
        "failed_count",
        "warning_count",
        "recommendations",
    ] {
        assert!(result.get(key).is_some(), "missing {key}");
    }

    let checks = result["checks"].as_array().unwrap();
    assert_eq!(checks.len(), 18);
    assert_eq!(checks[0]["id"], "face_detected");
    assert_eq!(checks[17]["id"], "mouth_closed");
    for check in checks {
        let status = check["status"].as_str().unwrap();
        assert!(["pass", "warn", "fail"].contains(&status));
        assert!(check["label"].is_string());
        assert!(check["message"].is_string());
    }
}

#[test]
fn test_include_analysis() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = SyntheticPortraitBuilder::new()
        .build()
        .write_to(temp_dir.path(), "anna")
        .unwrap();

    let output = passport_qa(temp_dir.path())
        .arg("--include-analysis")
        .arg(&path)
        .output()
        .unwrap();
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();

    let metrics = &report["analysis"]["metrics"];
    assert_eq!(metrics["background_color"], "#FFFFFF");
    assert_eq!(metrics["is_grayscale"], false);
    assert!(metrics["sharpness"].as_f64().unwrap() > 0.08);
    assert!(report["analysis"]["face"]["detected"].as_bool().unwrap());
}
