//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::Path;

use assert_cmd::Command;
use passport_qa_test_support::SyntheticPortraitBuilder;
use predicates::prelude::*;

/// Command isolated from any user or project config.
fn passport_qa(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("passport-qa").unwrap();
    cmd.current_dir(dir).env("XDG_CONFIG_HOME", dir);
    cmd
}

// === Missing/Invalid Path Tests ===

#[test]
fn test_missing_path_shows_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No paths specified"));
}

#[test]
fn test_nonexistent_path_warns_but_continues() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .arg("/nonexistent/path/to/photo.jpg")
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_empty_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .arg(temp_dir.path())
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_corrupt_image_is_skipped() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(temp_dir.path().join("broken.png"), b"not a png").unwrap();

    passport_qa(temp_dir.path())
        .arg(temp_dir.path())
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Skipping").and(predicate::str::contains("broken.png")));
}

// === Value Validation Tests ===

#[test]
fn test_invalid_format_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .args(["--format", "xml", "photo.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("json").or(predicate::str::contains("jsonl")));
}

#[test]
fn test_unknown_standard_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .args(["--standard", "xx", "photo.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown standard 'xx'"));
}

#[test]
fn test_standard_aliases_accepted() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = SyntheticPortraitBuilder::new()
        .build()
        .write_to(temp_dir.path(), "anna")
        .unwrap();

    let output = passport_qa(temp_dir.path())
        .args(["check", "--standard", "GB", "-q"])
        .arg(&path)
        .output()
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["standard"], "uk");
}

#[test]
fn test_fraction_out_of_range_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .args(["--sharpness-min", "2.0", "photo.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 is not in 0.0..=1.0"));
}

#[test]
fn test_unknown_detector_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .args(["--detector", "opencv", "photo.png"])
        .assert()
        .failure();
}

#[test]
fn test_missing_faces_dir_is_an_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = SyntheticPortraitBuilder::new()
        .build()
        .write_image_to(temp_dir.path(), "anna")
        .unwrap();

    passport_qa(temp_dir.path())
        .arg("--faces-dir")
        .arg(temp_dir.path().join("nope"))
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("faces directory not found"));
}

// === Export Argument Tests ===

#[test]
fn test_export_watermark_conflicts_with_preview() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .args(["export", "photo.png", "--watermark", "SAMPLE", "--preview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_export_rejects_zero_copies() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .args(["export", "photo.png", "--copies", "0"])
        .assert()
        .failure();
}

#[test]
fn test_export_rejects_tiny_zoom() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .args(["export", "photo.png", "--zoom", "0.01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not in"));
}

#[test]
fn test_export_missing_image_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .args(["export", "missing.png"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing.png"));
}

// === Help and Standards ===

#[test]
fn test_help_lists_subcommands() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("check")
                .and(predicate::str::contains("export"))
                .and(predicate::str::contains("standards")),
        );
}

#[test]
fn test_standards_table() {
    let temp_dir = tempfile::tempdir().unwrap();
    passport_qa(temp_dir.path())
        .arg("standards")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("United States passport")
                .and(predicate::str::contains("600x600"))
                .and(predicate::str::contains("#D3D3D3")),
        );
}

#[test]
fn test_standards_json() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = passport_qa(temp_dir.path())
        .args(["standards", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0]["code"], "us");
    assert_eq!(rows[1]["code"], "uk");
    assert_eq!(rows[0]["physical_size"]["unit"], "inch");
}
