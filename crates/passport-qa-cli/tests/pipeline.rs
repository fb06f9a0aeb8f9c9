//! Pipeline integration tests using synthetic portraits.
//!
//! Runs the binary end to end on rendered photos with sidecar face data.

#![allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::missing_panics_doc,
    deprecated
)]

use std::path::Path;

use assert_cmd::Command;
use passport_qa_core::FaceAttributes;
use passport_qa_test_support::SyntheticPortraitBuilder;
use serde_json::Value;

/// Command isolated from any user or project config.
fn passport_qa(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("passport-qa").unwrap();
    cmd.current_dir(dir).env("XDG_CONFIG_HOME", dir);
    cmd
}

/// Runs `check` and returns the exit code and the single report.
fn check_one(dir: &Path, photo: &Path, extra: &[&str]) -> (i32, Value) {
    let output = passport_qa(dir)
        .args(["check", "-q"])
        .args(extra)
        .arg(photo)
        .output()
        .unwrap();
    let report = serde_json::from_slice(&output.stdout).unwrap();
    (output.status.code().unwrap(), report)
}

fn status_of<'a>(report: &'a Value, id: &str) -> &'a str {
    report["result"]["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == id)
        .and_then(|c| c["status"].as_str())
        .unwrap()
}

fn critical_failures(report: &Value) -> Vec<String> {
    report["result"]["critical_failures"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

// === Check ===

#[test]
fn test_compliant_us_portrait() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = SyntheticPortraitBuilder::new()
        .build()
        .write_to(temp_dir.path(), "anna")
        .unwrap();

    let (code, report) = check_one(temp_dir.path(), &photo, &[]);

    assert_eq!(code, 0);
    assert_eq!(report["result"]["is_compliant"], true);
    assert!(critical_failures(&report).is_empty());
    assert_eq!(status_of(&report, "face_detected"), "pass");
    assert_eq!(status_of(&report, "head_size"), "pass");
    assert_eq!(status_of(&report, "background_color"), "pass");
    assert!(report["result"]["overall_score"].as_u64().unwrap() >= 80);
}

#[test]
fn test_white_backdrop_fails_uk() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = SyntheticPortraitBuilder::new()
        .build()
        .write_to(temp_dir.path(), "anna")
        .unwrap();

    let (code, report) = check_one(temp_dir.path(), &photo, &["--standard", "uk"]);

    assert_eq!(code, 1);
    assert_eq!(report["result"]["is_compliant"], false);
    assert!(critical_failures(&report).contains(&"background_color".to_string()));
}

#[test]
fn test_missing_sidecar_means_no_face() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = SyntheticPortraitBuilder::new()
        .build()
        .write_image_to(temp_dir.path(), "anna")
        .unwrap();

    let (code, report) = check_one(temp_dir.path(), &photo, &[]);

    assert_eq!(code, 1);
    assert_eq!(status_of(&report, "face_detected"), "fail");
    assert!(critical_failures(&report).contains(&"face_detected".to_string()));
    let recommendations = report["result"]["recommendations"].as_array().unwrap();
    assert!(!recommendations.is_empty());
}

#[test]
fn test_halo_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let clean = SyntheticPortraitBuilder::new()
        .background(211, 211, 211)
        .build()
        .write_to(temp_dir.path(), "clean")
        .unwrap();
    let haloed = SyntheticPortraitBuilder::new()
        .background(211, 211, 211)
        .with_halo()
        .build()
        .write_to(temp_dir.path(), "haloed")
        .unwrap();

    let (_, clean) = check_one(temp_dir.path(), &clean, &[]);
    let (_, haloed) = check_one(temp_dir.path(), &haloed, &[]);

    assert_eq!(status_of(&clean, "background_edges"), "pass");
    assert_eq!(status_of(&haloed, "background_edges"), "fail");
}

#[test]
fn test_grayscale_photo_fails_color_check() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = SyntheticPortraitBuilder::new()
        .grayscale()
        .build()
        .write_to(temp_dir.path(), "anna")
        .unwrap();

    let (_, report) = check_one(temp_dir.path(), &photo, &[]);

    assert_eq!(status_of(&report, "color_photo"), "fail");
}

#[test]
fn test_glasses_are_critical() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = SyntheticPortraitBuilder::new()
        .attributes(FaceAttributes {
            glasses: Some(true),
            ..SyntheticPortraitBuilder::compliant_attributes()
        })
        .build()
        .write_to(temp_dir.path(), "anna")
        .unwrap();

    let (code, report) = check_one(temp_dir.path(), &photo, &[]);

    assert_eq!(code, 1);
    assert_eq!(critical_failures(&report), vec!["glasses".to_string()]);
}

#[test]
fn test_faces_dir_and_mediapipe_sidecar() {
    let temp_dir = tempfile::tempdir().unwrap();
    let faces = temp_dir.path().join("faces");
    std::fs::create_dir(&faces).unwrap();
    let photo = SyntheticPortraitBuilder::new()
        .build()
        .write_image_to(temp_dir.path(), "anna")
        .unwrap();
    // the synthetic face box in normalized MediaPipe output
    let mediapipe = r#"{
        "detections": [{
            "boundingBox": {"originX": 200, "originY": 80, "width": 200, "height": 357},
            "categories": [{"score": 0.97}],
            "keypoints": [
                {"x": 0.4167, "y": 0.4},
                {"x": 0.5833, "y": 0.4}
            ]
        }]
    }"#;
    std::fs::write(faces.join("anna.face.json"), mediapipe).unwrap();

    let output = passport_qa(temp_dir.path())
        .args(["check", "-q", "--faces-dir"])
        .arg(&faces)
        .args(["--detector", "mediapipe"])
        .arg(&photo)
        .output()
        .unwrap();
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(status_of(&report, "face_detected"), "pass");
    assert_eq!(status_of(&report, "head_size"), "pass");
}

#[test]
fn test_malformed_sidecar_skips_photo() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = SyntheticPortraitBuilder::new()
        .build()
        .write_image_to(temp_dir.path(), "anna")
        .unwrap();
    std::fs::write(temp_dir.path().join("anna.face.json"), "{ not json").unwrap();

    let output = passport_qa(temp_dir.path())
        .arg("check")
        .arg(&photo)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse face data"));
}

#[test]
fn test_batch_exit_code_reflects_any_failure() {
    let temp_dir = tempfile::tempdir().unwrap();
    let portrait = SyntheticPortraitBuilder::new().build();
    portrait.write_to(temp_dir.path(), "good").unwrap();
    portrait.write_image_to(temp_dir.path(), "faceless").unwrap();

    let output = passport_qa(temp_dir.path())
        .args(["check", "-q"])
        .arg(temp_dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let verdicts: Vec<bool> = stdout
        .lines()
        .map(|l| serde_json::from_str::<Value>(l).unwrap())
        .map(|r| r["result"]["is_compliant"].as_bool().unwrap())
        .collect();
    // faceless.png sorts before good.png
    assert_eq!(verdicts, vec![false, true]);
}

// === Export ===

#[test]
fn test_export_writes_photo_and_sheet() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = SyntheticPortraitBuilder::new()
        .build()
        .write_to(temp_dir.path(), "anna")
        .unwrap();
    let out = temp_dir.path().join("out");

    let output = passport_qa(temp_dir.path())
        .arg("export")
        .arg(&photo)
        .arg("--out-dir")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["standard"], "us");
    assert_eq!(summary["face_detected"], true);
    assert_eq!(summary["sheet"]["placed"], 6);

    let photo_img = image::open(out.join("anna_us_photo.png")).unwrap();
    assert_eq!((photo_img.width(), photo_img.height()), (600, 600));
    let sheet_img = image::open(out.join("anna_us_sheet.png")).unwrap();
    assert_eq!((sheet_img.width(), sheet_img.height()), (1800, 1200));
}

#[test]
fn test_export_uk_with_copies_and_preview() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = SyntheticPortraitBuilder::new()
        .build()
        .write_to(temp_dir.path(), "anna")
        .unwrap();

    let output = passport_qa(temp_dir.path())
        .arg("export")
        .arg(&photo)
        .args(["-s", "uk", "--copies", "4", "--preview", "--zoom", "1.2"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["photo"]["width"], 413);
    assert_eq!(summary["photo"]["height"], 531);
    assert_eq!(summary["sheet"]["placed"], 4);
    assert_eq!(summary["sheet"]["capacity"], 8);
    assert_eq!(summary["adjustments"]["zoom"], 1.2);
    // written next to the photo by default
    assert!(temp_dir.path().join("anna_uk_photo.png").is_file());
    assert!(temp_dir.path().join("anna_uk_sheet.png").is_file());
}

#[test]
fn test_export_without_face_data() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = SyntheticPortraitBuilder::new()
        .size(900, 600)
        .build()
        .write_image_to(temp_dir.path(), "wide")
        .unwrap();

    let output = passport_qa(temp_dir.path())
        .arg("export")
        .arg(&photo)
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["face_detected"], false);
    assert_eq!(summary["crop"]["crop_x"], 150);
    assert_eq!(summary["crop"]["crop_w"], 600);
}
