//! Integration tests for reading face data saved beside photos.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use passport_qa_adapters::{load_image, DetectorFormat, SidecarFaceProvider};
use passport_qa_core::FaceGeometryProvider;
use passport_qa_test_support::SyntheticPortraitBuilder;
use tempfile::TempDir;

#[test]
fn test_canonical_sidecar_round_trips_builder_geometry() {
    let dir = TempDir::new().unwrap();
    let portrait = SyntheticPortraitBuilder::new().build();
    let path = portrait.write_to(dir.path(), "anna").unwrap();

    let mut provider = SidecarFaceProvider::new(None, None);
    provider.init().unwrap();
    let image = load_image(&path).unwrap();
    let observation = provider.observe(&image).unwrap();

    assert_eq!(observation, portrait.observation);
}

#[test]
fn test_mediapipe_sidecar_in_faces_dir() {
    let photos = TempDir::new().unwrap();
    let faces = TempDir::new().unwrap();
    let portrait = SyntheticPortraitBuilder::new().build();
    let path = portrait.write_image_to(photos.path(), "ben").unwrap();
    std::fs::write(
        faces.path().join("ben.face.json"),
        r#"{"detections": [{
            "boundingBox": {"originX": 200, "originY": 80, "width": 200, "height": 357},
            "categories": [{"score": 0.9}],
            "keypoints": [{"x": 0.583, "y": 0.4}, {"x": 0.417, "y": 0.4}]
        }]}"#,
    )
    .unwrap();

    let mut provider =
        SidecarFaceProvider::new(Some(faces.path().to_path_buf()), Some(DetectorFormat::MediaPipe));
    provider.init().unwrap();
    let observation = provider.observe(&load_image(&path).unwrap()).unwrap();
    let face = observation.geometry.unwrap();
    assert_eq!(face.count, 1);
    let (left, right) = face.eyes().unwrap();
    assert!(left.x < right.x);
    assert!((left.y - 240.0).abs() < 1e-6);
}

#[test]
fn test_malformed_sidecar_is_an_error() {
    let dir = TempDir::new().unwrap();
    let portrait = SyntheticPortraitBuilder::new().build();
    let path = portrait.write_image_to(dir.path(), "carl").unwrap();
    std::fs::write(dir.path().join("carl.face.json"), "{ nope").unwrap();

    let mut provider = SidecarFaceProvider::new(None, None);
    provider.init().unwrap();
    let err = provider.observe(&load_image(&path).unwrap()).unwrap_err();
    assert!(format!("{err:#}").contains("carl.face.json"));
}
