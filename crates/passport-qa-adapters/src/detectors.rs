//! Mapping of face-detector JSON output onto [`FaceObservation`].
//!
//! Each supported detector family has its own parser. Everything downstream
//! sees only the canonical [`FaceGeometry`] shape. Eyes are stored in image
//! order: `left_eye` is the one with the smaller x.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use passport_qa_core::domain::{
    BoundingBox, FaceAttributes, FaceGeometry, FaceObservation, Landmarks, Point,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Supported detector output shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorFormat {
    /// This crate's own `FaceObservation` / `FaceGeometry` JSON.
    Canonical,
    /// MediaPipe Tasks face detector result.
    MediaPipe,
    /// face-api.js detection (single or array).
    FaceApi,
}

impl DetectorFormat {
    /// Guesses the format from the JSON structure.
    #[must_use]
    pub fn detect(value: &Value) -> Self {
        let has_detection = |v: &Value| v.get("detection").is_some();
        match value {
            Value::Object(map) if map.contains_key("detections") => Self::MediaPipe,
            Value::Object(_) if has_detection(value) => Self::FaceApi,
            Value::Array(items) if items.first().is_some_and(has_detection) => Self::FaceApi,
            _ => Self::Canonical,
        }
    }
}

impl fmt::Display for DetectorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Canonical => "canonical",
            Self::MediaPipe => "mediapipe",
            Self::FaceApi => "face-api",
        })
    }
}

impl FromStr for DetectorFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "canonical" => Ok(Self::Canonical),
            "mediapipe" => Ok(Self::MediaPipe),
            "face-api" | "faceapi" => Ok(Self::FaceApi),
            other => Err(format!(
                "unknown detector format '{other}' (expected canonical, mediapipe or face-api)"
            )),
        }
    }
}

/// Parses detector output, auto-detecting the format unless one is forced.
///
/// `width` and `height` are the dimensions of the image the detector saw;
/// they resolve normalized coordinates.
///
/// # Errors
///
/// Returns an error if the text is not JSON or does not match the format.
pub fn parse_observation(
    json: &str,
    format: Option<DetectorFormat>,
    width: u32,
    height: u32,
) -> Result<FaceObservation> {
    let value: Value = serde_json::from_str(json).context("face data is not valid JSON")?;
    let format = format.unwrap_or_else(|| DetectorFormat::detect(&value));
    debug!(%format, "parsing face data");
    match format {
        DetectorFormat::Canonical => from_canonical(value),
        DetectorFormat::MediaPipe => from_mediapipe(value, width, height),
        DetectorFormat::FaceApi => from_face_api(value),
    }
}

/// Reads the optional top-level `attributes` object any format may carry.
fn attributes_of(value: &Value) -> Result<FaceAttributes> {
    value.get("attributes").map_or_else(
        || Ok(FaceAttributes::default()),
        |attrs| FaceAttributes::deserialize(attrs).context("invalid attributes"),
    )
}

/// Parses the canonical shape: either a full observation
/// (`{"geometry": .., "attributes": ..}`) or a bare geometry object.
///
/// # Errors
///
/// Returns an error if the value matches neither shape.
pub fn from_canonical(value: Value) -> Result<FaceObservation> {
    if !value.is_object() {
        bail!("canonical face data must be a JSON object");
    }
    if value.get("geometry").is_some() || value.get("detected").is_none() {
        return FaceObservation::deserialize(value).context("invalid face observation");
    }
    let attributes = attributes_of(&value)?;
    let geometry = FaceGeometry::deserialize(value).context("invalid face geometry")?;
    Ok(FaceObservation {
        geometry: Some(geometry),
        attributes,
    })
}

#[derive(Debug, Deserialize)]
struct MediaPipeResult {
    #[serde(default)]
    detections: Vec<MediaPipeDetection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaPipeDetection {
    bounding_box: Option<MediaPipeBox>,
    #[serde(default)]
    categories: Vec<MediaPipeCategory>,
    #[serde(default)]
    keypoints: Vec<NormalizedPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaPipeBox {
    origin_x: f64,
    origin_y: f64,
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
struct MediaPipeCategory {
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct NormalizedPoint {
    x: f64,
    y: f64,
}

impl MediaPipeDetection {
    fn score(&self) -> f64 {
        self.categories.first().map_or(0.0, |c| c.score)
    }
}

/// Parses a MediaPipe face detector result.
///
/// The bounding box is in pixels; keypoints are normalized to the image and
/// ordered eye, eye, nose tip, mouth center, ear, ear.
///
/// # Errors
///
/// Returns an error if the value does not have the MediaPipe shape.
pub fn from_mediapipe(value: Value, width: u32, height: u32) -> Result<FaceObservation> {
    let attributes = attributes_of(&value)?;
    let result = MediaPipeResult::deserialize(value).context("invalid MediaPipe result")?;
    let count = u32::try_from(result.detections.len()).unwrap_or(u32::MAX);
    let Some(primary) = result
        .detections
        .iter()
        .max_by(|a, b| a.score().total_cmp(&b.score()))
    else {
        return Ok(FaceObservation {
            geometry: Some(FaceGeometry::none()),
            attributes,
        });
    };

    let (w, h) = (f64::from(width), f64::from(height));
    let to_pixels = |p: &NormalizedPoint| Point::new(p.x * w, p.y * h);
    let keypoint = |i: usize| primary.keypoints.get(i).map(to_pixels);
    let landmarks = (!primary.keypoints.is_empty()).then(|| {
        let (left_eye, right_eye) = image_order(keypoint(0), keypoint(1));
        Landmarks {
            left_eye,
            right_eye,
            nose: keypoint(2),
            mouth: keypoint(3),
            chin: None,
        }
    });

    Ok(FaceObservation {
        geometry: Some(FaceGeometry {
            detected: true,
            count,
            confidence: primary.score().clamp(0.0, 1.0),
            bounding_box: primary
                .bounding_box
                .as_ref()
                .map(|b| BoundingBox::new(b.origin_x, b.origin_y, b.width, b.height)),
            landmarks,
            rotation: None,
        }),
        attributes,
    })
}

#[derive(Debug, Deserialize)]
struct FaceApiResult {
    detection: FaceApiDetection,
    landmarks: Option<FaceApiLandmarks>,
    expressions: Option<FaceApiExpressions>,
}

#[derive(Debug, Deserialize)]
struct FaceApiDetection {
    #[serde(alias = "_box")]
    #[serde(rename = "box")]
    bbox: FaceApiBox,
    #[serde(alias = "_score", default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct FaceApiBox {
    #[serde(alias = "_x")]
    x: f64,
    #[serde(alias = "_y")]
    y: f64,
    #[serde(alias = "_width")]
    width: f64,
    #[serde(alias = "_height")]
    height: f64,
}

#[derive(Debug, Deserialize)]
struct FaceApiLandmarks {
    #[serde(alias = "_positions")]
    positions: Vec<FaceApiPoint>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct FaceApiPoint {
    #[serde(alias = "_x")]
    x: f64,
    #[serde(alias = "_y")]
    y: f64,
}

#[derive(Debug, Deserialize)]
struct FaceApiExpressions {
    #[serde(default)]
    happy: f64,
}

/// Points in the 68-point layout.
const FACE_API_POINTS: usize = 68;
const CHIN: usize = 8;
const NOSE_TIP: usize = 30;
const FIRST_EYE: std::ops::RangeInclusive<usize> = 36..=41;
const SECOND_EYE: std::ops::RangeInclusive<usize> = 42..=47;
const MOUTH: std::ops::RangeInclusive<usize> = 48..=67;

/// Expression probability above which the subject counts as smiling.
const SMILE_THRESHOLD: f64 = 0.5;

/// Parses face-api.js output: a single result or an array of them.
///
/// Both the plain (`box`, `score`) and the serialized-class (`_box`,
/// `_score`) spellings are accepted.
///
/// # Errors
///
/// Returns an error if the value does not have the face-api shape.
pub fn from_face_api(value: Value) -> Result<FaceObservation> {
    let mut attributes = attributes_of(&value)?;
    let results = if value.is_array() {
        Vec::<FaceApiResult>::deserialize(value)
    } else {
        FaceApiResult::deserialize(value).map(|r| vec![r])
    }
    .context("invalid face-api result")?;

    let count = u32::try_from(results.len()).unwrap_or(u32::MAX);
    let Some(primary) = results
        .iter()
        .max_by(|a, b| a.detection.score.total_cmp(&b.detection.score))
    else {
        return Ok(FaceObservation {
            geometry: Some(FaceGeometry::none()),
            attributes,
        });
    };

    if attributes.smile.is_none() {
        attributes.smile = primary
            .expressions
            .as_ref()
            .map(|e| e.happy > SMILE_THRESHOLD);
    }

    let b = &primary.detection.bbox;
    Ok(FaceObservation {
        geometry: Some(FaceGeometry {
            detected: true,
            count,
            confidence: primary.detection.score.clamp(0.0, 1.0),
            bounding_box: Some(BoundingBox::new(b.x, b.y, b.width, b.height)),
            landmarks: primary
                .landmarks
                .as_ref()
                .and_then(|l| landmarks_from_68(&l.positions)),
            rotation: None,
        }),
        attributes,
    })
}

fn landmarks_from_68(points: &[FaceApiPoint]) -> Option<Landmarks> {
    if points.len() < FACE_API_POINTS {
        return None;
    }
    let at = |i: usize| Point::new(points[i].x, points[i].y);
    let (left_eye, right_eye) = image_order(
        centroid(&points[FIRST_EYE]),
        centroid(&points[SECOND_EYE]),
    );
    Some(Landmarks {
        left_eye,
        right_eye,
        nose: Some(at(NOSE_TIP)),
        mouth: centroid(&points[MOUTH]),
        chin: Some(at(CHIN)),
    })
}

#[allow(clippy::cast_precision_loss)]
fn centroid(points: &[FaceApiPoint]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

/// Orders two eyes so the first has the smaller x.
fn image_order(a: Option<Point>, b: Option<Point>) -> (Option<Point>, Option<Point>) {
    match (a, b) {
        (Some(a), Some(b)) if b.x < a.x => (Some(b), Some(a)),
        other => other,
    }
}
