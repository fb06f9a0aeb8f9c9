//! Face geometry supplied by an external detector.
//!
//! Every sub-field is optional: detectors may return a box without
//! landmarks, landmarks without rotation, or nothing at all.

use serde::{Deserialize, Serialize};

/// A point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate (grows downward).
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points.
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Axis-aligned face box in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl BoundingBox {
    /// Creates a box.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Horizontal center.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the box has a positive area.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.x.is_finite() && self.y.is_finite()
    }
}

/// Facial landmarks. Any individual point may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Landmarks {
    /// Left eye as reported by the detector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_eye: Option<Point>,
    /// Right eye as reported by the detector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_eye: Option<Point>,
    /// Nose tip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nose: Option<Point>,
    /// Mouth center.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouth: Option<Point>,
    /// Chin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chin: Option<Point>,
}

impl Landmarks {
    /// Both eyes, when both are present.
    #[must_use]
    pub const fn eyes(&self) -> Option<(Point, Point)> {
        match (self.left_eye, self.right_eye) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }
}

/// Head rotation in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Nodding up/down.
    pub pitch: f64,
    /// Turning left/right.
    pub yaw: f64,
    /// In-plane tilt.
    pub roll: f64,
}

impl Rotation {
    /// Largest absolute angle across the three axes.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.pitch.abs().max(self.yaw.abs()).max(self.roll.abs())
    }
}

/// Canonical face-geometry result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceGeometry {
    /// Whether the detector found at least one face.
    pub detected: bool,
    /// Number of faces found.
    pub count: u32,
    /// Confidence of the primary detection (0.0-1.0).
    pub confidence: f64,
    /// Box of the primary face.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    /// Landmarks of the primary face.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Landmarks>,
    /// Rotation of the primary face.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
}

impl FaceGeometry {
    /// A single detected face with only a bounding box.
    #[must_use]
    pub const fn with_box(bounding_box: BoundingBox, confidence: f64) -> Self {
        Self {
            detected: true,
            count: 1,
            confidence,
            bounding_box: Some(bounding_box),
            landmarks: None,
            rotation: None,
        }
    }

    /// A result with no face found.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            detected: false,
            count: 0,
            confidence: 0.0,
            bounding_box: None,
            landmarks: None,
            rotation: None,
        }
    }

    /// Both eye positions, when the landmarks carry them.
    #[must_use]
    pub fn eyes(&self) -> Option<(Point, Point)> {
        self.landmarks.as_ref().and_then(Landmarks::eyes)
    }

    /// The bounding box, if a face was detected and the box is usable.
    #[must_use]
    pub fn usable_box(&self) -> Option<BoundingBox> {
        self.bounding_box.filter(|b| self.detected && b.is_valid())
    }
}

/// Externally classified appearance attributes of the primary face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceAttributes {
    /// Glasses are worn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glasses: Option<bool>,
    /// The subject smiles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smile: Option<bool>,
    /// A head covering is worn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headwear: Option<bool>,
    /// Both eyes are open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eyes_open: Option<bool>,
    /// The mouth is closed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouth_closed: Option<bool>,
}

/// Everything an external detector reports for one still image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceObservation {
    /// Face geometry, absent when the detector produced nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<FaceGeometry>,
    /// Appearance attributes.
    pub attributes: FaceAttributes,
}
