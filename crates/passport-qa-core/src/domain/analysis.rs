//! Measured image properties consumed by the compliance checker.

use serde::{Deserialize, Serialize};

use super::{FaceAttributes, FaceGeometry, HexColor};

/// Sharpness value reported when no pixels could be read.
pub const SHARPNESS_UNKNOWN: f64 = 999.0;

/// Exposure classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exposure {
    /// Mean luminance and clipping within limits.
    #[default]
    ProperlyExposed,
    /// Too bright or too many clipped highlights.
    Overexposed,
    /// Too dark.
    Underexposed,
}

/// Result of the cut-out halo scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HaloReport {
    /// Halo strength (0-100, higher is worse).
    pub halo_score: f64,
    /// Whether the score crossed the artifact threshold.
    pub has_halo_artifacts: bool,
    /// Edge quality (0-100, higher is better).
    pub edge_quality: f64,
}

impl Default for HaloReport {
    fn default() -> Self {
        Self {
            halo_score: 0.0,
            has_halo_artifacts: false,
            edge_quality: 100.0,
        }
    }
}

/// Image-level quality metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Mean luminance (0-255).
    pub brightness: f64,
    /// Luminance spread (0.0-1.0).
    pub contrast: f64,
    /// Normalized Laplacian sharpness (0.0-1.0), or [`SHARPNESS_UNKNOWN`].
    pub sharpness: f64,
    /// Exposure classification.
    pub exposure: Exposure,
    /// Mean corner color, absent when no pixels were available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<HexColor>,
    /// Corner-sample uniformity (0.0-1.0).
    pub background_uniformity: f64,
    /// Halo scan result.
    pub halo: HaloReport,
    /// Whether the image carries no color information.
    pub is_grayscale: bool,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Width / height.
    pub aspect_ratio: f64,
}

impl QualityMetrics {
    /// Neutral metrics for an image whose pixels could not be read.
    #[must_use]
    pub fn neutral(width: u32, height: u32) -> Self {
        Self {
            brightness: 128.0,
            contrast: 0.5,
            sharpness: SHARPNESS_UNKNOWN,
            exposure: Exposure::ProperlyExposed,
            background_color: None,
            background_uniformity: 1.0,
            halo: HaloReport::default(),
            is_grayscale: false,
            width,
            height,
            aspect_ratio: aspect_ratio(width, height),
        }
    }

    /// Whether the sharpness value is the unknown sentinel rather than a score.
    #[must_use]
    pub fn sharpness_is_unknown(&self) -> bool {
        self.sharpness > 1.0
    }
}

/// Width / height, or 0.0 for a zero-height image.
#[must_use]
pub fn aspect_ratio(width: u32, height: u32) -> f64 {
    if height == 0 {
        0.0
    } else {
        f64::from(width) / f64::from(height)
    }
}

/// Complete input of one compliance evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    /// Measured quality metrics.
    pub metrics: QualityMetrics,
    /// Face geometry from the external detector, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<FaceGeometry>,
    /// Externally classified attributes.
    pub attributes: FaceAttributes,
}
