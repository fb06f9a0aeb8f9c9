//! Per-image report and image container types.

use serde::{Deserialize, Serialize};

use super::{ComplianceResult, ImageAnalysis, StandardCode};

/// Complete compliance report for a single image file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Path to the checked image.
    pub path: String,
    /// Timestamp of the check (ISO 8601).
    pub timestamp: String,
    /// Standard the image was checked against.
    pub standard: StandardCode,
    /// Image dimensions.
    pub dimensions: ImageDimensions,
    /// The verdict.
    pub result: ComplianceResult,
    /// The measurements behind the verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ImageAnalysis>,
}

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// Creates dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A decoded image and where it came from.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Path to the image file, or a synthetic identifier.
    pub path: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded image data.
    pub image: image::DynamicImage,
}

impl ImageInfo {
    /// Wraps a decoded image.
    #[must_use]
    pub fn new(path: impl Into<String>, image: image::DynamicImage) -> Self {
        Self {
            path: path.into(),
            width: image.width(),
            height: image.height(),
            image,
        }
    }

    /// Converts to an 8-bit RGBA buffer for the pixel analyzers.
    #[must_use]
    pub fn to_rgba8(&self) -> image::RgbaImage {
        self.image.to_rgba8()
    }

    /// Dimensions of the image.
    #[must_use]
    pub const fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.width, self.height)
    }
}
