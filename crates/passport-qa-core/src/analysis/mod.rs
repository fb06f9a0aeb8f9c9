//! Pixel-level image quality analysis.
//!
//! Every function here is pure and works on a row-major RGBA buffer. A
//! missing or empty buffer never fails: the analyzer falls back to neutral
//! metrics and leaves the verdict to the compliance checks.

mod background;
mod color;
mod exposure;
mod geometry;
mod halo;
mod histogram;
mod sharpness;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use background::{sample_background, BackgroundConfig, BackgroundSample};
pub use color::{is_grayscale, mean_chroma};
pub use exposure::{measure_exposure, ExposureConfig, ExposureReading};
pub use geometry::eye_tilt_degrees;
pub use halo::{detect_halo, HaloConfig};
pub use histogram::Histogram;
pub use sharpness::{measure_sharpness, SharpnessConfig};

use crate::domain::{
    aspect_ratio, FaceObservation, HaloReport, ImageAnalysis, QualityMetrics,
};

/// Configuration of every analyzer stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Sharpness stage.
    pub sharpness: SharpnessConfig,
    /// Exposure stage.
    pub exposure: ExposureConfig,
    /// Corner sampling.
    pub background: BackgroundConfig,
    /// Halo detection.
    pub halo: HaloConfig,
    /// Mean chroma below which an image is grayscale.
    pub grayscale_threshold: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sharpness: SharpnessConfig::default(),
            exposure: ExposureConfig::default(),
            background: BackgroundConfig::default(),
            halo: HaloConfig::default(),
            grayscale_threshold: 3.0,
        }
    }
}

/// Runs every measurement and assembles an [`ImageAnalysis`].
#[derive(Debug, Clone, Default)]
pub struct ImageAnalyzer {
    config: AnalyzerConfig,
}

impl ImageAnalyzer {
    /// Creates an analyzer with the given configuration.
    #[must_use]
    pub const fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Returns the analyzer configuration.
    #[must_use]
    pub const fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Measures `image` and combines it with the detector's observation.
    ///
    /// Transparent pixels are composited onto white first, matching what a
    /// background-removal service hands back.
    #[must_use]
    pub fn analyze(&self, image: Option<&RgbaImage>, observation: FaceObservation) -> ImageAnalysis {
        let FaceObservation {
            geometry,
            attributes,
        } = observation;

        let metrics = match image.filter(|img| img.width() > 0 && img.height() > 0) {
            Some(img) => {
                let flattened = flatten_on_white(img);
                let img = flattened.as_ref().unwrap_or(img);
                let face_box = geometry.as_ref().and_then(|g| g.usable_box());
                self.measure(img, face_box.as_ref())
            }
            None => {
                let (w, h) = image.map_or((0, 0), RgbaImage::dimensions);
                debug!(width = w, height = h, "no pixels to analyze, using neutral metrics");
                QualityMetrics::neutral(w, h)
            }
        };

        ImageAnalysis {
            metrics,
            face: geometry,
            attributes,
        }
    }

    fn measure(
        &self,
        image: &RgbaImage,
        face_box: Option<&crate::domain::BoundingBox>,
    ) -> QualityMetrics {
        let (width, height) = image.dimensions();
        let luma = luma_plane(image);
        let exposure = measure_exposure(&luma, &self.config.exposure);
        let sharpness = measure_sharpness(image, &self.config.sharpness);
        let background = sample_background(image, &self.config.background);
        let halo = background.map_or_else(HaloReport::default, |sample| {
            detect_halo(
                &luma,
                width as usize,
                height as usize,
                face_box,
                sample.luminance,
                &self.config.halo,
            )
        });
        let is_grayscale = is_grayscale(image, self.config.grayscale_threshold);

        debug!(
            width,
            height,
            brightness = exposure.brightness,
            sharpness,
            halo = halo.halo_score,
            is_grayscale,
            "measured image"
        );

        QualityMetrics {
            brightness: exposure.brightness,
            contrast: exposure.contrast,
            sharpness,
            exposure: exposure.exposure,
            background_color: background.map(|s| s.color),
            background_uniformity: background.map_or(1.0, |s| s.uniformity),
            halo,
            is_grayscale,
            width,
            height,
            aspect_ratio: aspect_ratio(width, height),
        }
    }
}

/// Rec. 601 luminance of one pixel, rounded to 8 bits.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b))
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Row-major luminance plane of an RGBA buffer.
#[must_use]
pub fn luma_plane(image: &RgbaImage) -> Vec<u8> {
    image
        .as_raw()
        .chunks_exact(4)
        .map(|px| luma(px[0], px[1], px[2]))
        .collect()
}

/// Composites translucent pixels over white. Returns `None` if the image is
/// already opaque.
#[must_use]
pub fn flatten_on_white(image: &RgbaImage) -> Option<RgbaImage> {
    if image.as_raw().chunks_exact(4).all(|px| px[3] == u8::MAX) {
        return None;
    }
    let mut out = image.clone();
    for px in out.chunks_exact_mut(4) {
        let alpha = u16::from(px[3]);
        for c in &mut px[..3] {
            let blended = (u16::from(*c) * alpha + 255 * (255 - alpha) + 127) / 255;
            *c = u8::try_from(blended).unwrap_or(u8::MAX);
        }
        px[3] = u8::MAX;
    }
    Some(out)
}
