//! Exposure classification and contrast from the luminance histogram.

use serde::{Deserialize, Serialize};

use super::Histogram;
use crate::domain::Exposure;

/// Configuration for exposure classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    /// Mean luminance above which the image is overexposed.
    pub over_mean: f64,
    /// Mean luminance below which the image is underexposed.
    pub under_mean: f64,
    /// Luminance at or above which a pixel counts as clipped highlight.
    pub highlight_clip_level: u8,
    /// Highlight fraction above which the image is overexposed.
    pub max_highlight_fraction: f64,
    /// Luminance at or below which a pixel counts as crushed shadow.
    pub shadow_clip_level: u8,
    /// Shadow fraction above which the image is underexposed.
    pub max_shadow_fraction: f64,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            over_mean: 200.0,
            under_mean: 60.0,
            highlight_clip_level: 250,
            max_highlight_fraction: 0.35,
            shadow_clip_level: 5,
            max_shadow_fraction: 0.35,
        }
    }
}

/// Luminance statistics of one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureReading {
    /// Mean luminance (0-255).
    pub brightness: f64,
    /// Standard deviation / 128, clamped to 0.0-1.0.
    pub contrast: f64,
    /// Classification.
    pub exposure: Exposure,
}

impl ExposureReading {
    /// Reading used when no pixels are available.
    pub const NEUTRAL: Self = Self {
        brightness: 128.0,
        contrast: 0.5,
        exposure: Exposure::ProperlyExposed,
    };
}

/// Classifies exposure from a luminance plane.
#[must_use]
pub fn measure_exposure(luma: &[u8], config: &ExposureConfig) -> ExposureReading {
    if luma.is_empty() {
        return ExposureReading::NEUTRAL;
    }
    let histogram = Histogram::from_luma(luma);
    let (brightness, spread) = histogram.moments();
    let highlights = histogram.fraction_in(config.highlight_clip_level..=u8::MAX);
    let shadows = histogram.fraction_in(0..=config.shadow_clip_level);

    let exposure = if brightness > config.over_mean || highlights > config.max_highlight_fraction {
        Exposure::Overexposed
    } else if brightness < config.under_mean || shadows > config.max_shadow_fraction {
        Exposure::Underexposed
    } else {
        Exposure::ProperlyExposed
    };

    ExposureReading {
        brightness,
        contrast: (spread / 128.0).clamp(0.0, 1.0),
        exposure,
    }
}

#[cfg(test)]
#[allow(clippy::cast_possible_truncation)]
mod tests {
    use super::*;

    #[test]
    fn test_black_is_underexposed() {
        let reading = measure_exposure(&[0u8; 10_000], &ExposureConfig::default());
        assert_eq!(reading.exposure, Exposure::Underexposed);
        assert!(reading.brightness.abs() < f64::EPSILON);
        assert!(reading.contrast.abs() < f64::EPSILON);
    }

    #[test]
    fn test_white_is_overexposed() {
        let reading = measure_exposure(&[255u8; 10_000], &ExposureConfig::default());
        assert_eq!(reading.exposure, Exposure::Overexposed);
    }

    #[test]
    fn test_clipped_highlights_overexpose_a_mid_mean() {
        // 40% blown out, rest dark enough to keep the mean low
        let mut plane = vec![255u8; 400];
        plane.extend([90u8; 600]);
        let reading = measure_exposure(&plane, &ExposureConfig::default());
        assert!(reading.brightness < 200.0);
        assert_eq!(reading.exposure, Exposure::Overexposed);
    }

    #[test]
    fn test_gradient_is_properly_exposed() {
        let plane: Vec<u8> = (0..10_000).map(|i| 50 + (i % 150) as u8).collect();
        let reading = measure_exposure(&plane, &ExposureConfig::default());
        assert_eq!(reading.exposure, Exposure::ProperlyExposed);
        assert!(reading.contrast > 0.2 && reading.contrast < 0.5, "{}", reading.contrast);
    }

    #[test]
    fn test_empty_plane_is_neutral() {
        let reading = measure_exposure(&[], &ExposureConfig::default());
        assert_eq!(reading, ExposureReading::NEUTRAL);
    }

    #[test]
    fn test_contrast_clamped() {
        let mut plane = vec![0u8; 500];
        plane.extend([255u8; 500]);
        let reading = measure_exposure(&plane, &ExposureConfig::default());
        assert!(reading.contrast <= 1.0);
        assert!(reading.contrast > 0.99);
    }
}
