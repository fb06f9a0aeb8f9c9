//! Background color and uniformity from corner samples.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::domain::HexColor;

/// Configuration for corner sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Corner patch size as a fraction of width and height.
    pub corner_fraction: f64,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            corner_fraction: 0.1,
        }
    }
}

/// Mean color and flatness of the four corner patches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundSample {
    /// Mean corner color.
    pub color: HexColor,
    /// `max(0, 1 - mean channel std-dev / 100)`.
    pub uniformity: f64,
    /// Mean corner luminance.
    pub luminance: f64,
}

/// Samples the four corners of `image`. Returns `None` for an empty image.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn sample_background(image: &RgbaImage, config: &BackgroundConfig) -> Option<BackgroundSample> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }
    let fraction = config.corner_fraction.clamp(0.01, 0.5);
    let patch_w = ((f64::from(width) * fraction) as u32).clamp(1, width);
    let patch_h = ((f64::from(height) * fraction) as u32).clamp(1, height);
    let origins = [
        (0, 0),
        (width - patch_w, 0),
        (0, height - patch_h),
        (width - patch_w, height - patch_h),
    ];

    let raw = image.as_raw();
    let stride = width as usize * 4;
    let mut sum = [0.0f64; 3];
    let mut sum_sq = [0.0f64; 3];
    let mut count = 0usize;
    for (ox, oy) in origins {
        for y in oy as usize..(oy + patch_h) as usize {
            let row = y * stride;
            for x in ox as usize..(ox + patch_w) as usize {
                let i = row + x * 4;
                for c in 0..3 {
                    let v = f64::from(raw[i + c]);
                    sum[c] += v;
                    sum_sq[c] += v * v;
                }
                count += 1;
            }
        }
    }

    let n = count as f64;
    let mean = sum.map(|s| s / n);
    let mut std_total = 0.0;
    for c in 0..3 {
        std_total += (sum_sq[c] / n - mean[c] * mean[c]).max(0.0).sqrt();
    }
    let color = HexColor::from_means(mean[0], mean[1], mean[2]);
    Some(BackgroundSample {
        color,
        uniformity: (1.0 - (std_total / 3.0) / 100.0).max(0.0),
        luminance: color.luminance(),
    })
}
