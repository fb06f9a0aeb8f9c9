//! Focus measurement via Laplacian variance.

use image::imageops::FilterType;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::luma_plane;

/// Configuration for sharpness measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpnessConfig {
    /// Images whose larger side exceeds this are downscaled before filtering.
    pub max_dimension: u32,
}

impl Default for SharpnessConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1024,
        }
    }
}

/// Normalized sharpness in 0.0-1.0: `min(1, sqrt(var(laplacian)) / 100)`.
///
/// Images without interior pixels score 0.0.
#[must_use]
pub fn measure_sharpness(image: &RgbaImage, config: &SharpnessConfig) -> f64 {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    let limit = config.max_dimension.max(3);
    if longest > limit {
        let factor = f64::from(limit) / f64::from(longest);
        let (w, h) = (scaled(width, factor), scaled(height, factor));
        let small = image::imageops::resize(image, w, h, FilterType::Triangle);
        return score(laplacian_variance(&luma_plane(&small), w as usize, h as usize));
    }
    score(laplacian_variance(
        &luma_plane(image),
        width as usize,
        height as usize,
    ))
}

fn score(variance: f64) -> f64 {
    (variance.sqrt() / 100.0).min(1.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled(side: u32, factor: f64) -> u32 {
    ((f64::from(side) * factor).round() as u32).max(1)
}

/// Variance of the 4-neighbour Laplacian over every interior pixel.
#[allow(clippy::cast_precision_loss)]
fn laplacian_variance(luma: &[u8], width: usize, height: usize) -> f64 {
    if width < 3 || height < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut count = 0usize;
    for y in 1..height - 1 {
        let row = y * width;
        for x in 1..width - 1 {
            let i = row + x;
            let response = f64::from(luma[i - width])
                + f64::from(luma[i + width])
                + f64::from(luma[i - 1])
                + f64::from(luma[i + 1])
                - 4.0 * f64::from(luma[i]);
            sum += response;
            sum_sq += response * response;
            count += 1;
        }
    }
    let n = count as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}
