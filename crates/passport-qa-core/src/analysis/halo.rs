//! Detection of bright fringes left behind by background cut-outs.
//!
//! With a face box, the mean luminance of a thin ring just outside the top,
//! left and right edges of the box is compared against a band just inside
//! the box and against the far background. A ring brighter than both is a
//! halo. Without a box the whole image is scanned for thin bright ridges.

use serde::{Deserialize, Serialize};

use crate::domain::{BoundingBox, HaloReport};

/// Halo detection thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HaloConfig {
    /// Ring thickness as a fraction of box width.
    pub ring_fraction: f64,
    /// Inner band thickness as a fraction of box width.
    pub band_fraction: f64,
    /// Luminance excess of the ring that counts as a halo.
    pub min_excess: f64,
    /// Luminance excess that maps to a halo score of 100.
    pub full_scale_excess: f64,
    /// Distance in pixels to the neighbours of a ridge candidate.
    pub ridge_reach: usize,
    /// Fraction of ridge pixels that counts as a halo when no box is known.
    pub max_ridge_fraction: f64,
}

impl Default for HaloConfig {
    fn default() -> Self {
        Self {
            ring_fraction: 0.06,
            band_fraction: 0.1,
            min_excess: 18.0,
            full_scale_excess: 64.0,
            ridge_reach: 3,
            max_ridge_fraction: 0.015,
        }
    }
}

/// Scans the luminance plane for halo artifacts.
///
/// `background_luma` is the mean luminance of the corner samples.
#[must_use]
pub fn detect_halo(
    luma: &[u8],
    width: usize,
    height: usize,
    face_box: Option<&BoundingBox>,
    background_luma: f64,
    config: &HaloConfig,
) -> HaloReport {
    if width == 0 || height == 0 || luma.len() < width * height {
        return HaloReport::default();
    }
    let ring = face_box.and_then(|b| ring_excess(luma, width, height, b, background_luma, config));
    match ring {
        Some(excess) => {
            let score = (excess / config.full_scale_excess * 100.0).clamp(0.0, 100.0);
            report(score, excess > config.min_excess)
        }
        None => {
            let fraction = ridge_fraction(luma, width, height, config);
            let score = (fraction / config.max_ridge_fraction * 50.0).clamp(0.0, 100.0);
            report(score, fraction > config.max_ridge_fraction)
        }
    }
}

fn report(halo_score: f64, has_halo_artifacts: bool) -> HaloReport {
    HaloReport {
        halo_score,
        has_halo_artifacts,
        edge_quality: 100.0 - halo_score,
    }
}

/// Integer pixel rectangle, half-open.
#[derive(Debug, Clone, Copy)]
struct Span {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl Span {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn clipped(x0: f64, y0: f64, x1: f64, y1: f64, width: usize, height: usize) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let clip = |v: f64, max: usize| v.round().clamp(0.0, max as f64) as usize;
        Self {
            x0: clip(x0, width),
            y0: clip(y0, height),
            x1: clip(x1, width),
            y1: clip(y1, height),
        }
    }

    fn accumulate(self, luma: &[u8], width: usize, acc: &mut (f64, usize)) {
        for y in self.y0..self.y1 {
            let row = y * width;
            for &v in &luma[row + self.x0..row + self.x1.max(self.x0)] {
                acc.0 += f64::from(v);
                acc.1 += 1;
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean_over(spans: &[Span], luma: &[u8], width: usize) -> Option<f64> {
    let mut acc = (0.0, 0usize);
    for span in spans {
        span.accumulate(luma, width, &mut acc);
    }
    (acc.1 > 0).then(|| acc.0 / acc.1 as f64)
}

fn ring_excess(
    luma: &[u8],
    width: usize,
    height: usize,
    face: &BoundingBox,
    background_luma: f64,
    config: &HaloConfig,
) -> Option<f64> {
    if !face.is_valid() {
        return None;
    }
    let ring = (face.width * config.ring_fraction).max(2.0);
    let band = (face.width * config.band_fraction).max(2.0);
    let (left, top, right, bottom) = (face.x, face.y, face.right(), face.bottom());
    let clip = |x0, y0, x1, y1| Span::clipped(x0, y0, x1, y1, width, height);

    let outer = [
        clip(left - ring, top - ring, right + ring, top),
        clip(left - ring, top, left, bottom),
        clip(right, top, right + ring, bottom),
    ];
    let inner = [
        clip(left, top, right, top + band),
        clip(left, top + band, left + band, bottom),
        clip(right - band, top + band, right, bottom),
    ];
    let ring_luma = mean_over(&outer, luma, width)?;
    let face_luma = mean_over(&inner, luma, width)?;
    Some(ring_luma - face_luma.max(background_luma))
}

/// Fraction of pixels brighter than both neighbours at `ridge_reach` along
/// either axis by more than `min_excess`.
#[allow(clippy::cast_precision_loss)]
fn ridge_fraction(luma: &[u8], width: usize, height: usize, config: &HaloConfig) -> f64 {
    let d = config.ridge_reach.max(1);
    if width <= 2 * d && height <= 2 * d {
        return 0.0;
    }
    let threshold = config.min_excess;
    let mut ridges = 0usize;
    for y in 0..height {
        let row = y * width;
        for x in 0..width {
            let i = row + x;
            let v = f64::from(luma[i]);
            let horizontal = x >= d
                && x + d < width
                && v - f64::from(luma[i - d]).max(f64::from(luma[i + d])) > threshold;
            let vertical = y >= d
                && y + d < height
                && v - f64::from(luma[i - d * width]).max(f64::from(luma[i + d * width]))
                    > threshold;
            if horizontal || vertical {
                ridges += 1;
            }
        }
    }
    ridges as f64 / (width * height) as f64
}
