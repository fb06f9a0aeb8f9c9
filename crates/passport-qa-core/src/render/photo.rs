//! Rendering of the single output photo.

use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::glyphs::{apply_watermark, Watermark};
use crate::crop::CropParams;
use crate::domain::Requirement;

/// Smallest zoom factor accepted.
pub const MIN_ZOOM: f64 = 0.1;

const FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// User fine-tuning layered on top of the computed crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    /// Magnification; 2.0 shows half the crop width. Clamped to [`MIN_ZOOM`].
    pub zoom: f64,
    /// Horizontal shift as a fraction of crop width (positive moves right).
    pub pan_x: f64,
    /// Vertical shift as a fraction of crop height (positive moves down).
    pub pan_y: f64,
    /// Brightness multiplier applied to RGB.
    pub brightness: f64,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            brightness: 1.0,
        }
    }
}

impl Adjustments {
    /// Whether every value is identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Source region `(x, y, w, h)` after applying zoom and pan to `crop`.
    #[must_use]
    pub fn region(&self, crop: &CropParams) -> (f64, f64, f64, f64) {
        let zoom = if self.zoom.is_finite() { self.zoom.max(MIN_ZOOM) } else { 1.0 };
        let (cw, ch) = (f64::from(crop.crop_w), f64::from(crop.crop_h));
        let cx = f64::from(crop.crop_x) + cw / 2.0 + self.pan_x * cw;
        let cy = f64::from(crop.crop_y) + ch / 2.0 + self.pan_y * ch;
        let (w, h) = (cw / zoom, ch / zoom);
        (cx - w / 2.0, cy - h / 2.0, w, h)
    }
}

/// Renders the output photo for `requirement` from `source`.
///
/// The crop (adjusted by zoom and pan) is resampled bilinearly to the
/// standard's pixel size. Areas outside the source are filled white.
#[must_use]
pub fn render_photo(
    source: &RgbaImage,
    crop: &CropParams,
    adjustments: &Adjustments,
    requirement: &Requirement,
    watermark: Option<&Watermark>,
) -> RgbaImage {
    let (out_w, out_h) = requirement.output_pixels();
    let mut output = RgbaImage::from_pixel(out_w, out_h, FILL);
    let (rx, ry, rw, rh) = adjustments.region(crop);

    if rw > 0.0 && rh > 0.0 && source.width() > 0 && source.height() > 0 {
        let sx = f64::from(out_w) / rw;
        let sy = f64::from(out_h) / rh;
        #[allow(clippy::cast_possible_truncation)]
        let matrix = [
            sx as f32,
            0.0,
            (-rx * sx) as f32,
            0.0,
            sy as f32,
            (-ry * sy) as f32,
            0.0,
            0.0,
            1.0,
        ];
        match Projection::from_matrix(matrix) {
            Some(projection) => {
                warp_into(source, &projection, Interpolation::Bilinear, FILL, &mut output);
            }
            None => warn!(?crop, "crop is not invertible, rendering blank photo"),
        }
    }

    if (adjustments.brightness - 1.0).abs() > f64::EPSILON {
        apply_brightness(&mut output, adjustments.brightness);
    }
    debug!(
        code = %requirement.code,
        out_w,
        out_h,
        zoom = adjustments.zoom,
        "rendered photo"
    );
    match watermark {
        Some(mark) => apply_watermark(output, mark),
        None => output,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn apply_brightness(image: &mut RgbaImage, factor: f64) {
    let factor = if factor.is_finite() { factor.max(0.0) } else { 1.0 };
    for px in image.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            *c = (f64::from(*c) * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
}
