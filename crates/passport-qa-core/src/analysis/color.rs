//! Grayscale detection.

use image::RgbaImage;

/// Mean per-pixel chroma, `max(r, g, b) - min(r, g, b)`, over the whole image.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn mean_chroma(image: &RgbaImage) -> f64 {
    let raw = image.as_raw();
    let pixels = raw.len() / 4;
    if pixels == 0 {
        return 0.0;
    }
    let total: u64 = raw
        .chunks_exact(4)
        .map(|px| {
            let max = px[0].max(px[1]).max(px[2]);
            let min = px[0].min(px[1]).min(px[2]);
            u64::from(max - min)
        })
        .sum();
    total as f64 / pixels as f64
}

/// Whether the image carries (almost) no color.
#[must_use]
pub fn is_grayscale(image: &RgbaImage, threshold: f64) -> bool {
    mean_chroma(image) < threshold
}
