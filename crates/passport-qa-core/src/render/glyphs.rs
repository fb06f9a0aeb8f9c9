//! 5x7 bitmap font and a tiled, translucent watermark.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, Blend};
use imageproc::rect::Rect;

const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;

/// Rows of a 5x7 glyph, most significant of the low five bits on the left.
fn glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x06, 0x08, 0x10, 0x1F],
        '3' => [0x0E, 0x11, 0x01, 0x06, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        _ => [0x00; 7],
    }
}

/// Watermark appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watermark {
    /// Text to repeat across the image.
    pub text: String,
    /// Ink color including alpha.
    pub color: Rgba<u8>,
}

impl Watermark {
    /// Translucent grey watermark with the given text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Rgba([96, 96, 96, 80]),
        }
    }
}

/// Width in pixels of `text` at `scale`, including one column of spacing per glyph.
#[must_use]
pub fn text_width(text: &str, scale: u32) -> u32 {
    let glyphs = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    glyphs.saturating_mul((GLYPH_W + 1) * scale)
}

#[allow(clippy::cast_possible_wrap)]
fn draw_text(canvas: &mut Blend<RgbaImage>, x: i32, y: i32, text: &str, scale: u32, color: Rgba<u8>) {
    let step = ((GLYPH_W + 1) * scale) as i32;
    let cell = scale as i32;
    let mut gx = x;
    for ch in text.chars() {
        for (row, bits) in (0i32..).zip(glyph(ch)) {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                let rect = Rect::at(gx + col as i32 * cell, y + row * cell).of_size(scale, scale);
                draw_filled_rect_mut(canvas, rect, color);
            }
        }
        gx = gx.saturating_add(step);
    }
}

/// Repeats the watermark text in staggered rows over the whole image.
///
/// The result is fully opaque.
#[must_use]
pub fn apply_watermark(image: RgbaImage, watermark: &Watermark) -> RgbaImage {
    let text = watermark.text.trim();
    let (width, height) = image.dimensions();
    if text.is_empty() || width == 0 || height == 0 {
        return image;
    }
    // Roughly eight text rows per image height.
    let scale = (height / (GLYPH_H * 8 * 2)).clamp(1, 12);
    let line_w = text_width(text, scale) + GLYPH_W * scale * 3;
    let line_h = GLYPH_H * scale * 3;

    let mut canvas = Blend(image);
    let mut row = 0u32;
    let mut y = 0u32;
    while y < height {
        let offset = if row % 2 == 0 { 0 } else { line_w / 2 };
        let top = i32::try_from(y).unwrap_or(i32::MAX);
        let mut x = -i64::from(offset);
        while x < i64::from(width) {
            let left = i32::try_from(x).unwrap_or(i32::MAX);
            draw_text(&mut canvas, left, top, text, scale, watermark.color);
            x += i64::from(line_w);
        }
        y += line_h;
        row += 1;
    }
    // Blending can leave alpha a hair under opaque.
    let mut marked = canvas.0;
    for px in marked.pixels_mut() {
        px.0[3] = u8::MAX;
    }
    marked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_glyph_has_ink() {
        assert!(glyph('p').iter().any(|row| *row != 0));
        assert_eq!(glyph('?'), [0; 7]);
    }

    #[test]
    fn test_watermark_darkens_white_image() {
        let white = RgbaImage::from_pixel(200, 200, Rgba([255, 255, 255, 255]));
        let marked = apply_watermark(white, &Watermark::new("PREVIEW"));
        let darkened = marked.pixels().filter(|p| p.0[0] < 255).count();
        assert!(darkened > 0);
        assert!(marked.pixels().all(|p| p.0[3] == 255));
        // translucent ink leaves most of the image untouched
        assert!(darkened < 200 * 200 / 2, "{darkened}");
    }

    #[test]
    fn test_empty_text_is_a_no_op() {
        let white = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        let marked = apply_watermark(white.clone(), &Watermark::new("   "));
        assert_eq!(marked, white);
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("AB", 2), 24);
    }
}
