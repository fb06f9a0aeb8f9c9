//! Tiling photos onto a 6x4 inch print sheet.

use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::glyphs::{apply_watermark, Watermark};
use crate::domain::PhysicalSize;

/// The print sheet: 6x4 inches, landscape.
pub const SHEET_SIZE: PhysicalSize = PhysicalSize::inches(6.0, 4.0);

const GUIDE: Rgba<u8> = Rgba([160, 160, 160, 255]);
const DASH: f32 = 12.0;
const GAP: f32 = 8.0;
/// Distance between a tile and its cut guides.
const GUIDE_MARGIN: i64 = 4;

/// Where the copies go on the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Sheet width in pixels.
    pub sheet_w: u32,
    /// Sheet height in pixels.
    pub sheet_h: u32,
    /// Tile columns used.
    pub columns: u32,
    /// Tile rows used.
    pub rows: u32,
    /// Most copies that fit on the sheet.
    pub capacity: u32,
    /// Top-left corner of every placed tile.
    pub positions: Vec<(u32, u32)>,
}

impl SheetLayout {
    /// Number of copies actually placed.
    #[must_use]
    pub fn placed(&self) -> usize {
        self.positions.len()
    }
}

/// Plans a centered grid of up to `copies` tiles of `tile_w` × `tile_h`.
///
/// Spacing is equal between tiles and towards the sheet edges.
#[must_use]
pub fn layout_sheet(tile_w: u32, tile_h: u32, copies: u32) -> SheetLayout {
    let (sheet_w, sheet_h) = SHEET_SIZE.to_pixels();
    let max_columns = sheet_w.checked_div(tile_w).unwrap_or(0);
    let max_rows = sheet_h.checked_div(tile_h).unwrap_or(0);
    let capacity = max_columns * max_rows;
    let placed = copies.min(capacity);
    if placed == 0 {
        return SheetLayout {
            sheet_w,
            sheet_h,
            columns: 0,
            rows: 0,
            capacity,
            positions: Vec::new(),
        };
    }

    let columns = placed.min(max_columns);
    let rows = placed.div_ceil(columns);
    let gap_x = (sheet_w - columns * tile_w) / (columns + 1);
    let gap_y = (sheet_h - rows * tile_h) / (rows + 1);
    let positions = (0..placed)
        .map(|i| {
            let (col, row) = (i % columns, i / columns);
            (
                gap_x + col * (tile_w + gap_x),
                gap_y + row * (tile_h + gap_y),
            )
        })
        .collect();

    SheetLayout {
        sheet_w,
        sheet_h,
        columns,
        rows,
        capacity,
        positions,
    }
}

/// Renders a white print sheet with `copies` of `photo` and dashed cut guides.
#[must_use]
pub fn render_sheet(
    photo: &RgbaImage,
    copies: u32,
    watermark: Option<&Watermark>,
) -> (RgbaImage, SheetLayout) {
    let (tile_w, tile_h) = photo.dimensions();
    let layout = layout_sheet(tile_w, tile_h, copies);
    let mut sheet =
        RgbaImage::from_pixel(layout.sheet_w, layout.sheet_h, Rgba([255, 255, 255, 255]));

    for &(x, y) in &layout.positions {
        imageops::replace(&mut sheet, photo, i64::from(x), i64::from(y));
    }
    draw_cut_guides(&mut sheet, &layout, tile_w, tile_h);
    debug!(
        placed = layout.placed(),
        capacity = layout.capacity,
        columns = layout.columns,
        rows = layout.rows,
        "rendered sheet"
    );

    let sheet = match watermark {
        Some(mark) => apply_watermark(sheet, mark),
        None => sheet,
    };
    (sheet, layout)
}

/// Dashed outlines around every tile, confined to the gutters.
///
/// Guides sit `GUIDE_MARGIN` outside a tile, or halfway into a narrower gap.
/// Pixels covered by any tile are never painted, so with no gap at all the
/// tile edges are the only cut marks.
#[allow(clippy::cast_precision_loss)]
fn draw_cut_guides(sheet: &mut RgbaImage, layout: &SheetLayout, w: u32, h: u32) {
    // Spacing is uniform, so the first tile's offset is the gap.
    let Some(&(gap_x, gap_y)) = layout.positions.first() else {
        return;
    };
    let offset_x = GUIDE_MARGIN.min(i64::from(gap_x) / 2);
    let offset_y = GUIDE_MARGIN.min(i64::from(gap_y) / 2);

    let mut guides = RgbaImage::new(sheet.width(), sheet.height());
    for &(x, y) in &layout.positions {
        let left = (i64::from(x) - offset_x) as f32;
        let top = (i64::from(y) - offset_y) as f32;
        let right = (i64::from(x + w) - 1 + offset_x) as f32;
        let bottom = (i64::from(y + h) - 1 + offset_y) as f32;
        dashed(&mut guides, (left, top), (right, top));
        dashed(&mut guides, (left, bottom), (right, bottom));
        dashed(&mut guides, (left, top), (left, bottom));
        dashed(&mut guides, (right, top), (right, bottom));
    }

    let on_tile = |px: u32, py: u32| {
        layout
            .positions
            .iter()
            .any(|&(x, y)| (x..x + w).contains(&px) && (y..y + h).contains(&py))
    };
    for (px, py, pixel) in guides.enumerate_pixels() {
        if pixel[3] != 0 && !on_tile(px, py) {
            sheet.put_pixel(px, py, GUIDE);
        }
    }
}

fn dashed(sheet: &mut RgbaImage, from: (f32, f32), to: (f32, f32)) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = dx.hypot(dy);
    if length <= 0.0 {
        return;
    }
    let (ux, uy) = (dx / length, dy / length);
    let mut t = 0.0;
    while t < length {
        let end = (t + DASH).min(length);
        draw_line_segment_mut(
            sheet,
            (from.0 + ux * t, from.1 + uy * t),
            (from.0 + ux * end, from.1 + uy * end),
            GUIDE,
        );
        t += DASH + GAP;
    }
}
