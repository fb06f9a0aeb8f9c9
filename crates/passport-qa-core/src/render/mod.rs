//! Output rendering: the single photo, the print sheet and the watermark.

mod glyphs;
mod photo;
mod sheet;

pub use glyphs::{apply_watermark, text_width, Watermark};
pub use photo::{render_photo, Adjustments, MIN_ZOOM};
pub use sheet::{layout_sheet, render_sheet, SheetLayout, SHEET_SIZE};
