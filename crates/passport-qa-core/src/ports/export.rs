//! Export port for rendered rasters.

use image::RgbaImage;

/// Port for persisting rendered photos and sheets.
pub trait ExportSink: Send + Sync {
    /// Stores `image` under `name` (without extension) and returns where it went.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be encoded or written.
    fn write(&self, name: &str, image: &RgbaImage) -> anyhow::Result<String>;
}
