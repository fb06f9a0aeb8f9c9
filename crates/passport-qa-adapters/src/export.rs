//! PNG writer for rendered photos and sheets.

use std::path::PathBuf;

use anyhow::{Context, Result};
use image::RgbaImage;
use passport_qa_core::ExportSink;
use tracing::info;

/// Writes rasters as `<dir>/<name>.png`.
#[derive(Debug, Clone)]
pub struct PngExportSink {
    dir: PathBuf,
}

impl PngExportSink {
    /// Creates a sink writing into `dir`, which is created on first write.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl ExportSink for PngExportSink {
    fn write(&self, name: &str, image: &RgbaImage) -> Result<String> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.dir.join(format!("{name}.png"));
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), width = image.width(), height = image.height(), "exported");
        Ok(path.to_string_lossy().into_owned())
    }
}
