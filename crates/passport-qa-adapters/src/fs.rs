//! Filesystem adapter for loading photos.

use anyhow::{Context, Result};
use passport_qa_core::{ImageInfo, ImageSource};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions the decoder is built with.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif"];

/// Photos named on the command line, directories expanded.
///
/// Directory entries are visited in name order so batch output is stable.
/// Paths that do not exist or are not images are reported and skipped.
pub struct FsImageSource {
    roots: Vec<PathBuf>,
    recursive: bool,
}

impl FsImageSource {
    /// Creates a source over `roots`, descending into subdirectories when
    /// `recursive` is set.
    #[must_use]
    pub const fn new(roots: Vec<PathBuf>, recursive: bool) -> Self {
        Self { roots, recursive }
    }

    fn photo_paths(&self) -> Vec<PathBuf> {
        let mut photos = Vec::new();
        for root in &self.roots {
            match std::fs::metadata(root) {
                Ok(meta) if meta.is_dir() => self.walk(root, &mut photos),
                Ok(_) if is_supported_image(root) => photos.push(root.clone()),
                Ok(_) => warn!("Unsupported file type: {}", root.display()),
                Err(_) => warn!("Path does not exist: {}", root.display()),
            }
        }
        photos
    }

    fn walk(&self, dir: &Path, photos: &mut Vec<PathBuf>) {
        let mut entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
            Ok(read) => read.filter_map(|entry| entry.ok().map(|e| e.path())).collect(),
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };
        entries.sort();

        for path in entries {
            if path.is_dir() {
                if self.recursive {
                    self.walk(&path, photos);
                }
            } else if is_supported_image(&path) {
                photos.push(path);
            } else {
                debug!(path = %path.display(), "ignoring non-image file");
            }
        }
    }
}

impl ImageSource for FsImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo>> + Send + '_> {
        let photos = self.photo_paths();
        debug!(count = photos.len(), "collected photos");
        Box::new(photos.into_iter().map(|path| load_image(&path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.photo_paths().len())
    }
}

/// Checks if a path has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Loads and decodes one photo.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> Result<ImageInfo> {
    let image =
        image::open(path).with_context(|| format!("Failed to open image: {}", path.display()))?;
    Ok(ImageInfo::new(path.to_string_lossy(), image))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("portrait.jpg")));
        assert!(is_supported_image(Path::new("portrait.JPEG")));
        assert!(is_supported_image(Path::new("portrait.png")));
        assert!(is_supported_image(Path::new("scan.TIF")));
        assert!(!is_supported_image(Path::new("portrait.face.json")));
        assert!(!is_supported_image(Path::new("portrait.cr2")));
        assert!(!is_supported_image(Path::new("portrait")));
    }
}
