//! Face provider that reads detector output saved next to each photo.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use passport_qa_core::{FaceGeometryProvider, FaceObservation, ImageInfo};
use tracing::{debug, info};

use crate::detectors::{parse_observation, DetectorFormat};

/// Suffix appended to the photo's file stem.
pub const SIDECAR_SUFFIX: &str = ".face.json";

/// Reads `<stem>.face.json` for every photo.
///
/// The file is looked up in the faces directory when one is configured,
/// otherwise next to the photo. A missing file yields an observation without
/// geometry, which the checker reports as "no face".
///
/// Lookup keys on the stem only: `anna.jpg` and `anna.png` in one directory
/// share `anna.face.json`.
#[derive(Debug, Clone)]
pub struct SidecarFaceProvider {
    faces_dir: Option<PathBuf>,
    format: Option<DetectorFormat>,
    ready: bool,
}

impl SidecarFaceProvider {
    /// Creates a provider. `format` forces a detector format; `None` auto-detects.
    #[must_use]
    pub const fn new(faces_dir: Option<PathBuf>, format: Option<DetectorFormat>) -> Self {
        Self {
            faces_dir,
            format,
            ready: false,
        }
    }

    /// Where the sidecar for `image_path` is expected.
    #[must_use]
    pub fn sidecar_path(&self, image_path: &Path) -> PathBuf {
        let stem = image_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = format!("{stem}{SIDECAR_SUFFIX}");
        match &self.faces_dir {
            Some(dir) => dir.join(name),
            None => image_path.with_file_name(name),
        }
    }
}

impl FaceGeometryProvider for SidecarFaceProvider {
    fn name(&self) -> &str {
        "sidecar"
    }

    fn init(&mut self) -> Result<()> {
        if self.ready {
            return Ok(());
        }
        if let Some(dir) = &self.faces_dir {
            if !dir.is_dir() {
                bail!("faces directory not found: {}", dir.display());
            }
        }
        self.ready = true;
        info!(faces_dir = ?self.faces_dir, "sidecar face provider ready");
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn observe(&self, image: &ImageInfo) -> Result<FaceObservation> {
        if !self.ready {
            bail!("face provider used before init");
        }
        let path = self.sidecar_path(Path::new(&image.path));
        if !path.is_file() {
            debug!(path = %path.display(), "no face data");
            return Ok(FaceObservation::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read face data: {}", path.display()))?;
        parse_observation(&text, self.format, image.width, image.height)
            .with_context(|| format!("Failed to parse face data: {}", path.display()))
    }

    fn dispose(&mut self) {
        self.ready = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_path() {
        let provider = SidecarFaceProvider::new(None, None);
        assert_eq!(
            provider.sidecar_path(Path::new("/photos/anna.jpg")),
            PathBuf::from("/photos/anna.face.json")
        );
        let provider = SidecarFaceProvider::new(Some(PathBuf::from("/faces")), None);
        assert_eq!(
            provider.sidecar_path(Path::new("/photos/anna.jpg")),
            PathBuf::from("/faces/anna.face.json")
        );
        // extension is not part of the key
        assert_eq!(
            provider.sidecar_path(Path::new("/photos/anna.png")),
            provider.sidecar_path(Path::new("/photos/anna.jpg"))
        );
    }

    #[test]
    fn test_lifecycle() {
        let mut provider = SidecarFaceProvider::new(None, None);
        assert!(!provider.is_ready());
        let image = ImageInfo::new("/nowhere/x.png", image::DynamicImage::new_rgb8(4, 4));
        assert!(provider.observe(&image).is_err());

        provider.init().unwrap();
        provider.init().unwrap();
        assert!(provider.is_ready());
        assert!(provider.observe(&image).unwrap().geometry.is_none());

        provider.dispose();
        assert!(!provider.is_ready());
    }

    #[test]
    fn test_missing_faces_dir_fails_init() {
        let mut provider =
            SidecarFaceProvider::new(Some(PathBuf::from("/definitely/not/here")), None);
        assert!(provider.init().is_err());
        assert!(!provider.is_ready());
    }
}
