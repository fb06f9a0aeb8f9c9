//! Image source port for loading photos.

use crate::domain::ImageInfo;

/// Port for loading images from a source.
pub trait ImageSource: Send + Sync {
    /// Returns an iterator over decoded images.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if a file cannot be read or decoded.
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_>;

    /// Returns the number of images, if known up front.
    fn count_hint(&self) -> Option<usize>;
}
