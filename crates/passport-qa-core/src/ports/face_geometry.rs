//! Face geometry provider port.
//!
//! Detection itself happens outside this crate. A provider is an explicit
//! handle owned by the caller: it is initialized once, queried per image and
//! disposed when the batch ends.

use crate::domain::{FaceObservation, ImageInfo};

/// Port for obtaining face geometry and attributes for a photo.
pub trait FaceGeometryProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Prepares the provider. Calling it again on a ready provider is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be made ready.
    fn init(&mut self) -> anyhow::Result<()>;

    /// Whether [`init`](Self::init) succeeded and [`dispose`](Self::dispose)
    /// has not been called since.
    fn is_ready(&self) -> bool;

    /// Observes one image.
    ///
    /// A provider that finds nothing returns an observation without geometry
    /// rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is not ready or its input is unreadable.
    fn observe(&self, image: &ImageInfo) -> anyhow::Result<FaceObservation>;

    /// Releases resources. The provider may be initialized again afterwards.
    fn dispose(&mut self);
}
