//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external adapters.

mod export;
mod face_geometry;
mod image_source;
mod progress;
mod result_output;

pub use export::ExportSink;
pub use face_geometry::FaceGeometryProvider;
pub use image_source::ImageSource;
pub use progress::{ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;
