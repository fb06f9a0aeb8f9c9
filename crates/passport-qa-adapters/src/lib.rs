//! Passport QA Adapters - external adapters for passport-qa.
//!
//! This crate provides adapters for:
//! - Filesystem image source
//! - Face-detector output (sidecar JSON files, several detector formats)
//! - PNG export

pub mod detectors;
pub mod export;
pub mod fs;
pub mod sidecar;

pub use detectors::{parse_observation, DetectorFormat};
pub use export::PngExportSink;
pub use fs::{load_image, FsImageSource};
pub use sidecar::{SidecarFaceProvider, SIDECAR_SUFFIX};
