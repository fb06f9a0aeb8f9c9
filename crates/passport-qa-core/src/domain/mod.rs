//! Core domain types for identity-photo compliance.

mod analysis;
mod check;
mod color;
mod face;
pub mod registry;
mod requirement;
mod result;

pub use analysis::{
    aspect_ratio, Exposure, HaloReport, ImageAnalysis, QualityMetrics, SHARPNESS_UNKNOWN,
};
pub use check::{CheckId, CheckStatus, ComplianceCheck, ComplianceResult, Severity};
pub use color::HexColor;
pub use face::{
    BoundingBox, FaceAttributes, FaceGeometry, FaceObservation, Landmarks, Point, Rotation,
};
pub use requirement::{
    BackgroundSpec, PercentRange, PhysicalSize, PolicyFlags, Requirement, StandardCode, Unit,
    PRINT_DPI,
};
pub use result::{ComplianceReport, ImageDimensions, ImageInfo};
