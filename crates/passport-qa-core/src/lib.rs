//! Passport QA Core - identity photo compliance and layout
//!
//! This crate contains the requirement registry, the pixel analyzer, the
//! compliance checker, crop geometry and output rendering. It performs no I/O;
//! adapters implement the traits in [`ports`].

pub mod analysis;
pub mod compliance;
pub mod crop;
pub mod domain;
pub mod ports;
pub mod render;

pub use analysis::{AnalyzerConfig, ImageAnalyzer};
pub use compliance::{ComplianceChecker, ComplianceConfig, Rule, RuleContext};
pub use crop::{calculate_crop, CropParams, OutputFrame};
pub use domain::{
    registry, CheckId, CheckStatus, ComplianceCheck, ComplianceReport, ComplianceResult,
    FaceAttributes, FaceGeometry, FaceObservation, ImageAnalysis, ImageDimensions, ImageInfo,
    Requirement, StandardCode,
};
pub use ports::{
    ExportSink, FaceGeometryProvider, ImageSource, ProgressEvent, ProgressSink, ResultOutput,
};
pub use render::{render_photo, render_sheet, Adjustments, SheetLayout, Watermark};
