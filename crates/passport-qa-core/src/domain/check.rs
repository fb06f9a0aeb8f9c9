//! Individual compliance checks and their aggregate verdict.

use serde::{Deserialize, Serialize};

/// Identifier of a compliance rule, in evaluation order.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    /// A face was found.
    FaceDetected,
    /// Exactly one face is present.
    FaceCount,
    /// Head height within the standard's range.
    HeadSize,
    /// Eye line within the standard's range.
    EyePosition,
    /// Head faces the camera.
    HeadRotation,
    /// Backdrop color is allowed.
    BackgroundColor,
    /// Backdrop is flat.
    BackgroundUniformity,
    /// No cut-out halo around the subject.
    BackgroundEdges,
    /// Enough pixels for a 300 dpi print.
    Dimensions,
    /// Mean brightness within the accepted window.
    Brightness,
    /// Image is in focus.
    Sharpness,
    /// Enough tonal separation.
    Contrast,
    /// Image is in color.
    ColorPhoto,
    /// Glasses policy.
    Glasses,
    /// Expression policy.
    Smile,
    /// Head covering policy.
    Headwear,
    /// Both eyes open.
    EyesOpen,
    /// Mouth closed.
    MouthClosed,
}

impl CheckId {
    /// Fixed severity of this rule.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::FaceDetected
            | Self::FaceCount
            | Self::HeadSize
            | Self::BackgroundColor
            | Self::Glasses
            | Self::EyesOpen => Severity::Critical,
            Self::EyePosition
            | Self::HeadRotation
            | Self::Dimensions
            | Self::Brightness
            | Self::Sharpness
            | Self::ColorPhoto
            | Self::Smile
            | Self::Headwear => Severity::Major,
            Self::BackgroundUniformity
            | Self::BackgroundEdges
            | Self::Contrast
            | Self::MouthClosed => Severity::Minor,
        }
    }

    /// Short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FaceDetected => "Face detected",
            Self::FaceCount => "Single face",
            Self::HeadSize => "Head size",
            Self::EyePosition => "Eye position",
            Self::HeadRotation => "Head rotation",
            Self::BackgroundColor => "Background color",
            Self::BackgroundUniformity => "Background uniformity",
            Self::BackgroundEdges => "Background edges",
            Self::Dimensions => "Image dimensions",
            Self::Brightness => "Brightness",
            Self::Sharpness => "Sharpness",
            Self::Contrast => "Contrast",
            Self::ColorPhoto => "Color photo",
            Self::Glasses => "Glasses",
            Self::Smile => "Expression",
            Self::Headwear => "Headwear",
            Self::EyesOpen => "Eyes open",
            Self::MouthClosed => "Mouth closed",
        }
    }

    /// Remediation advice shown when this rule does not pass.
    #[must_use]
    pub const fn remedy(self) -> &'static str {
        match self {
            Self::FaceDetected => "Use a clear, front-facing photo of one person.",
            Self::FaceCount => "Make sure only one person is in the frame.",
            Self::HeadSize => "Move closer or further away so the head fills the required height.",
            Self::EyePosition => "Reframe the photo so the eyes sit at the required height.",
            Self::HeadRotation => "Face the camera directly and keep the head level.",
            Self::BackgroundColor => "Stand in front of a plain backdrop of the required color.",
            Self::BackgroundUniformity => "Remove shadows and patterns from the backdrop.",
            Self::BackgroundEdges => "Retake against a real backdrop or redo the background cut-out.",
            Self::Dimensions => "Use a higher-resolution photo.",
            Self::Brightness => "Adjust the lighting so the face is evenly lit.",
            Self::Sharpness => "Hold the camera steady and make sure the face is in focus.",
            Self::Contrast => "Improve the lighting to separate the face from the backdrop.",
            Self::ColorPhoto => "Submit a color photo.",
            Self::Glasses => "Remove your glasses.",
            Self::Smile => "Keep a neutral expression.",
            Self::Headwear => "Remove hats and head coverings unless worn for religious reasons.",
            Self::EyesOpen => "Keep both eyes open and visible.",
            Self::MouthClosed => "Keep your mouth closed.",
        }
    }
}

/// Outcome of a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Rule satisfied.
    Pass,
    /// Rule could not be fully verified or is borderline.
    Warn,
    /// Rule violated.
    Fail,
}

/// Impact of a failed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks compliance.
    Critical,
    /// Lowers the score noticeably.
    Major,
    /// Cosmetic.
    Minor,
}

impl Severity {
    /// Scoring weight.
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::Critical => 3,
            Self::Major => 2,
            Self::Minor => 1,
        }
    }
}

/// One evaluated rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    /// Rule identifier.
    pub id: CheckId,
    /// Display label.
    pub label: String,
    /// Outcome.
    pub status: CheckStatus,
    /// Fixed severity of the rule.
    pub severity: Severity,
    /// Human-readable explanation of the outcome.
    pub message: String,
}

impl ComplianceCheck {
    /// Builds a check with the rule's fixed label and severity.
    #[must_use]
    pub fn new(id: CheckId, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            id,
            label: id.label().to_string(),
            status,
            severity: id.severity(),
            message: message.into(),
        }
    }

    /// A passing check.
    #[must_use]
    pub fn pass(id: CheckId, message: impl Into<String>) -> Self {
        Self::new(id, CheckStatus::Pass, message)
    }

    /// A warning check.
    #[must_use]
    pub fn warn(id: CheckId, message: impl Into<String>) -> Self {
        Self::new(id, CheckStatus::Warn, message)
    }

    /// A failing check.
    #[must_use]
    pub fn fail(id: CheckId, message: impl Into<String>) -> Self {
        Self::new(id, CheckStatus::Fail, message)
    }

    /// Whether this is a failed critical rule.
    #[must_use]
    pub fn is_critical_failure(&self) -> bool {
        self.status == CheckStatus::Fail && self.severity == Severity::Critical
    }
}

/// Aggregated verdict of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    /// True iff no critical rule failed.
    pub is_compliant: bool,
    /// Advisory weighted score (0-100).
    pub overall_score: u8,
    /// Critical rules that failed.
    pub critical_failures: Vec<CheckId>,
    /// Number of passing checks.
    pub passed_count: usize,
    /// Number of failing checks.
    pub failed_count: usize,
    /// Number of warning checks.
    pub warning_count: usize,
    /// Remediation advice, one per failing or warning check, in check order.
    pub recommendations: Vec<String>,
    /// Every evaluated check, in evaluation order.
    pub checks: Vec<ComplianceCheck>,
}
