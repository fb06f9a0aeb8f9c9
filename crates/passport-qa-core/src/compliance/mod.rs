//! Compliance verification against one national standard.
//!
//! Each rule is an independent [`Rule`] that looks at the analysis and
//! produces exactly one check. The checker runs every rule in a fixed order
//! without short-circuiting and folds the checks into a scored verdict.

mod background;
mod face;
mod policy;
mod quality;
mod scoring;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use scoring::{overall_score, summarize};

use crate::crop::OutputFrame;
use crate::domain::{CheckId, ComplianceCheck, ComplianceResult, ImageAnalysis, Requirement};

/// Thresholds of the image-quality and pose rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    /// Lowest acceptable mean luminance.
    pub brightness_min: f64,
    /// Highest acceptable mean luminance.
    pub brightness_max: f64,
    /// Lowest acceptable normalized sharpness.
    pub sharpness_min: f64,
    /// Lowest acceptable normalized contrast.
    pub contrast_min: f64,
    /// Largest acceptable pitch, yaw or roll in degrees.
    pub max_rotation_degrees: f64,
    /// Largest acceptable eye-line tilt in degrees.
    pub max_eye_tilt_degrees: f64,
    /// Detector confidence below which a face only warns.
    pub min_face_confidence: f64,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            brightness_min: 60.0,
            brightness_max: 235.0,
            sharpness_min: 0.08,
            contrast_min: 0.12,
            max_rotation_degrees: 15.0,
            max_eye_tilt_degrees: 8.0,
            min_face_confidence: 0.5,
        }
    }
}

impl ComplianceConfig {
    /// Checks that every threshold is usable.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid threshold.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=255.0).contains(&self.brightness_min)
            || !(0.0..=255.0).contains(&self.brightness_max)
            || self.brightness_min >= self.brightness_max
        {
            return Err(format!(
                "brightness window [{}, {}] must be increasing within 0-255",
                self.brightness_min, self.brightness_max
            ));
        }
        for (name, value) in [
            ("sharpness_min", self.sharpness_min),
            ("contrast_min", self.contrast_min),
            ("min_face_confidence", self.min_face_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be 0.0-1.0, got {value}"));
            }
        }
        if self.max_rotation_degrees <= 0.0 || self.max_eye_tilt_degrees <= 0.0 {
            return Err("rotation and tilt limits must be positive".to_string());
        }
        Ok(())
    }
}

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The measured image and detector output.
    pub analysis: &'a ImageAnalysis,
    /// The standard being checked.
    pub requirement: &'a Requirement,
    /// Rule thresholds.
    pub config: &'a ComplianceConfig,
    /// Output frame of the analyzed image, absent for a zero-size image.
    pub frame: Option<OutputFrame>,
}

/// A single compliance rule.
pub trait Rule: Send + Sync {
    /// The check this rule produces.
    fn id(&self) -> CheckId;

    /// Evaluates the rule. Never fails: missing inputs become a `warn`.
    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck;
}

/// Every rule, in evaluation order.
fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(face::FaceDetected),
        Box::new(face::FaceCount),
        Box::new(face::HeadSize),
        Box::new(face::EyePosition),
        Box::new(face::HeadRotation),
        Box::new(background::BackgroundColor),
        Box::new(background::BackgroundUniformity),
        Box::new(background::BackgroundEdges),
        Box::new(quality::Dimensions),
        Box::new(quality::Brightness),
        Box::new(quality::Sharpness),
        Box::new(quality::Contrast),
        Box::new(quality::ColorPhoto),
        Box::new(policy::AttributeRule::GLASSES),
        Box::new(policy::AttributeRule::SMILE),
        Box::new(policy::AttributeRule::HEADWEAR),
        Box::new(policy::AttributeRule::EYES_OPEN),
        Box::new(policy::AttributeRule::MOUTH_CLOSED),
    ]
}

/// Verifies analyses against one requirement.
pub struct ComplianceChecker {
    requirement: &'static Requirement,
    config: ComplianceConfig,
    rules: Vec<Box<dyn Rule>>,
}

impl ComplianceChecker {
    /// Creates a checker for `requirement`.
    #[must_use]
    pub fn new(requirement: &'static Requirement, config: ComplianceConfig) -> Self {
        Self {
            requirement,
            config,
            rules: default_rules(),
        }
    }

    /// The requirement this checker verifies against.
    #[must_use]
    pub const fn requirement(&self) -> &'static Requirement {
        self.requirement
    }

    /// Rule ids in evaluation order.
    #[must_use]
    pub fn rule_ids(&self) -> Vec<CheckId> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    /// Runs every rule and aggregates the verdict. Pure and idempotent.
    #[must_use]
    pub fn verify(&self, analysis: &ImageAnalysis) -> ComplianceResult {
        let ctx = RuleContext {
            analysis,
            requirement: self.requirement,
            config: &self.config,
            frame: OutputFrame::centered(
                analysis.metrics.width,
                analysis.metrics.height,
                self.requirement,
            ),
        };
        let checks: Vec<ComplianceCheck> = self
            .rules
            .iter()
            .map(|rule| {
                let check = rule.evaluate(&ctx);
                debug_assert_eq!(check.id, rule.id(), "rule produced a foreign check");
                check
            })
            .collect();
        let result = summarize(checks);
        debug!(
            code = %self.requirement.code,
            compliant = result.is_compliant,
            score = result.overall_score,
            failed = result.failed_count,
            warnings = result.warning_count,
            "verified analysis"
        );
        result
    }
}

impl std::fmt::Debug for ComplianceChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplianceChecker")
            .field("requirement", &self.requirement.code)
            .field("config", &self.config)
            .field("rules", &self.rule_ids())
            .finish()
    }
}
