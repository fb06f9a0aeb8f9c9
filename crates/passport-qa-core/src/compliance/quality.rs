//! Image quality rules.

use super::{Rule, RuleContext};
use crate::domain::{CheckId, ComplianceCheck, Exposure};

/// Relative aspect-ratio difference tolerated before a crop is needed.
const ASPECT_TOLERANCE: f64 = 0.05;

pub struct Dimensions;

impl Rule for Dimensions {
    fn id(&self) -> CheckId {
        CheckId::Dimensions
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let id = self.id();
        let metrics = &ctx.analysis.metrics;
        let (width, height) = (metrics.width, metrics.height);
        let (out_w, out_h) = ctx.requirement.output_pixels();
        let size = format!("{width}x{height} px (print needs {out_w}x{out_h} px)");

        if u64::from(width) * 2 < u64::from(out_w) || u64::from(height) * 2 < u64::from(out_h) {
            return ComplianceCheck::fail(id, format!("Resolution too low: {size}"));
        }
        if width < out_w || height < out_h {
            return ComplianceCheck::warn(id, format!("Resolution below print size: {size}"));
        }
        let target = ctx.requirement.aspect_ratio();
        if ((metrics.aspect_ratio - target) / target).abs() > ASPECT_TOLERANCE {
            return ComplianceCheck::warn(
                id,
                format!(
                    "Aspect ratio {:.2} differs from {target:.2}; photo will be cropped",
                    metrics.aspect_ratio
                ),
            );
        }
        ComplianceCheck::pass(id, size)
    }
}

pub struct Brightness;

impl Rule for Brightness {
    fn id(&self) -> CheckId {
        CheckId::Brightness
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let id = self.id();
        let metrics = &ctx.analysis.metrics;
        let (min, max) = (ctx.config.brightness_min, ctx.config.brightness_max);
        let message = format!(
            "Mean brightness {:.0} (accepted {min:.0}-{max:.0})",
            metrics.brightness
        );
        if !(min..=max).contains(&metrics.brightness) {
            return ComplianceCheck::fail(id, message);
        }
        match metrics.exposure {
            Exposure::ProperlyExposed => ComplianceCheck::pass(id, message),
            Exposure::Overexposed => ComplianceCheck::warn(id, format!("{message}; highlights clipped")),
            Exposure::Underexposed => ComplianceCheck::warn(id, format!("{message}; shadows crushed")),
        }
    }
}

pub struct Sharpness;

impl Rule for Sharpness {
    fn id(&self) -> CheckId {
        CheckId::Sharpness
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let id = self.id();
        let metrics = &ctx.analysis.metrics;
        if metrics.sharpness_is_unknown() {
            return ComplianceCheck::warn(id, "Sharpness could not be measured");
        }
        let min = ctx.config.sharpness_min;
        let message = format!("Sharpness {:.2} (minimum {min:.2})", metrics.sharpness);
        if metrics.sharpness >= min {
            ComplianceCheck::pass(id, message)
        } else {
            ComplianceCheck::fail(id, format!("Image is blurry: {message}"))
        }
    }
}

pub struct Contrast;

impl Rule for Contrast {
    fn id(&self) -> CheckId {
        CheckId::Contrast
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let id = self.id();
        let contrast = ctx.analysis.metrics.contrast;
        let min = ctx.config.contrast_min;
        let message = format!("Contrast {contrast:.2} (minimum {min:.2})");
        if contrast >= min {
            ComplianceCheck::pass(id, message)
        } else {
            ComplianceCheck::fail(id, message)
        }
    }
}

pub struct ColorPhoto;

impl Rule for ColorPhoto {
    fn id(&self) -> CheckId {
        CheckId::ColorPhoto
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let id = self.id();
        if ctx.analysis.metrics.is_grayscale {
            ComplianceCheck::fail(id, "Photo is black and white")
        } else {
            ComplianceCheck::pass(id, "Photo is in color")
        }
    }
}
