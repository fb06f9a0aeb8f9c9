//! Backdrop rules.

use super::{Rule, RuleContext};
use crate::domain::{CheckId, ComplianceCheck};

pub struct BackgroundColor;

impl Rule for BackgroundColor {
    fn id(&self) -> CheckId {
        CheckId::BackgroundColor
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let id = self.id();
        let Some(color) = ctx.analysis.metrics.background_color else {
            return ComplianceCheck::warn(id, "Background color unknown");
        };
        let spec = &ctx.requirement.background;
        match spec.nearest(&color) {
            Some((allowed, distance)) if distance <= spec.tolerance => ComplianceCheck::pass(
                id,
                format!("Background {color} matches {allowed}"),
            ),
            Some((allowed, distance)) => ComplianceCheck::fail(
                id,
                format!(
                    "Background {color} is {distance:.0} away from nearest allowed {allowed} (tolerance {:.0})",
                    spec.tolerance
                ),
            ),
            None => ComplianceCheck::warn(id, "No background colors defined"),
        }
    }
}

pub struct BackgroundUniformity;

impl Rule for BackgroundUniformity {
    fn id(&self) -> CheckId {
        CheckId::BackgroundUniformity
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let id = self.id();
        let metrics = &ctx.analysis.metrics;
        if metrics.background_color.is_none() {
            return ComplianceCheck::warn(id, "Background uniformity unknown");
        }
        let threshold = ctx.requirement.background.uniformity_threshold;
        let message = format!(
            "Uniformity {:.0}% (required {:.0}%)",
            metrics.background_uniformity * 100.0,
            threshold * 100.0
        );
        if metrics.background_uniformity >= threshold {
            ComplianceCheck::pass(id, message)
        } else {
            ComplianceCheck::fail(id, message)
        }
    }
}

pub struct BackgroundEdges;

impl Rule for BackgroundEdges {
    fn id(&self) -> CheckId {
        CheckId::BackgroundEdges
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let id = self.id();
        let halo = &ctx.analysis.metrics.halo;
        let message = format!("Edge quality {:.0}/100", halo.edge_quality);
        if halo.has_halo_artifacts {
            ComplianceCheck::fail(id, format!("Halo around subject; {message}"))
        } else {
            ComplianceCheck::pass(id, message)
        }
    }
}
