//! Face presence, framing and pose rules.

use super::{Rule, RuleContext};
use crate::analysis::eye_tilt_degrees;
use crate::crop::estimate_eyes;
use crate::domain::{CheckId, ComplianceCheck, FaceGeometry};

fn detected_face<'a>(ctx: &RuleContext<'a>) -> Option<&'a FaceGeometry> {
    ctx.analysis.face.as_ref().filter(|face| face.detected)
}

pub struct FaceDetected;

impl Rule for FaceDetected {
    fn id(&self) -> CheckId {
        CheckId::FaceDetected
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let id = self.id();
        match detected_face(ctx) {
            None => ComplianceCheck::fail(id, "No face detected"),
            Some(face) if face.confidence < ctx.config.min_face_confidence => {
                ComplianceCheck::warn(
                    id,
                    format!("Face detected with low confidence ({:.0}%)", face.confidence * 100.0),
                )
            }
            Some(face) => ComplianceCheck::pass(
                id,
                format!("Face detected ({:.0}% confidence)", face.confidence * 100.0),
            ),
        }
    }
}

pub struct FaceCount;

impl Rule for FaceCount {
    fn id(&self) -> CheckId {
        CheckId::FaceCount
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let id = self.id();
        match detected_face(ctx).map(|face| face.count) {
            None => ComplianceCheck::fail(id, "No face to count"),
            Some(0) => ComplianceCheck::warn(id, "Detector did not report a face count"),
            Some(1) => ComplianceCheck::pass(id, "Exactly one face"),
            Some(n) => ComplianceCheck::fail(id, format!("{n} faces detected, expected one")),
        }
    }
}

/// Face box height against the standard's head range.
///
/// Uses the detector box as is. Cropping scales the box by
/// [`crate::crop::HEAD_TO_BOX_RATIO`] first, so the two do not agree on
/// exported photos.
pub struct HeadSize;

impl Rule for HeadSize {
    fn id(&self) -> CheckId {
        CheckId::HeadSize
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let id = self.id();
        let Some(face_box) = detected_face(ctx).and_then(FaceGeometry::usable_box) else {
            return ComplianceCheck::warn(id, "Head size not measurable without a face box");
        };
        let Some(frame) = ctx.frame else {
            return ComplianceCheck::warn(id, "Head size not measurable without image dimensions");
        };
        let percent = frame.height_percent(face_box.height);
        let range = ctx.requirement.head_height;
        let message = format!(
            "Head height {percent:.1}% of photo (required {:.0}-{:.0}%)",
            range.min, range.max
        );
        if range.contains(percent) {
            ComplianceCheck::pass(id, message)
        } else {
            ComplianceCheck::fail(id, message)
        }
    }
}

pub struct EyePosition;

impl Rule for EyePosition {
    fn id(&self) -> CheckId {
        CheckId::EyePosition
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let id = self.id();
        let face = detected_face(ctx);
        let Some(frame) = ctx.frame else {
            return ComplianceCheck::warn(id, "Eye line not measurable without image dimensions");
        };
        let range = ctx.requirement.eye_line;
        let describe = |percent: f64, source: &str| {
            format!(
                "Eye line {percent:.1}% from bottom{source} (required {:.0}-{:.0}%)",
                range.min, range.max
            )
        };

        if let Some((left, right)) = face.and_then(FaceGeometry::eyes) {
            let percent = frame.percent_from_bottom(left.midpoint(&right).y);
            let message = describe(percent, "");
            return if range.contains(percent) {
                ComplianceCheck::pass(id, message)
            } else {
                ComplianceCheck::fail(id, message)
            };
        }
        match face.and_then(FaceGeometry::usable_box) {
            Some(face_box) => {
                let (estimated, _) = estimate_eyes(&face_box);
                let percent = frame.percent_from_bottom(estimated.y);
                ComplianceCheck::warn(id, describe(percent, ", estimated without eye landmarks"))
            }
            None => ComplianceCheck::warn(id, "Eye line not measurable without face geometry"),
        }
    }
}

pub struct HeadRotation;

impl Rule for HeadRotation {
    fn id(&self) -> CheckId {
        CheckId::HeadRotation
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let id = self.id();
        let face = detected_face(ctx);
        let limit = ctx.config.max_rotation_degrees;

        if let Some(rotation) = face.and_then(|f| f.rotation) {
            let worst = rotation.max_abs();
            let message = format!(
                "Pitch {:.1}°, yaw {:.1}°, roll {:.1}° (limit ±{limit:.0}°)",
                rotation.pitch, rotation.yaw, rotation.roll
            );
            return if worst <= limit {
                ComplianceCheck::pass(id, message)
            } else {
                ComplianceCheck::fail(id, message)
            };
        }
        if let Some((left, right)) = face.and_then(FaceGeometry::eyes) {
            let tilt = eye_tilt_degrees(Some(left), Some(right));
            let tilt_limit = ctx.config.max_eye_tilt_degrees;
            let message = format!("Eye line tilted {tilt:.1}° (limit ±{tilt_limit:.0}°)");
            return if tilt.abs() <= tilt_limit {
                ComplianceCheck::pass(id, message)
            } else {
                ComplianceCheck::fail(id, message)
            };
        }
        ComplianceCheck::warn(id, "Head rotation unknown")
    }
}
