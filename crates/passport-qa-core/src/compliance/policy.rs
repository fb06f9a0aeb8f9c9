//! Appearance rules driven by externally classified attributes.

use super::{Rule, RuleContext};
use crate::domain::{CheckId, ComplianceCheck, FaceAttributes, PolicyFlags};

/// One attribute rule: which attribute it reads, which value is acceptable,
/// and which policy flag (if any) lifts it.
pub struct AttributeRule {
    id: CheckId,
    read: fn(&FaceAttributes) -> Option<bool>,
    acceptable: bool,
    allowed_by: Option<fn(&PolicyFlags) -> bool>,
    ok: &'static str,
    violated: &'static str,
}

const fn glasses(a: &FaceAttributes) -> Option<bool> {
    a.glasses
}

const fn smile(a: &FaceAttributes) -> Option<bool> {
    a.smile
}

const fn headwear(a: &FaceAttributes) -> Option<bool> {
    a.headwear
}

const fn eyes_open(a: &FaceAttributes) -> Option<bool> {
    a.eyes_open
}

const fn mouth_closed(a: &FaceAttributes) -> Option<bool> {
    a.mouth_closed
}

const fn allow_glasses(p: &PolicyFlags) -> bool {
    p.allow_glasses
}

const fn allow_smile(p: &PolicyFlags) -> bool {
    p.allow_smile
}

const fn allow_headwear(p: &PolicyFlags) -> bool {
    p.allow_headwear
}

impl AttributeRule {
    pub const GLASSES: Self = Self {
        id: CheckId::Glasses,
        read: glasses,
        acceptable: false,
        allowed_by: Some(allow_glasses),
        ok: "No glasses",
        violated: "Glasses detected",
    };

    pub const SMILE: Self = Self {
        id: CheckId::Smile,
        read: smile,
        acceptable: false,
        allowed_by: Some(allow_smile),
        ok: "Neutral expression",
        violated: "Smile detected",
    };

    pub const HEADWEAR: Self = Self {
        id: CheckId::Headwear,
        read: headwear,
        acceptable: false,
        allowed_by: Some(allow_headwear),
        ok: "No headwear",
        violated: "Headwear detected",
    };

    pub const EYES_OPEN: Self = Self {
        id: CheckId::EyesOpen,
        read: eyes_open,
        acceptable: true,
        allowed_by: None,
        ok: "Eyes open",
        violated: "Eyes closed",
    };

    pub const MOUTH_CLOSED: Self = Self {
        id: CheckId::MouthClosed,
        read: mouth_closed,
        acceptable: true,
        allowed_by: None,
        ok: "Mouth closed",
        violated: "Mouth open",
    };
}

impl Rule for AttributeRule {
    fn id(&self) -> CheckId {
        self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> ComplianceCheck {
        let label = self.id.label();
        if self
            .allowed_by
            .is_some_and(|allowed| allowed(&ctx.requirement.policy))
        {
            return ComplianceCheck::pass(
                self.id,
                format!("{label} permitted for {}", ctx.requirement.code),
            );
        }
        match (self.read)(&ctx.analysis.attributes) {
            Some(value) if value == self.acceptable => ComplianceCheck::pass(self.id, self.ok),
            Some(_) => ComplianceCheck::fail(self.id, self.violated),
            None => ComplianceCheck::warn(self.id, format!("{label} not assessed")),
        }
    }
}
