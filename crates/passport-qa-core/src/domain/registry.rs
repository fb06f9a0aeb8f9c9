//! The requirement registry: one immutable row per supported standard.

use super::requirement::{
    BackgroundSpec, PercentRange, PhysicalSize, PolicyFlags, Requirement, StandardCode,
};
use super::HexColor;

const WHITE_ONLY: &[HexColor] = &[HexColor::WHITE];

const WHITE_OR_OFF_WHITE: &[HexColor] = &[HexColor::WHITE, HexColor::new(0xF5, 0xF5, 0xF5)];

const LIGHT_GREY: &[HexColor] = &[
    HexColor::new(0xD3, 0xD3, 0xD3),
    HexColor::new(0xDC, 0xDC, 0xDC),
    HexColor::new(0xE5, 0xE5, 0xE5),
];

const WHITE_TO_LIGHT_GREY: &[HexColor] = &[
    HexColor::WHITE,
    HexColor::new(0xF0, 0xF0, 0xF0),
    HexColor::new(0xE5, 0xE5, 0xE5),
];

const STRICT: PolicyFlags = PolicyFlags {
    allow_glasses: false,
    allow_smile: false,
    allow_headwear: false,
};

static REQUIREMENTS: [Requirement; 8] = [
    Requirement {
        code: StandardCode::Us,
        name: "United States passport",
        physical_size: PhysicalSize::inches(2.0, 2.0),
        head_height: PercentRange::new(50.0, 69.0),
        eye_line: PercentRange::new(56.0, 69.0),
        background: BackgroundSpec {
            allowed_colors: WHITE_ONLY,
            tolerance: 24.0,
            uniformity_threshold: 0.85,
        },
        policy: PolicyFlags {
            allow_smile: true,
            ..STRICT
        },
    },
    Requirement {
        code: StandardCode::Uk,
        name: "United Kingdom passport",
        physical_size: PhysicalSize::millimeters(35.0, 45.0),
        head_height: PercentRange::new(64.0, 76.0),
        eye_line: PercentRange::new(55.0, 68.0),
        background: BackgroundSpec {
            allowed_colors: LIGHT_GREY,
            tolerance: 20.0,
            uniformity_threshold: 0.85,
        },
        policy: STRICT,
    },
    Requirement {
        code: StandardCode::Eu,
        name: "Schengen biometric passport",
        physical_size: PhysicalSize::millimeters(35.0, 45.0),
        head_height: PercentRange::new(71.0, 80.0),
        eye_line: PercentRange::new(60.0, 70.0),
        background: BackgroundSpec {
            allowed_colors: WHITE_TO_LIGHT_GREY,
            tolerance: 20.0,
            uniformity_threshold: 0.85,
        },
        policy: PolicyFlags {
            allow_glasses: true,
            ..STRICT
        },
    },
    Requirement {
        code: StandardCode::Ca,
        name: "Canada passport",
        physical_size: PhysicalSize::millimeters(50.0, 70.0),
        head_height: PercentRange::new(44.0, 51.0),
        eye_line: PercentRange::new(55.0, 65.0),
        background: BackgroundSpec {
            allowed_colors: WHITE_OR_OFF_WHITE,
            tolerance: 24.0,
            uniformity_threshold: 0.8,
        },
        policy: PolicyFlags {
            allow_glasses: true,
            ..STRICT
        },
    },
    Requirement {
        code: StandardCode::In,
        name: "India passport",
        physical_size: PhysicalSize::inches(2.0, 2.0),
        head_height: PercentRange::new(50.0, 69.0),
        eye_line: PercentRange::new(56.0, 69.0),
        background: BackgroundSpec {
            allowed_colors: WHITE_ONLY,
            tolerance: 24.0,
            uniformity_threshold: 0.85,
        },
        policy: STRICT,
    },
    Requirement {
        code: StandardCode::Cn,
        name: "China passport and visa",
        physical_size: PhysicalSize::millimeters(33.0, 48.0),
        head_height: PercentRange::new(58.0, 69.0),
        eye_line: PercentRange::new(56.0, 68.0),
        background: BackgroundSpec {
            allowed_colors: WHITE_OR_OFF_WHITE,
            tolerance: 20.0,
            uniformity_threshold: 0.85,
        },
        policy: STRICT,
    },
    Requirement {
        code: StandardCode::Au,
        name: "Australia passport",
        physical_size: PhysicalSize::millimeters(35.0, 45.0),
        head_height: PercentRange::new(71.0, 80.0),
        eye_line: PercentRange::new(58.0, 70.0),
        background: BackgroundSpec {
            allowed_colors: WHITE_TO_LIGHT_GREY,
            tolerance: 24.0,
            uniformity_threshold: 0.8,
        },
        policy: PolicyFlags {
            allow_glasses: true,
            ..STRICT
        },
    },
    Requirement {
        code: StandardCode::Jp,
        name: "Japan passport",
        physical_size: PhysicalSize::millimeters(35.0, 45.0),
        head_height: PercentRange::new(71.0, 80.0),
        eye_line: PercentRange::new(58.0, 70.0),
        background: BackgroundSpec {
            allowed_colors: WHITE_TO_LIGHT_GREY,
            tolerance: 24.0,
            uniformity_threshold: 0.85,
        },
        policy: STRICT,
    },
];

/// Returns the requirement for `code`.
///
/// The code set is closed, so lookup cannot fail.
#[must_use]
pub fn get(code: StandardCode) -> &'static Requirement {
    let requirement = match code {
        StandardCode::Us => &REQUIREMENTS[0],
        StandardCode::Uk => &REQUIREMENTS[1],
        StandardCode::Eu => &REQUIREMENTS[2],
        StandardCode::Ca => &REQUIREMENTS[3],
        StandardCode::In => &REQUIREMENTS[4],
        StandardCode::Cn => &REQUIREMENTS[5],
        StandardCode::Au => &REQUIREMENTS[6],
        StandardCode::Jp => &REQUIREMENTS[7],
    };
    debug_assert_eq!(requirement.code, code, "registry row out of order");
    requirement
}

/// Returns every registered requirement.
#[must_use]
pub fn list() -> &'static [Requirement] {
    &REQUIREMENTS
}
