//! Identity-photo requirements for each supported national standard.
//!
//! Requirements are `'static` rows of the registry. Every percentage is
//! relative to the height of the *output* photo, never the source image.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::HexColor;

/// Print resolution used to derive output raster sizes.
pub const PRINT_DPI: f64 = 300.0;

/// Millimetres per inch.
const MM_PER_INCH: f64 = 25.4;

/// Closed set of supported photo standards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandardCode {
    /// United States passport and visa (2×2 in).
    Us,
    /// United Kingdom passport (35×45 mm, light grey backdrop).
    Uk,
    /// Schengen / EU biometric passport (35×45 mm).
    Eu,
    /// Canada passport (50×70 mm).
    Ca,
    /// India passport (2×2 in).
    In,
    /// China passport and visa (33×48 mm).
    Cn,
    /// Australia passport (35×45 mm).
    Au,
    /// Japan passport (35×45 mm).
    Jp,
}

impl StandardCode {
    /// All codes in registry order.
    pub const ALL: [Self; 8] = [
        Self::Us,
        Self::Uk,
        Self::Eu,
        Self::Ca,
        Self::In,
        Self::Cn,
        Self::Au,
        Self::Jp,
    ];

    /// Lower-case code as used on the command line and in JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Uk => "uk",
            Self::Eu => "eu",
            Self::Ca => "ca",
            Self::In => "in",
            Self::Cn => "cn",
            Self::Au => "au",
            Self::Jp => "jp",
        }
    }
}

impl fmt::Display for StandardCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StandardCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        let needle = match needle.as_str() {
            "gb" => "uk",
            "schengen" => "eu",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == needle)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown standard '{s}', expected one of: {}", valid.join(", "))
            })
    }
}

/// Physical unit of a print size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Inches.
    Inch,
    /// Millimetres.
    Millimeter,
}

/// Physical size of the printed photo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhysicalSize {
    /// Width in `unit`.
    pub width: f64,
    /// Height in `unit`.
    pub height: f64,
    /// Unit of `width` and `height`.
    pub unit: Unit,
}

impl PhysicalSize {
    /// Size in inches.
    #[must_use]
    pub const fn inches(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            unit: Unit::Inch,
        }
    }

    /// Size in millimetres.
    #[must_use]
    pub const fn millimeters(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            unit: Unit::Millimeter,
        }
    }

    /// Raster size in pixels at [`PRINT_DPI`].
    #[must_use]
    pub fn to_pixels(&self) -> (u32, u32) {
        (self.axis_to_pixels(self.width), self.axis_to_pixels(self.height))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn axis_to_pixels(&self, value: f64) -> u32 {
        let inches = match self.unit {
            Unit::Inch => value,
            Unit::Millimeter => value / MM_PER_INCH,
        };
        (inches * PRINT_DPI).round().max(1.0) as u32
    }
}

/// A `[min, max]` percentage range of output height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentRange {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
}

impl PercentRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Midpoint of the range, in percent.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Whether `value` lies inside the range (inclusive).
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Allowed backdrop colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackgroundSpec {
    /// Accepted backdrop colors.
    pub allowed_colors: &'static [HexColor],
    /// Maximum RGB distance from the nearest allowed color.
    pub tolerance: f64,
    /// Minimum corner-sample uniformity (0.0-1.0).
    pub uniformity_threshold: f64,
}

impl BackgroundSpec {
    /// Nearest allowed color and its distance to `color`.
    #[must_use]
    pub fn nearest(&self, color: &HexColor) -> Option<(HexColor, f64)> {
        self.allowed_colors
            .iter()
            .map(|allowed| (*allowed, allowed.distance(color)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Boolean appearance policies.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicyFlags {
    /// Glasses may be worn.
    pub allow_glasses: bool,
    /// A natural smile is acceptable.
    pub allow_smile: bool,
    /// Head coverings are acceptable.
    pub allow_headwear: bool,
}

/// The photo specification of one national standard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Requirement {
    /// Standard code.
    pub code: StandardCode,
    /// Human-readable name.
    pub name: &'static str,
    /// Printed size.
    pub physical_size: PhysicalSize,
    /// Head height (crown to chin) as percent of output height.
    pub head_height: PercentRange,
    /// Eye line as percent distance from the bottom edge.
    pub eye_line: PercentRange,
    /// Backdrop rules.
    pub background: BackgroundSpec,
    /// Appearance policies.
    pub policy: PolicyFlags,
}

impl Requirement {
    /// Output raster size in pixels at 300 dpi.
    #[must_use]
    pub fn output_pixels(&self) -> (u32, u32) {
        self.physical_size.to_pixels()
    }

    /// Output aspect ratio (width / height).
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.physical_size.width / self.physical_size.height
    }

    /// Checks the structural invariants of this row.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        let ranges = [("head_height", self.head_height), ("eye_line", self.eye_line)];
        for (name, range) in ranges {
            if range.min >= range.max {
                return Err(format!("{}: {name} min must be below max", self.code));
            }
            if range.min <= 0.0 || range.max >= 100.0 {
                return Err(format!("{}: {name} must lie within (0, 100)", self.code));
            }
        }
        if self.physical_size.width <= 0.0 || self.physical_size.height <= 0.0 {
            return Err(format!("{}: physical size must be positive", self.code));
        }
        if self.background.allowed_colors.is_empty() {
            return Err(format!("{}: at least one background color required", self.code));
        }
        if !(0.0..=1.0).contains(&self.background.uniformity_threshold) {
            return Err(format!("{}: uniformity threshold must be 0.0-1.0", self.code));
        }
        Ok(())
    }
}
