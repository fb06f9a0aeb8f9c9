//! Synthetic portraits and analysis builders for testing.

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{DynamicImage, Rgb, RgbImage};
use passport_qa_core::domain::{
    BoundingBox, Exposure, FaceAttributes, FaceGeometry, FaceObservation, HaloReport, HexColor,
    ImageAnalysis, ImageInfo, Landmarks, Point, QualityMetrics, Rotation,
};

const SKIN: Rgb<u8> = Rgb([200, 160, 130]);
const HALO: Rgb<u8> = Rgb([255, 255, 255]);
const STRIPE_DARK: Rgb<u8> = Rgb([40, 40, 90]);
const STRIPE_LIGHT: Rgb<u8> = Rgb([200, 200, 220]);

/// Builder for head-and-shoulders test portraits.
///
/// The default is a 600x600 frontal portrait on white whose face box covers
/// 59.5% of the height with the eyes 60% up from the bottom: a clean pass
/// for the US standard. A striped jacket below the face gives the image
/// enough edge energy to read as sharp.
#[derive(Debug, Clone)]
pub struct SyntheticPortraitBuilder {
    width: u32,
    height: u32,
    background: Rgb<u8>,
    face: bool,
    halo: bool,
    grayscale: bool,
    attributes: FaceAttributes,
}

/// A rendered portrait plus the observation a detector would report for it.
#[derive(Debug, Clone)]
pub struct SyntheticPortrait {
    /// The pixels.
    pub info: ImageInfo,
    /// Face geometry and attributes matching the pixels.
    pub observation: FaceObservation,
}

impl SyntheticPortraitBuilder {
    /// A 600x600 portrait on white.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: 600,
            height: 600,
            background: Rgb([255, 255, 255]),
            face: true,
            halo: false,
            grayscale: false,
            attributes: Self::compliant_attributes(),
        }
    }

    /// Attributes every standard accepts.
    #[must_use]
    pub const fn compliant_attributes() -> FaceAttributes {
        FaceAttributes {
            glasses: Some(false),
            smile: Some(false),
            headwear: Some(false),
            eyes_open: Some(true),
            mouth_closed: Some(true),
        }
    }

    /// Sets the image size; the face scales with it.
    #[must_use]
    pub const fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the backdrop color.
    #[must_use]
    pub const fn background(mut self, r: u8, g: u8, b: u8) -> Self {
        self.background = Rgb([r, g, b]);
        self
    }

    /// Leaves out the face; the observation reports no detection.
    #[must_use]
    pub const fn without_face(mut self) -> Self {
        self.face = false;
        self
    }

    /// Paints a bright cut-out fringe around the top and sides of the face box.
    #[must_use]
    pub const fn with_halo(mut self) -> Self {
        self.halo = true;
        self
    }

    /// Renders in shades of grey.
    #[must_use]
    pub const fn grayscale(mut self) -> Self {
        self.grayscale = true;
        self
    }

    /// Overrides the reported attributes.
    #[must_use]
    pub const fn attributes(mut self, attributes: FaceAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Face box for the current size.
    #[must_use]
    pub fn face_box(&self) -> BoundingBox {
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        BoundingBox::new(w / 3.0, h * 80.0 / 600.0, w / 3.0, h * 357.0 / 600.0)
    }

    /// Eye positions (image order) for the current size.
    #[must_use]
    pub fn eyes(&self) -> (Point, Point) {
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        (
            Point::new(w * 250.0 / 600.0, h * 0.4),
            Point::new(w * 350.0 / 600.0, h * 0.4),
        )
    }

    /// Geometry a detector would report, or `None` without a face.
    #[must_use]
    pub fn geometry(&self) -> FaceGeometry {
        if !self.face {
            return FaceGeometry::none();
        }
        let (left_eye, right_eye) = self.eyes();
        let face_box = self.face_box();
        FaceGeometry {
            landmarks: Some(Landmarks {
                left_eye: Some(left_eye),
                right_eye: Some(right_eye),
                nose: Some(Point::new(face_box.center_x(), face_box.y + face_box.height * 0.6)),
                mouth: Some(Point::new(face_box.center_x(), face_box.y + face_box.height * 0.78)),
                chin: Some(Point::new(face_box.center_x(), face_box.bottom())),
            }),
            rotation: Some(Rotation::default()),
            ..FaceGeometry::with_box(face_box, 0.95)
        }
    }

    /// Renders the portrait.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn build(&self) -> SyntheticPortrait {
        let face_box = self.face_box();
        let (cx, cy) = (face_box.center_x(), face_box.y + face_box.height / 2.0);
        let (rx, ry) = (face_box.width / 2.0, face_box.height / 2.0);
        let ring = (face_box.width * 0.06).max(2.0);
        let torso_left = f64::from(self.width) * 0.25;
        let torso_right = f64::from(self.width) * 0.75;
        let torso_top = face_box.bottom().ceil();

        let mut img = RgbImage::from_fn(self.width, self.height, |x, y| {
            let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
            if !self.face {
                return self.background;
            }
            let (dx, dy) = ((px - cx) / rx, (py - cy) / ry);
            if dx * dx + dy * dy <= 1.0 {
                return SKIN;
            }
            if py >= torso_top && px >= torso_left && px < torso_right {
                return if (x / 2) % 2 == 0 { STRIPE_DARK } else { STRIPE_LIGHT };
            }
            if self.halo {
                let beside = py >= face_box.y
                    && py < face_box.bottom()
                    && ((px >= face_box.x - ring && px < face_box.x)
                        || (px >= face_box.right() && px < face_box.right() + ring));
                let above = py >= face_box.y - ring
                    && py < face_box.y
                    && px >= face_box.x - ring
                    && px < face_box.right() + ring;
                if beside || above {
                    return HALO;
                }
            }
            self.background
        });

        if self.grayscale {
            for px in img.pixels_mut() {
                let [r, g, b] = px.0;
                let l = (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b))
                    .round() as u8;
                *px = Rgb([l, l, l]);
            }
        }

        let observation = FaceObservation {
            geometry: Some(self.geometry()),
            attributes: if self.face {
                self.attributes
            } else {
                FaceAttributes::default()
            },
        };
        SyntheticPortrait {
            info: ImageInfo::new("synthetic://portrait", DynamicImage::ImageRgb8(img)),
            observation,
        }
    }
}

impl Default for SyntheticPortraitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticPortrait {
    /// Writes `<name>.png` and a canonical `<name>.face.json` into `dir`.
    ///
    /// Returns the image path.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be written.
    pub fn write_to(&self, dir: &Path, name: &str) -> anyhow::Result<PathBuf> {
        let image_path = dir.join(format!("{name}.png"));
        self.info
            .image
            .save(&image_path)
            .with_context(|| format!("writing {}", image_path.display()))?;
        let json = serde_json::to_string_pretty(&self.observation)?;
        std::fs::write(dir.join(format!("{name}.face.json")), json)?;
        Ok(image_path)
    }

    /// Writes only `<name>.png` into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_image_to(&self, dir: &Path, name: &str) -> anyhow::Result<PathBuf> {
        let image_path = dir.join(format!("{name}.png"));
        self.info
            .image
            .save(&image_path)
            .with_context(|| format!("writing {}", image_path.display()))?;
        Ok(image_path)
    }
}

/// Builder for [`ImageAnalysis`] values without any pixels.
///
/// Starts from the measurements of a clean 600x600 US portrait.
#[derive(Debug, Clone)]
pub struct AnalysisBuilder {
    analysis: ImageAnalysis,
}

impl AnalysisBuilder {
    /// A compliant US analysis.
    #[must_use]
    pub fn new() -> Self {
        let portrait = SyntheticPortraitBuilder::new();
        Self {
            analysis: ImageAnalysis {
                metrics: QualityMetrics {
                    brightness: 180.0,
                    contrast: 0.35,
                    sharpness: 0.6,
                    exposure: Exposure::ProperlyExposed,
                    background_color: Some(HexColor::new(255, 255, 255)),
                    background_uniformity: 1.0,
                    halo: HaloReport::default(),
                    width: 600,
                    height: 600,
                    aspect_ratio: 1.0,
                    is_grayscale: false,
                },
                face: Some(portrait.geometry()),
                attributes: SyntheticPortraitBuilder::compliant_attributes(),
            },
        }
    }

    /// Sets the image size.
    #[must_use]
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.analysis.metrics.width = width;
        self.analysis.metrics.height = height;
        self.analysis.metrics.aspect_ratio = passport_qa_core::domain::aspect_ratio(width, height);
        self
    }

    /// Sets the mean backdrop color.
    #[must_use]
    pub const fn background(mut self, color: HexColor) -> Self {
        self.analysis.metrics.background_color = Some(color);
        self
    }

    /// Sets brightness and exposure.
    #[must_use]
    pub const fn exposure(mut self, brightness: f64, exposure: Exposure) -> Self {
        self.analysis.metrics.brightness = brightness;
        self.analysis.metrics.exposure = exposure;
        self
    }

    /// Sets sharpness.
    #[must_use]
    pub const fn sharpness(mut self, sharpness: f64) -> Self {
        self.analysis.metrics.sharpness = sharpness;
        self
    }

    /// Replaces the face geometry.
    #[must_use]
    pub fn face(mut self, face: Option<FaceGeometry>) -> Self {
        self.analysis.face = face;
        self
    }

    /// Replaces the attributes.
    #[must_use]
    pub const fn attributes(mut self, attributes: FaceAttributes) -> Self {
        self.analysis.attributes = attributes;
        self
    }

    /// Finishes the analysis.
    #[must_use]
    pub fn build(self) -> ImageAnalysis {
        self.analysis
    }
}

impl Default for AnalysisBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_portrait_geometry() {
        let builder = SyntheticPortraitBuilder::new();
        let portrait = builder.build();
        assert_eq!((portrait.info.width, portrait.info.height), (600, 600));
        let face = portrait.observation.geometry.unwrap_or_else(FaceGeometry::none);
        assert!(face.detected);
        let b = face.bounding_box.unwrap_or_else(|| builder.face_box());
        assert!((b.height / 600.0 - 0.595).abs() < 1e-9);
    }

    #[test]
    fn test_portrait_pixels() {
        let portrait = SyntheticPortraitBuilder::new().build();
        let rgb = portrait.info.image.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(rgb.get_pixel(300, 250), &SKIN);
        let a = rgb.get_pixel(300, 500);
        let b = rgb.get_pixel(302, 500);
        assert_ne!(a, b);
    }

    #[test]
    fn test_halo_ring() {
        let builder = SyntheticPortraitBuilder::new()
            .background(211, 211, 211)
            .with_halo();
        let rgb = builder.build().info.image.to_rgb8();
        // just left of the box at mid-height
        assert_eq!(rgb.get_pixel(195, 250), &HALO);
        assert_eq!(rgb.get_pixel(10, 10), &Rgb([211, 211, 211]));
    }

    #[test]
    fn test_grayscale() {
        let rgb = SyntheticPortraitBuilder::new()
            .grayscale()
            .build()
            .info
            .image
            .to_rgb8();
        assert!(rgb.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
    }

    #[test]
    fn test_without_face() {
        let portrait = SyntheticPortraitBuilder::new().without_face().build();
        let face = portrait.observation.geometry.unwrap_or_default();
        assert!(!face.detected);
        let rgb = portrait.info.image.to_rgb8();
        assert!(rgb.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn test_analysis_builder_defaults() {
        let analysis = AnalysisBuilder::new().size(300, 400).build();
        assert_eq!(analysis.metrics.width, 300);
        assert!((analysis.metrics.aspect_ratio - 0.75).abs() < 1e-9);
        assert!(analysis.face.is_some());
    }
}
