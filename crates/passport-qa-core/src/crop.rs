//! Crop geometry: where in the source the output photo is cut from.
//!
//! The scale factor is constrained before the rectangle is derived, so a
//! crop never extends past the source and never needs clamping afterwards.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{BoundingBox, FaceGeometry, Point, Requirement};

/// Ratio of full head height (crown to chin) to a detector's face box.
///
/// Crops are sized so the estimated full head, not the raw box, lands in the
/// middle of the standard's head range. The `head_size` check measures the
/// raw box, so a face re-detected in an exported photo usually reads below
/// the range there.
pub const HEAD_TO_BOX_RATIO: f64 = 1.4;

/// Eye line position as a fraction of box height, when landmarks are missing.
pub const ESTIMATED_EYE_DEPTH: f64 = 0.45;

/// Half the estimated inter-eye distance, as a fraction of box width.
pub const ESTIMATED_EYE_SPREAD: f64 = 0.1;

/// A crop rectangle in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropParams {
    /// Left edge.
    pub crop_x: u32,
    /// Top edge.
    pub crop_y: u32,
    /// Width.
    pub crop_w: u32,
    /// Height.
    pub crop_h: u32,
}

impl CropParams {
    /// Whether the rectangle lies entirely inside a `width` × `height` source.
    #[must_use]
    pub const fn fits_within(&self, width: u32, height: u32) -> bool {
        self.crop_x as u64 + self.crop_w as u64 <= width as u64
            && self.crop_y as u64 + self.crop_h as u64 <= height as u64
    }
}

/// Computes the crop for `requirement` from a `source_w` × `source_h` image.
///
/// With a usable face box the head is scaled to the middle of the head-height
/// range and the eyes are placed on the middle of the eye-line range.
/// Otherwise a centered crop at the output aspect ratio is returned.
#[must_use]
pub fn calculate_crop(
    source_w: u32,
    source_h: u32,
    face: Option<&FaceGeometry>,
    requirement: &Requirement,
) -> CropParams {
    if source_w == 0 || source_h == 0 {
        return CropParams {
            crop_x: 0,
            crop_y: 0,
            crop_w: 0,
            crop_h: 0,
        };
    }
    let Some(face_box) = face.and_then(FaceGeometry::usable_box) else {
        return centered_crop(source_w, source_h, requirement.aspect_ratio());
    };

    let (out_w, out_h) = requirement.output_pixels();
    let (out_w, out_h) = (f64::from(out_w), f64::from(out_h));
    let (src_w, src_h) = (f64::from(source_w), f64::from(source_h));

    let head_h = face_box.height * HEAD_TO_BOX_RATIO;
    let target = out_h * requirement.head_height.midpoint() / 100.0;
    let scale = (target / head_h).max(out_w / src_w).max(out_h / src_h);

    let crop_w = fit(out_w / scale, source_w);
    let crop_h = fit(out_h / scale, source_h);

    let eye_y = face
        .and_then(FaceGeometry::eyes)
        .map_or_else(|| estimate_eyes(&face_box).0.y, |(l, r)| l.midpoint(&r).y);
    let eye_from_top = 1.0 - requirement.eye_line.midpoint() / 100.0;

    let x = face_box.center_x() - f64::from(crop_w) / 2.0;
    let y = eye_y - f64::from(crop_h) * eye_from_top;
    let crop = CropParams {
        crop_x: place(x, source_w - crop_w),
        crop_y: place(y, source_h - crop_h),
        crop_w,
        crop_h,
    };
    debug!(
        code = %requirement.code,
        scale,
        ?crop,
        src_w,
        src_h,
        "calculated face crop"
    );
    crop
}

/// Centered crop at `aspect` (width / height) using the full height of a wide
/// source or the full width of a tall one.
#[must_use]
pub fn centered_crop(source_w: u32, source_h: u32, aspect: f64) -> CropParams {
    let (src_w, src_h) = (f64::from(source_w), f64::from(source_h));
    let (crop_w, crop_h) = if src_w / src_h > aspect {
        (fit(src_h * aspect, source_w), source_h)
    } else {
        (source_w, fit(src_w / aspect, source_h))
    };
    CropParams {
        crop_x: (source_w - crop_w) / 2,
        crop_y: (source_h - crop_h) / 2,
        crop_w,
        crop_h,
    }
}

/// Estimated `(left, right)` eye positions for a box without landmarks.
#[must_use]
pub fn estimate_eyes(face_box: &BoundingBox) -> (Point, Point) {
    let y = face_box.y + face_box.height * ESTIMATED_EYE_DEPTH;
    let cx = face_box.center_x();
    let spread = face_box.width * ESTIMATED_EYE_SPREAD;
    (Point::new(cx - spread, y), Point::new(cx + spread, y))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fit(length: f64, limit: u32) -> u32 {
    // Absorb rounding noise from `out / (out / src)` before flooring.
    ((length + 1e-9).floor().max(1.0) as u32).min(limit)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn place(origin: f64, max: u32) -> u32 {
    origin.round().clamp(0.0, f64::from(max)) as u32
}

/// Maps source coordinates into the output photo through a crop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputFrame {
    /// The source rectangle that becomes the output.
    pub crop: CropParams,
    /// Output width in pixels.
    pub output_w: u32,
    /// Output height in pixels.
    pub output_h: u32,
}

impl OutputFrame {
    /// The frame a source image would get with no face-driven framing: the
    /// centered crop at the output aspect ratio, scaled to output size.
    #[must_use]
    pub fn centered(source_w: u32, source_h: u32, requirement: &Requirement) -> Option<Self> {
        if source_w == 0 || source_h == 0 {
            return None;
        }
        let (output_w, output_h) = requirement.output_pixels();
        Some(Self {
            crop: centered_crop(source_w, source_h, requirement.aspect_ratio()),
            output_w,
            output_h,
        })
    }

    fn scale(&self) -> (f64, f64) {
        (
            f64::from(self.output_w) / f64::from(self.crop.crop_w.max(1)),
            f64::from(self.output_h) / f64::from(self.crop.crop_h.max(1)),
        )
    }

    /// Maps a source point into output pixels.
    #[must_use]
    pub fn map_point(&self, point: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(
            (point.x - f64::from(self.crop.crop_x)) * sx,
            (point.y - f64::from(self.crop.crop_y)) * sy,
        )
    }

    /// Maps a source box into output pixels.
    #[must_use]
    pub fn map_box(&self, face_box: &BoundingBox) -> BoundingBox {
        let (sx, sy) = self.scale();
        let origin = self.map_point(Point::new(face_box.x, face_box.y));
        BoundingBox::new(origin.x, origin.y, face_box.width * sx, face_box.height * sy)
    }

    /// Percent of output height a source length covers.
    #[must_use]
    pub fn height_percent(&self, source_length: f64) -> f64 {
        let (_, sy) = self.scale();
        source_length * sy / f64::from(self.output_h.max(1)) * 100.0
    }

    /// Percent distance from the bottom edge of the output for a source y.
    #[must_use]
    pub fn percent_from_bottom(&self, source_y: f64) -> f64 {
        let out_h = f64::from(self.output_h.max(1));
        let y = self.map_point(Point::new(0.0, source_y)).y;
        (out_h - y) / out_h * 100.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::{registry, Landmarks, StandardCode};

    fn face(x: f64, y: f64, w: f64, h: f64) -> FaceGeometry {
        FaceGeometry::with_box(BoundingBox::new(x, y, w, h), 0.95)
    }

    #[test]
    fn test_crop_always_fits_source() {
        let sizes = [
            (1, 1),
            (50, 900),
            (640, 480),
            (480, 640),
            (600, 600),
            (4000, 3000),
            (3000, 4000),
            (8000, 300),
        ];
        for requirement in registry::list() {
            for (w, h) in sizes {
                let (fw, fh) = (f64::from(w), f64::from(h));
                let faces = [
                    None,
                    Some(face(0.0, 0.0, fw, fh)),
                    Some(face(fw * 0.4, fh * 0.3, fw * 0.2, fh * 0.25)),
                    Some(face(-fw * 0.2, -fh * 0.2, fw * 0.1, fh * 0.1)),
                    Some(face(fw * 0.95, fh * 0.95, fw * 0.5, fh * 0.5)),
                    Some(face(fw * 0.5, fh * 0.5, 2.0, 2.0)),
                    Some(face(fw * 0.5, fh * 0.5, fw * 3.0, fh * 3.0)),
                ];
                for f in &faces {
                    let crop = calculate_crop(w, h, f.as_ref(), requirement);
                    assert!(
                        crop.fits_within(w, h),
                        "{} {w}x{h} {f:?} -> {crop:?}",
                        requirement.code
                    );
                    assert!(crop.crop_w >= 1 && crop.crop_h >= 1);
                }
            }
        }
    }

    #[test]
    fn test_no_face_centers_at_output_aspect() {
        let us = registry::get(StandardCode::Us);
        let crop = calculate_crop(800, 600, None, us);
        assert_eq!(
            crop,
            CropParams {
                crop_x: 100,
                crop_y: 0,
                crop_w: 600,
                crop_h: 600
            }
        );

        let tall = calculate_crop(600, 1000, None, us);
        assert_eq!((tall.crop_w, tall.crop_h, tall.crop_y), (600, 600, 200));
    }

    #[test]
    fn test_face_crop_hits_head_and_eye_targets() {
        let us = registry::get(StandardCode::Us);
        // Small face in a large source, far from every edge
        let geometry = FaceGeometry {
            landmarks: Some(Landmarks {
                left_eye: Some(Point::new(1470.0, 1540.0)),
                right_eye: Some(Point::new(1530.0, 1540.0)),
                ..Landmarks::default()
            }),
            ..face(1450.0, 1450.0, 100.0, 200.0)
        };
        let crop = calculate_crop(3000, 3000, Some(&geometry), us);

        let head_percent = 200.0 * HEAD_TO_BOX_RATIO / f64::from(crop.crop_h) * 100.0;
        assert!((head_percent - 59.5).abs() < 0.5, "{head_percent}");
        // the raw box alone measures below the range after cropping
        let box_percent = 200.0 / f64::from(crop.crop_h) * 100.0;
        assert!(box_percent < us.head_height.min, "{box_percent}");

        let eye_from_bottom =
            (f64::from(crop.crop_y + crop.crop_h) - 1540.0) / f64::from(crop.crop_h) * 100.0;
        assert!((eye_from_bottom - 62.5).abs() < 0.5, "{eye_from_bottom}");

        let center = f64::from(crop.crop_x) + f64::from(crop.crop_w) / 2.0;
        assert!((center - 1500.0).abs() <= 1.0);
    }

    #[test]
    fn test_huge_face_is_limited_by_source() {
        let uk = registry::get(StandardCode::Uk);
        let crop = calculate_crop(400, 300, Some(&face(0.0, 0.0, 400.0, 300.0)), uk);
        assert!(crop.fits_within(400, 300));
        assert_eq!(crop.crop_h, 300);
    }

    #[test]
    fn test_estimated_eyes() {
        let (left, right) = estimate_eyes(&BoundingBox::new(100.0, 200.0, 100.0, 200.0));
        assert_eq!(left, Point::new(140.0, 290.0));
        assert_eq!(right, Point::new(160.0, 290.0));
    }

    #[test]
    fn test_output_frame_maps_prepared_photo_one_to_one() {
        let us = registry::get(StandardCode::Us);
        let frame = OutputFrame::centered(600, 600, us).unwrap();
        assert!((frame.height_percent(357.0) - 59.5).abs() < 1e-9);
        assert!((frame.percent_from_bottom(240.0) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_frame_scales_large_sources() {
        let us = registry::get(StandardCode::Us);
        let frame = OutputFrame::centered(1600, 1200, us).unwrap();
        assert_eq!(frame.crop.crop_x, 200);
        let mapped = frame.map_box(&BoundingBox::new(600.0, 300.0, 400.0, 600.0));
        assert!((mapped.x - 200.0).abs() < 1e-9);
        assert!((mapped.height - 300.0).abs() < 1e-9);
        assert!(OutputFrame::centered(0, 10, us).is_none());
    }
}
