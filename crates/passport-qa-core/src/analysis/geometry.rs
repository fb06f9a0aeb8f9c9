//! Angles derived from facial landmarks.

use crate::domain::Point;

/// In-plane tilt of the eye line in degrees.
///
/// The left/right labels are ignored: the eyes are ordered by x and the angle
/// is measured from the image-left eye to the image-right eye, so it is
/// positive when the right-hand eye sits lower. Returns exactly 0.0 when
/// either eye is missing.
#[must_use]
pub fn eye_tilt_degrees(left: Option<Point>, right: Option<Point>) -> f64 {
    let (Some(a), Some(b)) = (left, right) else {
        return 0.0;
    };
    let (from, to) = if a.x <= b.x { (a, b) } else { (b, a) };
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}
