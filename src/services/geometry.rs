/// Geometry helpers shared by the classifiers and metric scorers.
///
/// All angles are in degrees. Image `y` grows downward, so "up" is `-y`.

use crate::models::Point;

/// Angle at `b` formed by the segments `b→a` and `b→c`.
///
/// Returns `None` when either segment has zero length.
pub fn angle_between(a: Point, b: Point, c: Point) -> Option<f64> {
    let ba = (a.x - b.x, a.y - b.y);
    let bc = (c.x - b.x, c.y - b.y);

    let mag_ba = (ba.0 * ba.0 + ba.1 * ba.1).sqrt();
    let mag_bc = (bc.0 * bc.0 + bc.1 * bc.1).sqrt();
    if mag_ba < f64::EPSILON || mag_bc < f64::EPSILON {
        return None;
    }

    let cos_angle = (ba.0 * bc.0 + ba.1 * bc.1) / (mag_ba * mag_bc);
    Some(cos_angle.clamp(-1.0, 1.0).acos().to_degrees())
}

/// Angle between the segment `from→to` and straight up, in [0, 180].
///
/// A zero-length segment is treated as vertical.
pub fn angle_from_vertical(from: Point, to: Point) -> f64 {
    let dx = to.x - from.x;
    let dy = from.y - to.y;
    if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
        return 0.0;
    }
    dx.abs().atan2(dy).to_degrees()
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Round a raw score and clamp it into 0-100
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// Linear interpolation of `value` from `[from_lo, from_hi]` onto `[to_lo, to_hi]`, clamped
pub fn lerp_clamped(value: f64, from_lo: f64, from_hi: f64, to_lo: f64, to_hi: f64) -> f64 {
    let span = from_hi - from_lo;
    if span.abs() < f64::EPSILON {
        return to_lo;
    }
    let t = ((value - from_lo) / span).clamp(0.0, 1.0);
    to_lo + (to_hi - to_lo) * t
}
