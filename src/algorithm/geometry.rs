//! Planar geometry over normalized landmarks.
//!
//! Everything here is pure. Degenerate input (coincident points, NaN drift)
//! never panics and never yields NaN angles: the cosine is clamped before
//! `acos`, and a zero-length ray resolves to 0°.

use crate::models::landmarks::Landmark;

/// Euclidean distance in the image plane; `z` is ignored.
pub fn distance(p1: Landmark, p2: Landmark) -> f64 {
    (p1.x - p2.x).hypot(p1.y - p2.y)
}

/// Angle at vertex `b` between the rays `b→a` and `b→c`, in degrees.
pub fn angle_at(a: Landmark, b: Landmark, c: Landmark) -> f64 {
    angle_between(
        [a.x - b.x, a.y - b.y, 0.0],
        [c.x - b.x, c.y - b.y, 0.0],
    )
}

/// Same as [`angle_at`] but using depth as well.
pub fn angle_at_3d(a: Landmark, b: Landmark, c: Landmark) -> f64 {
    angle_between(
        [a.x - b.x, a.y - b.y, a.z - b.z],
        [c.x - b.x, c.y - b.y, c.z - b.z],
    )
}

fn angle_between(u: [f64; 3], v: [f64; 3]) -> f64 {
    let norm_u = (u[0] * u[0] + u[1] * u[1] + u[2] * u[2]).sqrt();
    let norm_v = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    let denom = norm_u * norm_v;
    if !denom.is_finite() || denom <= f64::EPSILON {
        return 0.0;
    }

    let cosine = (u[0] * v[0] + u[1] * v[1] + u[2] * v[2]) / denom;
    if cosine.is_nan() {
        return 0.0;
    }
    cosine.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Image space grows downwards, so a raised tip has the smaller `y`.
pub fn is_raised(tip: Landmark, reference: Landmark) -> bool {
    tip.y < reference.y
}

/// Angle-based fold test on the tip–pip–mcp vertex angle. The thumb uses the
/// inverted rule.
pub fn is_folded(tip: Landmark, pip: Landmark, mcp: Landmark, is_thumb: bool) -> bool {
    let angle = angle_at_3d(tip, pip, mcp);
    if is_thumb {
        angle < 90.0
    } else {
        angle > 90.0
    }
}

/// True when both the tip–dip–pip and dip–pip–mcp angles exceed `min_angle_deg`.
pub fn is_straight(
    tip: Landmark,
    dip: Landmark,
    pip: Landmark,
    mcp: Landmark,
    min_angle_deg: f64,
) -> bool {
    angle_at(tip, dip, pip) > min_angle_deg && angle_at(dip, pip, mcp) > min_angle_deg
}
