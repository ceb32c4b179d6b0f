use glam::Vec3;

use arbor_common::math::DEGENERATE_EPSILON;

/// Parameter step for finite-difference tangents.
pub const TANGENT_STEP: f32 = 0.01;

/// Point on the quadratic bezier `p0 -> p1 -> p2` at `t`.
#[inline]
pub fn quadratic_bezier(t: f32, p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    let u = 1.0 - t;
    u * u * p0 + 2.0 * u * t * p1 + t * t * p2
}

/// Unit tangent at `t`, sampled by finite differences with `t` clamped to
/// `[0, 1]`.
///
/// Tries a forward difference, then a backward one (the forward step is empty
/// at `t = 1`), and falls back to `+Y` when the whole curve collapses to a point.
pub fn tangent(t: f32, p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    let center = quadratic_bezier(t, p0, p1, p2);
    let ahead = quadratic_bezier((t + TANGENT_STEP).clamp(0.0, 1.0), p0, p1, p2) - center;
    if ahead.length_squared() > DEGENERATE_EPSILON {
        return ahead.normalize();
    }
    let behind = center - quadratic_bezier((t - TANGENT_STEP).clamp(0.0, 1.0), p0, p1, p2);
    if behind.length_squared() > DEGENERATE_EPSILON {
        return behind.normalize();
    }
    Vec3::Y
}
