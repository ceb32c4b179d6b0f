use glam::{Mat3, Quat, Vec3};

/// Squared length below which a direction is treated as degenerate.
pub const DEGENERATE_EPSILON: f32 = 1e-10;

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `value` between `a` and `b`, clamped to `[0, 1]`.
///
/// Returns `0.0` when `a == b`.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    let span = b - a;
    if span.abs() <= f32::EPSILON {
        0.0
    } else {
        ((value - a) / span).clamp(0.0, 1.0)
    }
}

/// Hermite ease between 0 and 1.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Rotation whose local +Z points along `forward` and whose local +Y is as
/// close to `up` as possible.
///
/// A zero `forward` yields the identity. When `up` is parallel to `forward`
/// another reference axis is picked, so the result is always finite.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(forward) = forward.try_normalize() else {
        return Quat::IDENTITY;
    };
    let right = right_axis(forward, up);
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}

/// Two unit vectors perpendicular to `forward` and to each other, forming a
/// right-handed frame `(right, up, forward)`.
pub fn orthonormal_basis(forward: Vec3) -> (Vec3, Vec3) {
    let forward = forward.try_normalize().unwrap_or(Vec3::Y);
    let right = right_axis(forward, Vec3::Y);
    (right, forward.cross(right))
}

fn right_axis(forward: Vec3, up: Vec3) -> Vec3 {
    [up, Vec3::Y, Vec3::Z, Vec3::X]
        .into_iter()
        .filter_map(|candidate| candidate.cross(forward).try_normalize())
        .next()
        .unwrap_or(Vec3::X)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_lerp_clamps_and_handles_empty_span() {
        assert_eq!(inverse_lerp(0.0, 10.0, 5.0), 0.5);
        assert_eq!(inverse_lerp(0.0, 10.0, 20.0), 1.0);
        assert_eq!(inverse_lerp(0.0, 10.0, -3.0), 0.0);
        assert_eq!(inverse_lerp(2.0, 2.0, 7.0), 0.0);
    }

    #[test]
    fn smoothstep_hits_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(4.0), 1.0);
    }

    #[test]
    fn look_rotation_maps_z_onto_forward() {
        let forward = Vec3::new(1.0, 1.0, 0.0).normalize();
        let q = look_rotation(forward, Vec3::Y);
        assert!((q * Vec3::Z - forward).length() < 1e-5);
    }

    #[test]
    fn look_rotation_identity_for_default_axes() {
        let q = look_rotation(Vec3::Z, Vec3::Y);
        assert!(q.angle_between(Quat::IDENTITY) < 1e-4);
    }

    #[test]
    fn look_rotation_survives_parallel_up_and_zero_forward() {
        let q = look_rotation(Vec3::Y, Vec3::Y);
        assert!(q.is_finite());
        assert!((q * Vec3::Z - Vec3::Y).length() < 1e-5);
        assert_eq!(look_rotation(Vec3::ZERO, Vec3::Y), Quat::IDENTITY);
    }

    #[test]
    fn basis_is_orthonormal() {
        for forward in [Vec3::Y, Vec3::X, Vec3::new(0.3, -0.2, 0.9), Vec3::ZERO] {
            let (right, up) = orthonormal_basis(forward);
            let f = forward.try_normalize().unwrap_or(Vec3::Y);
            assert!((right.length() - 1.0).abs() < 1e-5);
            assert!((up.length() - 1.0).abs() < 1e-5);
            assert!(right.dot(up).abs() < 1e-5);
            assert!(right.dot(f).abs() < 1e-5);
            assert!(up.dot(f).abs() < 1e-5);
        }
    }
}
