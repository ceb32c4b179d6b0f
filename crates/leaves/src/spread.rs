use std::f32::consts::TAU;

use arbor_common::ConfigError;
use arbor_common::error::ensure_non_negative;
use arbor_common::math::orthonormal_basis;
use arbor_common::sampling::{in_unit_sphere, unit_vector};
use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How leaves of one cluster are distributed around their anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpreadPolicy {
    /// Every leaf sits exactly on the anchor, facing along the branch.
    #[default]
    Point,
    /// Random offsets inside a ball. Leaves never sink more than a fifth of
    /// the radius below the anchor.
    Sphere { radius: f32 },
    /// Leaves wrap the last `length` of the branch ending at the anchor,
    /// hovering just off a bark surface of the given thickness.
    Radial { length: f32, thickness: f32 },
}

/// Fraction of the sphere radius a leaf may drop below its anchor.
const SPHERE_DROP: f32 = 0.2;
/// Offsets shorter than this fraction of the radius get a random normal.
const SPHERE_MIN_NORMAL: f32 = 0.1;
const RADIAL_START: f32 = 0.3;
const RADIAL_SCALE: (f32, f32) = (0.8, 2.5);
const RADIAL_SLIDE: f32 = 0.05;
const RADIAL_NORMAL_NOISE: f32 = 0.3;

impl SpreadPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Point => Ok(()),
            Self::Sphere { radius } => ensure_non_negative("spread.radius", radius),
            Self::Radial { length, thickness } => {
                ensure_non_negative("spread.length", length)?;
                ensure_non_negative("spread.thickness", thickness)
            }
        }
    }

    /// Position and facing normal for one leaf of a cluster anchored at
    /// `anchor` with outward branch `direction`.
    pub fn place(&self, anchor: Vec3, direction: Vec3, rng: &mut impl Rng) -> (Vec3, Vec3) {
        let direction = direction.try_normalize().unwrap_or(Vec3::Y);
        match *self {
            Self::Point => (anchor, direction),
            Self::Sphere { radius } => {
                let offset = in_unit_sphere(rng) * radius;
                let mut position = anchor + offset;
                position.y = position.y.max(anchor.y - SPHERE_DROP * radius);
                let normal = offset
                    .try_normalize()
                    .filter(|_| offset.length() >= SPHERE_MIN_NORMAL * radius)
                    .unwrap_or_else(|| unit_vector(rng));
                (position, normal)
            }
            Self::Radial { length, thickness } => {
                let start = anchor - direction * length;
                let on_branch = start.lerp(anchor, rng.random_range(RADIAL_START..=1.0));
                let (right, up) = orthonormal_basis(direction);
                let angle = rng.random_range(0.0..=TAU);
                let outward = right * angle.cos() + up * angle.sin();
                let radius = thickness * rng.random_range(RADIAL_SCALE.0..=RADIAL_SCALE.1);
                let position = on_branch
                    + outward * radius
                    + direction * rng.random_range(-RADIAL_SLIDE..=RADIAL_SLIDE);
                let normal = bend_towards(outward, unit_vector(rng), RADIAL_NORMAL_NOISE);
                (position, normal)
            }
        }
    }
}

/// Rotate unit vector `from` part of the way towards unit vector `to`.
fn bend_towards(from: Vec3, to: Vec3, amount: f32) -> Vec3 {
    let arc = Quat::from_rotation_arc(from, to);
    (Quat::IDENTITY.slerp(arc, amount) * from)
        .try_normalize()
        .unwrap_or(from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn point_places_on_anchor() {
        let mut rng = StdRng::seed_from_u64(0);
        let anchor = Vec3::new(1.0, 2.0, 3.0);
        let (p, n) = SpreadPolicy::Point.place(anchor, Vec3::ZERO, &mut rng);
        assert_eq!(p, anchor);
        assert_eq!(n, Vec3::Y);
    }

    #[test]
    fn sphere_keeps_leaves_near_and_above_floor() {
        let mut rng = StdRng::seed_from_u64(1);
        let anchor = Vec3::new(0.0, 4.0, 0.0);
        let policy = SpreadPolicy::Sphere { radius: 0.5 };
        for _ in 0..500 {
            let (p, n) = policy.place(anchor, Vec3::Y, &mut rng);
            assert!(p.distance(anchor) <= 0.5 + 1e-5);
            assert!(p.y >= anchor.y - 0.1 - 1e-6);
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn zero_radius_sphere_still_has_valid_normals() {
        let mut rng = StdRng::seed_from_u64(2);
        let (p, n) = SpreadPolicy::Sphere { radius: 0.0 }.place(Vec3::ONE, Vec3::Y, &mut rng);
        assert_eq!(p, Vec3::ONE);
        assert!(n.is_finite() && (n.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn radial_wraps_the_branch_tip() {
        let mut rng = StdRng::seed_from_u64(3);
        let anchor = Vec3::new(0.0, 5.0, 0.0);
        let policy = SpreadPolicy::Radial {
            length: 1.0,
            thickness: 0.1,
        };
        for _ in 0..500 {
            let (p, n) = policy.place(anchor, Vec3::Y, &mut rng);
            assert!(p.y >= 4.3 - 0.05 - 1e-5 && p.y <= 5.05 + 1e-5);
            let r = Vec3::new(p.x, 0.0, p.z).length();
            assert!((0.08 - 1e-5..=0.25 + 1e-5).contains(&r));
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn validation_rejects_negative_sizes() {
        assert!(SpreadPolicy::Sphere { radius: -1.0 }.validate().is_err());
        assert!(
            SpreadPolicy::Radial {
                length: 1.0,
                thickness: -0.1
            }
            .validate()
            .is_err()
        );
        assert!(SpreadPolicy::default().validate().is_ok());
    }

    #[test]
    fn tagged_serde_form() {
        let policy: SpreadPolicy =
            serde_json::from_str(r#"{ "kind": "sphere", "radius": 0.3 }"#).unwrap();
        assert_eq!(policy, SpreadPolicy::Sphere { radius: 0.3 });
        let point: SpreadPolicy = serde_json::from_str(r#"{ "kind": "point" }"#).unwrap();
        assert_eq!(point, SpreadPolicy::Point);
    }
}
