use arbor_common::ConfigError;
use arbor_common::error::{
    ensure_finite, ensure_non_negative, ensure_ordered, ensure_positive, ensure_unit,
    ensure_variance,
};
use arbor_common::math::{inverse_lerp, lerp};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Parameters that turn a symbol sequence into geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthParams {
    /// Mean length of one `F` step.
    pub base_length: f32,
    /// Step length varies uniformly by up to this much either way.
    pub length_variance: f32,
    /// Mean turn angle in degrees for `+ - & ^ \ /`.
    pub base_angle: f32,
    pub angle_variance: f32,
    /// Chance that an `F` actually produces a segment.
    pub branch_probability: f32,
    pub control_jitter: ControlJitter,
    /// Fraction of the tree height (so far) a popped branch tip must reach to
    /// become a leaf anchor.
    pub leaf_threshold: f32,
    pub taper: TaperPolicy,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            base_length: 2.0,
            length_variance: 0.5,
            base_angle: 25.0,
            angle_variance: 10.0,
            branch_probability: 1.0,
            control_jitter: ControlJitter::default(),
            leaf_threshold: 0.4,
            taper: TaperPolicy::default(),
        }
    }
}

impl GrowthParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("base_length", self.base_length)?;
        ensure_variance("length_variance", self.length_variance)?;
        ensure_finite(
            "base_length + length_variance",
            self.base_length + self.length_variance,
        )?;
        ensure_non_negative("base_angle", self.base_angle)?;
        ensure_variance("angle_variance", self.angle_variance)?;
        ensure_finite(
            "base_angle + angle_variance",
            self.base_angle + self.angle_variance,
        )?;
        ensure_unit("branch_probability", self.branch_probability)?;
        ensure_unit("leaf_threshold", self.leaf_threshold)?;
        self.control_jitter.validate()?;
        self.taper.validate()
    }
}

/// Offset of a segment's bezier control point from its midpoint, expressed in
/// the turtle's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlJitter {
    /// Local X and Z offsets are drawn from `[-lateral, lateral]`.
    pub lateral: f32,
    /// Local Y offset range (along the growth direction).
    pub vertical: (f32, f32),
}

impl Default for ControlJitter {
    fn default() -> Self {
        Self {
            lateral: 0.4,
            vertical: (-0.2, 0.4),
        }
    }
}

impl ControlJitter {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_variance("control_jitter.lateral", self.lateral)?;
        ensure_ordered("control_jitter.vertical", self.vertical)
    }
}

/// Branch thickness from position in the tree: thick near the trunk base,
/// thin at high or far-out tips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaperPolicy {
    pub min_width: f32,
    pub max_width: f32,
    pub exponent: f32,
    /// Horizontal distance from the trunk at which the horizontal ratio saturates.
    pub max_horizontal_distance: f32,
    /// Fixed width for the first emitted segment, bypassing the taper formula.
    pub trunk_width: Option<f32>,
}

impl Default for TaperPolicy {
    fn default() -> Self {
        Self {
            min_width: 0.05,
            max_width: 0.15,
            exponent: 1.0,
            max_horizontal_distance: 4.0,
            trunk_width: None,
        }
    }
}

impl TaperPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("taper.min_width", self.min_width)?;
        ensure_positive("taper.max_width", self.max_width)?;
        ensure_ordered("taper.width", (self.min_width, self.max_width))?;
        ensure_positive("taper.exponent", self.exponent)?;
        ensure_positive("taper.max_horizontal_distance", self.max_horizontal_distance)?;
        if let Some(width) = self.trunk_width {
            ensure_positive("taper.trunk_width", width)?;
        }
        Ok(())
    }

    /// Taper factor in `[0, 1]` for a point: 0 at the trunk base, 1 at the
    /// highest or farthest-out positions.
    pub fn factor(&self, point: Vec3, origin: Vec3, max_height: f32) -> f32 {
        let vertical = inverse_lerp(origin.y, max_height, point.y);
        let horizontal = Vec3::new(point.x - origin.x, 0.0, point.z - origin.z).length();
        let horizontal = (horizontal / self.max_horizontal_distance).clamp(0.0, 1.0);
        ((vertical + horizontal) * 0.5)
            .clamp(0.0, 1.0)
            .powf(self.exponent)
    }

    /// Width of a segment ending at `point`.
    pub fn width(&self, point: Vec3, origin: Vec3, max_height: f32) -> f32 {
        lerp(
            self.max_width,
            self.min_width,
            self.factor(point, origin, max_height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GrowthParams::default().validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut p = GrowthParams::default();
        p.base_length = 0.0;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::NonPositive {
                field: "base_length",
                ..
            })
        ));

        let mut p = GrowthParams::default();
        p.leaf_threshold = 1.5;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::OutOfUnitRange { .. })
        ));

        let mut p = GrowthParams::default();
        p.taper.min_width = 0.3;
        assert!(matches!(p.validate(), Err(ConfigError::InvalidRange { .. })));

        let mut p = GrowthParams::default();
        p.control_jitter.vertical = (0.5, -0.5);
        assert!(p.validate().is_err());

        let mut p = GrowthParams::default();
        p.taper.trunk_width = Some(-1.0);
        assert!(p.validate().is_err());
    }

    #[test]
    fn unsampleable_variances_are_rejected() {
        let mut p = GrowthParams::default();
        p.angle_variance = f32::INFINITY;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::NonFinite {
                field: "angle_variance",
                ..
            })
        ));

        let mut p = GrowthParams::default();
        p.length_variance = f32::MAX;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::NonFinite {
                field: "length_variance",
                ..
            })
        ));

        let mut p = GrowthParams::default();
        p.control_jitter.lateral = f32::MAX;
        assert!(p.validate().is_err());

        let mut p = GrowthParams::default();
        p.base_length = f32::MAX;
        p.length_variance = f32::MAX / 4.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn taper_is_widest_at_base_and_thinnest_at_top() {
        let taper = TaperPolicy::default();
        let base = taper.width(Vec3::ZERO, Vec3::ZERO, 10.0);
        let top = taper.width(Vec3::new(4.0, 10.0, 0.0), Vec3::ZERO, 10.0);
        assert!((base - taper.max_width).abs() < 1e-6);
        assert!((top - taper.min_width).abs() < 1e-6);
    }

    #[test]
    fn taper_decreases_with_height() {
        let taper = TaperPolicy::default();
        let mut last = f32::MAX;
        for i in 0..=10 {
            let w = taper.width(Vec3::new(0.0, i as f32, 0.0), Vec3::ZERO, 10.0);
            assert!(w < last);
            last = w;
        }
    }

    #[test]
    fn exponent_shapes_the_curve() {
        let linear = TaperPolicy::default();
        let steep = TaperPolicy {
            exponent: 2.0,
            ..TaperPolicy::default()
        };
        let p = Vec3::new(0.0, 5.0, 0.0);
        assert!(steep.factor(p, Vec3::ZERO, 10.0) < linear.factor(p, Vec3::ZERO, 10.0));
    }

    #[test]
    fn flat_tree_uses_horizontal_ratio_only() {
        let taper = TaperPolicy::default();
        let f = taper.factor(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, 0.0);
        assert!((f - 0.25).abs() < 1e-6);
    }
}
