use arbor_common::error::ensure_non_negative;
use arbor_common::{Color, ConfigError};
use arbor_scene::BranchMaterial;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Variance at which the hue/saturation/value offsets take their nominal size.
const NOMINAL_VARIANCE: f32 = 0.1;
const HUE_SHIFT: (f32, f32) = (-0.02, 0.02);
const SATURATION_SHIFT: (f32, f32) = (-0.05, 0.1);
const DARKEN: (f32, f32) = (0.1, 0.25);

/// Bark base colors and how far each branch's tint may drift from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarkPalette {
    pub base_colors: Vec<Color>,
    pub color_variance: f32,
}

impl Default for BarkPalette {
    fn default() -> Self {
        Self {
            base_colors: vec![
                Color::rgb(0.46, 0.33, 0.22),
                Color::rgb(0.40, 0.29, 0.19),
                Color::rgb(0.52, 0.39, 0.27),
            ],
            color_variance: NOMINAL_VARIANCE,
        }
    }
}

impl BarkPalette {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("bark.color_variance", self.color_variance)
    }

    /// Pick a base variant and darken/shift it in HSV space.
    ///
    /// An empty palette yields the default untinted material.
    pub fn pick(&self, rng: &mut impl Rng) -> BranchMaterial {
        if self.base_colors.is_empty() {
            return BranchMaterial::default();
        }
        let variant = rng.random_range(0..self.base_colors.len());
        let k = self.color_variance / NOMINAL_VARIANCE;
        let (h, s, v) = self.base_colors[variant].to_hsv();

        let h = (h + k * rng.random_range(HUE_SHIFT.0..=HUE_SHIFT.1)).clamp(0.0, 1.0);
        let s = (s + k * rng.random_range(SATURATION_SHIFT.0..=SATURATION_SHIFT.1)).clamp(0.0, 1.0);
        let v = (v - k * rng.random_range(DARKEN.0..=DARKEN.1)).clamp(0.0, 1.0);

        BranchMaterial {
            variant: variant as u32,
            tint: Color::from_hsv(h, s, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn picks_stay_darker_than_the_base() {
        let palette = BarkPalette::default();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let material = palette.pick(&mut rng);
            let base = palette.base_colors[material.variant as usize];
            let (_, _, base_v) = base.to_hsv();
            let (_, _, v) = material.tint.to_hsv();
            assert!(v <= base_v - 0.1 + 1e-4);
            assert!(v >= base_v - 0.25 - 1e-4);
        }
    }

    #[test]
    fn zero_variance_keeps_base_color() {
        let palette = BarkPalette {
            color_variance: 0.0,
            ..BarkPalette::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let material = palette.pick(&mut rng);
        let base = palette.base_colors[material.variant as usize];
        assert!((material.tint.r - base.r).abs() < 1e-4);
        assert!((material.tint.g - base.g).abs() < 1e-4);
        assert!((material.tint.b - base.b).abs() < 1e-4);
    }

    #[test]
    fn empty_palette_is_untinted() {
        let palette = BarkPalette {
            base_colors: Vec::new(),
            ..BarkPalette::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(palette.pick(&mut rng), BranchMaterial::default());
    }

    #[test]
    fn negative_variance_is_rejected() {
        let palette = BarkPalette {
            color_variance: -0.5,
            ..BarkPalette::default()
        };
        assert!(palette.validate().is_err());
    }
}
