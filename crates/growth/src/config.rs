use arbor_common::ConfigError;
use arbor_common::error::{ensure_finite, ensure_non_negative, ensure_ordered, ensure_positive};
use arbor_grammar::{LSystem, Rule, RuleSet, TreePreset};
use arbor_leaves::{LeafConfig, SpreadPolicy};
use arbor_mesh::{DEFAULT_CURVE_SEGMENTS, DEFAULT_RADIAL_SEGMENTS};
use arbor_turtle::GrowthParams;
use serde::{Deserialize, Serialize};

use crate::material::BarkPalette;

/// Grammar selection: a preset, optionally overridden piece by piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    pub preset: TreePreset,
    pub axiom: Option<String>,
    /// Textual rules such as `"X=F[+X]"`. Non-empty replaces the preset rules.
    pub rules: Vec<String>,
    pub iterations: Option<u32>,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self::from_preset(TreePreset::Maple)
    }
}

impl GrammarConfig {
    pub fn from_preset(preset: TreePreset) -> Self {
        Self {
            preset,
            axiom: None,
            rules: Vec::new(),
            iterations: None,
        }
    }

    /// Resolve into a validated grammar.
    pub fn lsystem(&self) -> Result<LSystem, ConfigError> {
        let base = self.preset.lsystem();
        let rules = if self.rules.is_empty() {
            base.rules
        } else {
            self.rules
                .iter()
                .map(|text| Rule::parse(text))
                .collect::<Result<RuleSet, _>>()?
        };
        LSystem::new(
            self.axiom.clone().unwrap_or(base.axiom),
            rules,
            self.iterations.unwrap_or(base.iterations),
        )
    }
}

/// Tube tessellation used for every branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    pub curve_segments: u32,
    pub radial_segments: u32,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            curve_segments: DEFAULT_CURVE_SEGMENTS,
            radial_segments: DEFAULT_RADIAL_SEGMENTS,
        }
    }
}

impl MeshSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.curve_segments < 1 {
            return Err(ConfigError::TooFewSegments {
                field: "mesh.curve_segments",
                min: 1,
                value: self.curve_segments,
            });
        }
        if self.radial_segments < 3 {
            return Err(ConfigError::TooFewSegments {
                field: "mesh.radial_segments",
                min: 3,
                value: self.radial_segments,
            });
        }
        Ok(())
    }
}

/// Pacing of the growth animation. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthTiming {
    /// Spread across all branches; each gets `total / n` before jitter.
    pub total_growth_time: f32,
    /// Upper bound on branches animating at once.
    pub parallel_branches: u32,
    /// Wait after each branch start, scaled by `overlap_jitter`. Must be positive.
    pub branch_overlap_delay: f32,
    pub overlap_jitter: (f32, f32),
    pub duration_jitter: (f32, f32),
    pub settle_delay: (f32, f32),
    /// Wait between consecutive leaf clusters. Must be positive.
    pub leaf_cluster_stagger: f32,
    pub leaves_per_cluster: (u32, u32),
    pub leaf_spread: SpreadPolicy,
}

impl Default for GrowthTiming {
    fn default() -> Self {
        Self {
            total_growth_time: 15.0,
            parallel_branches: 2,
            branch_overlap_delay: 0.2,
            overlap_jitter: (0.8, 1.2),
            duration_jitter: (0.7, 1.3),
            settle_delay: (0.1, 0.3),
            leaf_cluster_stagger: 0.02,
            leaves_per_cluster: (3, 5),
            leaf_spread: SpreadPolicy::Point,
        }
    }
}

impl GrowthTiming {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("total_growth_time", self.total_growth_time)?;
        if self.parallel_branches == 0 {
            return Err(ConfigError::NonPositive {
                field: "parallel_branches",
                value: 0.0,
            });
        }
        ensure_positive("branch_overlap_delay", self.branch_overlap_delay)?;
        ensure_ordered("overlap_jitter", self.overlap_jitter)?;
        ensure_positive("overlap_jitter.min", self.overlap_jitter.0)?;
        ensure_finite(
            "branch_overlap_delay * overlap_jitter",
            self.branch_overlap_delay * self.overlap_jitter.1,
        )?;
        ensure_ordered("duration_jitter", self.duration_jitter)?;
        ensure_positive("duration_jitter.min", self.duration_jitter.0)?;
        ensure_finite(
            "total_growth_time * duration_jitter",
            self.total_growth_time * self.duration_jitter.1,
        )?;
        ensure_ordered("settle_delay", self.settle_delay)?;
        ensure_non_negative("settle_delay.min", self.settle_delay.0)?;
        ensure_positive("leaf_cluster_stagger", self.leaf_cluster_stagger)?;
        let (min, max) = self.leaves_per_cluster;
        ensure_ordered("leaves_per_cluster", (min as f32, max as f32))?;
        self.leaf_spread.validate()
    }
}

/// Everything needed to grow one tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub grammar: GrammarConfig,
    pub turtle: GrowthParams,
    pub mesh: MeshSettings,
    pub leaves: LeafConfig,
    pub timing: GrowthTiming,
    pub bark: BarkPalette,
    /// Fixed seed for reproducible trees; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl TreeConfig {
    /// Defaults with the preset's grammar and growth style.
    pub fn from_preset(preset: TreePreset) -> Self {
        let mut config = Self {
            grammar: GrammarConfig::from_preset(preset),
            ..Self::default()
        };
        if let Some(style) = GrowthStyle::for_preset(preset) {
            style.apply(&mut config);
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grammar.lsystem()?;
        self.turtle.validate()?;
        self.mesh.validate()?;
        self.leaves.validate()?;
        self.timing.validate()?;
        self.bark.validate()
    }
}

/// Parameter overrides a preset applies on top of the defaults.
#[derive(Debug)]
pub struct GrowthStyle {
    pub preset: TreePreset,
    pub base_length: f32,
    pub length_variance: f32,
    pub base_angle: f32,
    pub angle_variance: f32,
    pub branch_probability: f32,
    pub width_range: (f32, f32),
    pub bark_variance: f32,
    pub leaf_size_range: (f32, f32),
    pub total_growth_time: f32,
    pub parallel_branches: u32,
    pub branch_overlap_delay: f32,
}

pub static GROWTH_STYLES: &[GrowthStyle] = &[GrowthStyle {
    preset: TreePreset::Bonsai,
    base_length: 0.6,
    length_variance: 0.2,
    base_angle: 35.0,
    angle_variance: 20.0,
    branch_probability: 0.95,
    width_range: (0.02, 0.07),
    bark_variance: 0.2,
    leaf_size_range: (0.1, 0.25),
    total_growth_time: 8.0,
    parallel_branches: 3,
    branch_overlap_delay: 0.1,
}];

impl GrowthStyle {
    pub fn for_preset(preset: TreePreset) -> Option<&'static Self> {
        GROWTH_STYLES.iter().find(|s| s.preset == preset)
    }

    pub fn apply(&self, config: &mut TreeConfig) {
        let turtle = &mut config.turtle;
        turtle.base_length = self.base_length;
        turtle.length_variance = self.length_variance;
        turtle.base_angle = self.base_angle;
        turtle.angle_variance = self.angle_variance;
        turtle.branch_probability = self.branch_probability;
        turtle.taper.min_width = self.width_range.0;
        turtle.taper.max_width = self.width_range.1;

        config.bark.color_variance = self.bark_variance;

        // Leaf sizes are expressed as the largest size times a multiplier range.
        let (min, max) = self.leaf_size_range;
        config.leaves.leaf_size = max;
        config.leaves.size_variation = (min / max, 1.0);

        config.timing.total_growth_time = self.total_growth_time;
        config.timing.parallel_branches = self.parallel_branches;
        config.timing.branch_overlap_delay = self.branch_overlap_delay;
    }
}
