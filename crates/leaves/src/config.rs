use arbor_common::ConfigError;
use arbor_common::error::{ensure_ordered, ensure_positive, ensure_variance};
use serde::{Deserialize, Serialize};

/// Per-instance shader property names a draw sink binds batch arrays to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceProperties {
    pub data: String,
    pub rotation: String,
    pub scale: String,
    pub color: String,
}

impl Default for InstanceProperties {
    fn default() -> Self {
        Self {
            data: "_InstanceData".into(),
            rotation: "_InstanceRotation".into(),
            scale: "_InstanceScale".into(),
            color: "_InstanceColor".into(),
        }
    }
}

/// Per-channel tint ranges sampled for every leaf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TintRanges {
    pub r: (f32, f32),
    pub g: (f32, f32),
    pub b: (f32, f32),
}

impl Default for TintRanges {
    fn default() -> Self {
        Self {
            r: (0.7, 1.0),
            g: (0.8, 1.0),
            b: (0.3, 0.7),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafConfig {
    pub leaf_size: f32,
    /// Multiplier range applied to `leaf_size`.
    pub size_variation: (f32, f32),
    /// Number of leaf textures in the atlas. Zero behaves like one.
    pub atlas_variations: u32,
    pub max_leaves_per_batch: usize,
    pub tint: TintRanges,
    /// Random euler offset applied on top of the look rotation, per axis.
    pub orientation_jitter_degrees: f32,
    pub properties: InstanceProperties,
}

impl Default for LeafConfig {
    fn default() -> Self {
        Self {
            leaf_size: 0.5,
            size_variation: (0.8, 1.2),
            atlas_variations: 4,
            max_leaves_per_batch: 1023,
            tint: TintRanges::default(),
            orientation_jitter_degrees: 20.0,
            properties: InstanceProperties::default(),
        }
    }
}

impl LeafConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_leaves_per_batch == 0 {
            return Err(ConfigError::ZeroBatchCapacity);
        }
        ensure_positive("leaf_size", self.leaf_size)?;
        ensure_positive("size_variation.min", self.size_variation.0)?;
        ensure_ordered("size_variation", self.size_variation)?;
        ensure_ordered("tint.r", self.tint.r)?;
        ensure_ordered("tint.g", self.tint.g)?;
        ensure_ordered("tint.b", self.tint.b)?;
        ensure_variance(
            "orientation_jitter_degrees",
            self.orientation_jitter_degrees,
        )
    }
}
