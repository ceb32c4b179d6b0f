use arbor_common::math::look_rotation;
use arbor_common::sampling::{in_range, jitter, unit_vector};
use arbor_common::{Color, ConfigError};
use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use rand::rngs::StdRng;

use crate::batch::{InstancedDrawSink, LeafBatch, LeafInstance};
use crate::config::LeafConfig;
use crate::spread::SpreadPolicy;

/// Owns every placed leaf and the instancing batches derived from them.
///
/// Batches are rebuilt from scratch after every mutation, so
/// [`LeafBatcher::batches`] always reflects [`LeafBatcher::leaves`].
#[derive(Debug, Clone)]
pub struct LeafBatcher {
    config: LeafConfig,
    rng: StdRng,
    leaves: Vec<LeafInstance>,
    batches: Vec<LeafBatch>,
}

impl LeafBatcher {
    pub fn new(config: LeafConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            leaves: Vec::new(),
            batches: Vec::new(),
        })
    }

    pub fn config(&self) -> &LeafConfig {
        &self.config
    }

    /// Place one leaf facing `normal` (`+Y` when zero).
    pub fn add_leaf(&mut self, position: Vec3, normal: Vec3) {
        let leaf = self.make_leaf(position, normal);
        self.leaves.push(leaf);
        self.rebuild_batches();
    }

    /// Place a batch of leaves with a single rebuild.
    pub fn add_leaves(&mut self, placements: impl IntoIterator<Item = (Vec3, Vec3)>) {
        for (position, normal) in placements {
            let leaf = self.make_leaf(position, normal);
            self.leaves.push(leaf);
        }
        self.rebuild_batches();
    }

    /// Grow `count` leaves around an anchor. Returns the number placed.
    pub fn add_leaf_cluster(
        &mut self,
        anchor: Vec3,
        direction: Vec3,
        count: usize,
        spread: &SpreadPolicy,
    ) -> usize {
        for _ in 0..count {
            let (position, normal) = spread.place(anchor, direction, &mut self.rng);
            let leaf = self.make_leaf(position, normal);
            self.leaves.push(leaf);
        }
        self.rebuild_batches();
        tracing::debug!(
            count,
            total = self.leaves.len(),
            x = anchor.x,
            y = anchor.y,
            z = anchor.z,
            "leaf cluster added"
        );
        count
    }

    pub fn clear(&mut self) {
        self.leaves.clear();
        self.batches.clear();
        tracing::debug!("leaves cleared");
    }

    /// Repack every leaf into batches of at most `max_leaves_per_batch`.
    pub fn rebuild_batches(&mut self) -> &[LeafBatch] {
        let capacity = self.config.max_leaves_per_batch;
        self.batches = self
            .leaves
            .chunks(capacity)
            .map(|chunk| {
                let mut batch = LeafBatch::with_capacity(capacity);
                for leaf in chunk {
                    batch.push(leaf);
                }
                batch
            })
            .collect();
        tracing::trace!(
            batches = self.batches.len(),
            leaves = self.leaves.len(),
            "batches rebuilt"
        );
        &self.batches
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn batches(&self) -> &[LeafBatch] {
        &self.batches
    }

    pub fn leaves(&self) -> &[LeafInstance] {
        &self.leaves
    }

    /// Hand every non-empty batch to `sink`. Returns the number of draws.
    pub fn submit(&self, sink: &mut impl InstancedDrawSink) -> usize {
        let mut draws = 0;
        for batch in self.batches.iter().filter(|b| !b.is_empty()) {
            sink.draw_instanced(batch, &self.config.properties);
            draws += 1;
        }
        draws
    }

    fn make_leaf(&mut self, position: Vec3, normal: Vec3) -> LeafInstance {
        let normal = normal.try_normalize().unwrap_or(Vec3::Y);
        let up = unit_vector(&mut self.rng);
        let facing = look_rotation(normal, up);

        let max = self.config.orientation_jitter_degrees.to_radians();
        let jitter = Quat::from_euler(
            EulerRot::XYZ,
            jitter(&mut self.rng, 0.0, max),
            jitter(&mut self.rng, 0.0, max),
            jitter(&mut self.rng, 0.0, max),
        );

        let scale = in_range(&mut self.rng, self.config.size_variation) * self.config.leaf_size;
        let tint = self.config.tint;
        let color = Color::rgb(
            in_range(&mut self.rng, tint.r),
            in_range(&mut self.rng, tint.g),
            in_range(&mut self.rng, tint.b),
        );
        let atlas_variant = self
            .rng
            .random_range(0..self.config.atlas_variations.max(1));

        LeafInstance {
            position,
            rotation: (facing * jitter).normalize(),
            scale,
            color,
            atlas_variant,
        }
    }
}
