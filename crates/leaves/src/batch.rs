use arbor_common::Color;
use glam::{Mat4, Quat, Vec3};

use crate::config::InstanceProperties;

/// One placed leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafInstance {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    pub color: Color,
    pub atlas_variant: u32,
}

impl LeafInstance {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }
}

/// Instance attributes for one draw call, stored as parallel arrays.
///
/// Index `i` of every array describes the same leaf. Arrays never grow past
/// `capacity`.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafBatch {
    capacity: usize,
    /// `[x, y, z, atlas_variant]`.
    pub instance_data: Vec<[f32; 4]>,
    /// Quaternion `[x, y, z, w]`.
    pub rotations: Vec<[f32; 4]>,
    pub scales: Vec<f32>,
    pub colors: Vec<[f32; 4]>,
    /// Column-major model matrices.
    pub matrices: Vec<[[f32; 4]; 4]>,
}

impl LeafBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            instance_data: Vec::with_capacity(capacity),
            rotations: Vec::with_capacity(capacity),
            scales: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
            matrices: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn count(&self) -> usize {
        self.instance_data.len()
    }

    pub fn is_full(&self) -> bool {
        self.count() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.instance_data.is_empty()
    }

    /// Append a leaf. Returns `false` without writing when the batch is full.
    pub fn push(&mut self, leaf: &LeafInstance) -> bool {
        if self.is_full() {
            return false;
        }
        let p = leaf.position;
        self.instance_data
            .push([p.x, p.y, p.z, leaf.atlas_variant as f32]);
        self.rotations.push(leaf.rotation.to_array());
        self.scales.push(leaf.scale);
        self.colors.push(leaf.color.to_array());
        self.matrices
            .push(leaf.model_matrix().to_cols_array_2d());
        true
    }

    pub fn instance_data_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instance_data)
    }

    pub fn rotation_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.rotations)
    }

    pub fn scale_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.scales)
    }

    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn matrix_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.matrices)
    }
}

/// Destination for instanced leaf draws, implemented by the rendering host.
pub trait InstancedDrawSink {
    fn draw_instanced(&mut self, batch: &LeafBatch, properties: &InstanceProperties);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(x: f32) -> LeafInstance {
        LeafInstance {
            position: Vec3::new(x, 1.0, 2.0),
            rotation: Quat::IDENTITY,
            scale: 0.5,
            color: Color::rgb(0.8, 0.9, 0.4),
            atlas_variant: 3,
        }
    }

    #[test]
    fn push_fills_parallel_arrays() {
        let mut batch = LeafBatch::with_capacity(4);
        assert!(batch.push(&leaf(7.0)));
        assert_eq!(batch.count(), 1);
        assert_eq!(batch.instance_data[0], [7.0, 1.0, 2.0, 3.0]);
        assert_eq!(batch.rotations[0], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(batch.scales[0], 0.5);
        assert_eq!(batch.colors[0], [0.8, 0.9, 0.4, 1.0]);
        assert_eq!(batch.matrices[0][3], [7.0, 1.0, 2.0, 1.0]);
        assert_eq!(batch.matrices[0][0], [0.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn full_batch_rejects_push() {
        let mut batch = LeafBatch::with_capacity(2);
        assert!(batch.push(&leaf(0.0)));
        assert!(batch.push(&leaf(1.0)));
        assert!(batch.is_full());
        assert!(!batch.push(&leaf(2.0)));
        assert_eq!(batch.count(), 2);
    }

    #[test]
    fn byte_views_cover_every_instance() {
        let mut batch = LeafBatch::with_capacity(3);
        batch.push(&leaf(0.0));
        batch.push(&leaf(1.0));
        assert_eq!(batch.instance_data_bytes().len(), 2 * 16);
        assert_eq!(batch.scale_bytes().len(), 2 * 4);
        assert_eq!(batch.rotation_bytes().len(), batch.color_bytes().len());
        assert_eq!(batch.matrix_bytes().len(), 2 * 64);
    }
}
