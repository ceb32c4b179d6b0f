use std::f32::consts::TAU;

use arbor_common::ConfigError;
use arbor_common::error::ensure_positive;
use arbor_common::math::{inverse_lerp, lerp};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::bezier::{quadratic_bezier, tangent};

pub const DEFAULT_CURVE_SEGMENTS: u32 = 12;
pub const DEFAULT_RADIAL_SEGMENTS: u32 = 8;

/// Radius multiplier at the top of the height range.
const TOP_RADIUS_SCALE: f32 = 0.2;

/// GPU-ready tube vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Center and radius of one cross-section ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub center: Vec3,
    pub radius: f32,
}

/// Input to [`build_tube_mesh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeSpec {
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
    /// Diameter at `base_height`.
    pub base_width: f32,
    /// Height range the radius tapers over; heights are in the same frame
    /// as the curve points.
    pub base_height: f32,
    pub max_height: f32,
    pub curve_segments: u32,
    pub radial_segments: u32,
}

impl TubeSpec {
    /// Default tessellation and a height range from 0 to the curve top.
    pub fn new(start: Vec3, control: Vec3, end: Vec3, base_width: f32) -> Self {
        Self {
            start,
            control,
            end,
            base_width,
            base_height: 0.0,
            max_height: start.y.max(end.y),
            curve_segments: DEFAULT_CURVE_SEGMENTS,
            radial_segments: DEFAULT_RADIAL_SEGMENTS,
        }
    }

    pub fn with_height_range(mut self, base_height: f32, max_height: f32) -> Self {
        self.base_height = base_height;
        self.max_height = max_height;
        self
    }

    pub fn with_segments(mut self, curve_segments: u32, radial_segments: u32) -> Self {
        self.curve_segments = curve_segments;
        self.radial_segments = radial_segments;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.curve_segments < 1 {
            return Err(ConfigError::TooFewSegments {
                field: "curve_segments",
                min: 1,
                value: self.curve_segments,
            });
        }
        if self.radial_segments < 3 {
            return Err(ConfigError::TooFewSegments {
                field: "radial_segments",
                min: 3,
                value: self.radial_segments,
            });
        }
        ensure_positive("base_width", self.base_width)
    }

    /// Ring radius at a given height.
    pub fn radius_at(&self, height: f32) -> f32 {
        let ratio = inverse_lerp(self.base_height, self.max_height, height);
        self.base_width.max(0.0) * 0.5 * lerp(1.0, TOP_RADIUS_SCALE, ratio)
    }
}

/// Indexed triangle mesh with the ring records it was swept from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TubeMesh {
    pub vertices: Vec<TubeVertex>,
    pub indices: Vec<u32>,
    pub rings: Vec<Ring>,
}

impl TubeMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append another mesh, rebasing its indices.
    pub fn merge(&mut self, other: &TubeMesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
        self.rings.extend_from_slice(&other.rings);
    }

    /// Move every vertex and ring center by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) + offset).to_array();
        }
        for ring in &mut self.rings {
            ring.center += offset;
        }
    }

    /// Axis-aligned bounds, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from(v.position));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(|v| {
            v.position.iter().chain(&v.normal).chain(&v.uv).all(|c| c.is_finite())
        })
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Sweep a tapered tube along the quadratic bezier described by `spec`.
///
/// Segment counts below their minimums are raised to them; call
/// [`TubeSpec::validate`] first to reject such specs instead. Each quad
/// between neighbouring rings is emitted with both windings.
pub fn build_tube_mesh(spec: &TubeSpec) -> TubeMesh {
    let curve = spec.curve_segments.max(1);
    let radial = spec.radial_segments.max(3);

    let ring_count = (curve + 1) as usize;
    let mut mesh = TubeMesh {
        vertices: Vec::with_capacity(ring_count * radial as usize),
        indices: Vec::with_capacity((curve * radial * 12) as usize),
        rings: Vec::with_capacity(ring_count),
    };

    for i in 0..=curve {
        let t = i as f32 / curve as f32;
        let center = quadratic_bezier(t, spec.start, spec.control, spec.end);
        let forward = tangent(t, spec.start, spec.control, spec.end);
        let (right, up) = ring_basis(forward);
        let radius = spec.radius_at(center.y);

        for j in 0..radial {
            let angle = j as f32 / radial as f32 * TAU;
            let normal = right * angle.cos() + up * angle.sin();
            mesh.vertices.push(TubeVertex {
                position: (center + normal * radius).to_array(),
                normal: normal.to_array(),
                uv: [j as f32 / radial as f32, t],
            });
        }
        mesh.rings.push(Ring { center, radius });
    }

    for i in 0..curve {
        for j in 0..radial {
            let a = i * radial + j;
            let b = a + radial;
            let c = i * radial + (j + 1) % radial;
            let d = c + radial;
            mesh.indices.extend_from_slice(&[a, b, c, b, d, c]);
            mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    tracing::trace!(
        vertices = mesh.vertices.len(),
        triangles = mesh.triangle_count(),
        "tube mesh built"
    );
    mesh
}

/// Unit vectors spanning the ring plane perpendicular to `forward`.
fn ring_basis(forward: Vec3) -> (Vec3, Vec3) {
    let reference = if forward.dot(Vec3::Y).abs() > 0.99 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let right = forward.cross(reference).try_normalize().unwrap_or(Vec3::X);
    let up = right.cross(forward).try_normalize().unwrap_or(Vec3::Z);
    (right, up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn vertical() -> TubeSpec {
        TubeSpec::new(Vec3::ZERO, Vec3::Y, Vec3::new(0.0, 2.0, 0.0), 0.2)
            .with_height_range(0.0, 2.0)
    }

    #[test]
    fn straight_vertical_tube_rings() {
        let mesh = build_tube_mesh(&vertical());
        assert_eq!(mesh.rings.len(), 13);
        let mut last_radius = f32::MAX;
        for ring in &mesh.rings {
            assert!(ring.center.x.abs() < 1e-5 && ring.center.z.abs() < 1e-5);
            assert!(ring.center.y >= -1e-5 && ring.center.y <= 2.0 + 1e-5);
            assert!(ring.radius < last_radius);
            last_radius = ring.radius;
        }
        assert!((mesh.rings[0].radius - 0.1).abs() < 1e-6);
        assert!((mesh.rings[12].radius - 0.02).abs() < 1e-6);
    }

    #[test]
    fn vertex_and_index_counts() {
        let spec = vertical().with_segments(4, 6);
        let mesh = build_tube_mesh(&spec);
        assert_eq!(mesh.vertex_count(), 5 * 6);
        assert_eq!(mesh.triangle_count(), 4 * 6 * 4);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn both_windings_are_present() {
        let mesh = build_tube_mesh(&vertical().with_segments(2, 4));
        let tris: HashSet<[u32; 3]> = mesh
            .indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        for t in &tris {
            let flipped = [t[0], t[2], t[1]];
            let rotations = [
                flipped,
                [flipped[1], flipped[2], flipped[0]],
                [flipped[2], flipped[0], flipped[1]],
            ];
            assert!(rotations.iter().any(|r| tris.contains(r)), "{t:?} has no mirror");
        }
    }

    #[test]
    fn normals_are_radial_and_unit() {
        let mesh = build_tube_mesh(&vertical());
        for (i, v) in mesh.vertices.iter().enumerate() {
            let ring = mesh.rings[i / 8];
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
            let radial = Vec3::from(v.position) - ring.center;
            assert!(radial.normalize().dot(n) > 0.999);
            assert!(n.dot(Vec3::Y).abs() < 1e-4);
        }
    }

    #[test]
    fn uvs_span_ring_and_curve() {
        let mesh = build_tube_mesh(&vertical().with_segments(2, 4));
        assert_eq!(mesh.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(mesh.vertices[3].uv, [0.75, 0.0]);
        assert_eq!(mesh.vertices[11].uv, [0.75, 1.0]);
    }

    #[test]
    fn zero_length_segment_stays_finite() {
        let p = Vec3::new(1.0, 3.0, -2.0);
        let mesh = build_tube_mesh(&TubeSpec::new(p, p, p, 0.1));
        assert!(mesh.is_finite());
        assert_eq!(mesh.rings.len(), 13);
    }

    #[test]
    fn flat_height_range_uses_full_radius() {
        let spec = TubeSpec::new(Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0), 0.4)
            .with_height_range(0.0, 0.0);
        let mesh = build_tube_mesh(&spec);
        assert!(mesh.is_finite());
        assert!(mesh.rings.iter().all(|r| (r.radius - 0.2).abs() < 1e-6));
    }

    #[test]
    fn validate_rejects_low_tessellation_and_width() {
        assert!(vertical().validate().is_ok());
        assert!(matches!(
            vertical().with_segments(0, 8).validate(),
            Err(ConfigError::TooFewSegments { field: "curve_segments", .. })
        ));
        assert!(matches!(
            vertical().with_segments(4, 2).validate(),
            Err(ConfigError::TooFewSegments { field: "radial_segments", .. })
        ));
        let mut thin = vertical();
        thin.base_width = 0.0;
        assert!(thin.validate().is_err());
    }

    #[test]
    fn merge_rebases_indices() {
        let a = build_tube_mesh(&vertical().with_segments(1, 3));
        let mut merged = a.clone();
        merged.merge(&a);
        assert_eq!(merged.vertex_count(), a.vertex_count() * 2);
        assert_eq!(merged.indices.len(), a.indices.len() * 2);
        let offset = a.vertex_count() as u32;
        assert_eq!(merged.indices[a.indices.len()], a.indices[0] + offset);
    }

    #[test]
    fn translate_moves_bounds() {
        let mut mesh = build_tube_mesh(&vertical());
        let (lo, _) = mesh.bounds().unwrap();
        mesh.translate(Vec3::new(5.0, 0.0, 0.0));
        let (moved, _) = mesh.bounds().unwrap();
        assert!((moved.x - lo.x - 5.0).abs() < 1e-5);
        assert_eq!(TubeMesh::default().bounds(), None);
    }

    #[test]
    fn byte_views_match_lengths() {
        let mesh = build_tube_mesh(&vertical());
        assert_eq!(
            mesh.vertex_bytes().len(),
            mesh.vertex_count() * std::mem::size_of::<TubeVertex>()
        );
        assert_eq!(mesh.index_bytes().len(), mesh.indices.len() * 4);
    }
}
