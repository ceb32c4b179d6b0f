use std::collections::BTreeMap;

use arbor_common::{NodeId, Transform};
use arbor_leaves::{InstanceProperties, InstancedDrawSink, LeafBatch};
use arbor_mesh::TubeMesh;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::host::{BranchMaterial, SceneHost};

/// An event record produced by every call into the recording host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    NodeCreated {
        id: NodeId,
        parent: Option<NodeId>,
    },
    MeshAttached {
        id: NodeId,
        vertices: usize,
        triangles: usize,
        material: BranchMaterial,
    },
    TransformSet {
        id: NodeId,
        old: Transform,
        new: Transform,
    },
    InstancedDraw {
        instances: usize,
        data_property: String,
    },
}

/// Per-node data stored by the recording host.
#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    pub parent: Option<NodeId>,
    pub transform: Transform,
    pub mesh: Option<(TubeMesh, BranchMaterial)>,
}

/// In-memory [`SceneHost`] and [`InstancedDrawSink`].
///
/// Uses BTreeMap so node iteration follows creation order. Every call is
/// appended to the event log; calls naming an unknown node are logged and
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct RecordingScene {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u64,
    event_log: Vec<SceneEvent>,
    instanced_draws: usize,
    instances_drawn: usize,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, SceneNode> {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(move |(_, node)| node.parent == Some(parent))
            .map(|(id, _)| *id)
    }

    pub fn mesh_count(&self) -> usize {
        self.nodes.values().filter(|n| n.mesh.is_some()).count()
    }

    pub fn triangle_count(&self) -> usize {
        self.nodes
            .values()
            .filter_map(|n| n.mesh.as_ref())
            .map(|(mesh, _)| mesh.triangle_count())
            .sum()
    }

    pub fn instanced_draws(&self) -> usize {
        self.instanced_draws
    }

    pub fn instances_drawn(&self) -> usize {
        self.instances_drawn
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Transform from node-local to world space, composed through parents.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = self.nodes.get(&id);
        // Parents are always created before children, so the walk terminates.
        while let Some(node) = current {
            matrix = node.transform.to_matrix() * matrix;
            current = node.parent.and_then(|p| self.nodes.get(&p));
        }
        matrix
    }

    /// Every attached mesh transformed into world space and merged.
    pub fn combined_mesh(&self) -> TubeMesh {
        let mut combined = TubeMesh::default();
        for (id, node) in &self.nodes {
            let Some((mesh, _)) = &node.mesh else {
                continue;
            };
            let matrix = self.world_matrix(*id);
            let mut placed = mesh.clone();
            for v in &mut placed.vertices {
                v.position = matrix.transform_point3(Vec3::from(v.position)).to_array();
                v.normal = matrix
                    .transform_vector3(Vec3::from(v.normal))
                    .try_normalize()
                    .unwrap_or(Vec3::Y)
                    .to_array();
            }
            for ring in &mut placed.rings {
                ring.center = matrix.transform_point3(ring.center);
            }
            combined.merge(&placed);
        }
        combined
    }

    /// Deterministic hash of node structure, transforms and mesh sizes.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mut mix = |bytes: &[u8]| {
            for &b in bytes {
                h ^= b as u64;
                h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for (id, node) in &self.nodes {
            mix(&id.0.to_le_bytes());
            mix(&node.parent.map_or(u64::MAX, |p| p.0).to_le_bytes());
            let t = node.transform;
            let components = t
                .position
                .to_array()
                .into_iter()
                .chain(t.rotation.to_array())
                .chain(t.scale.to_array());
            for c in components {
                mix(&c.to_le_bytes());
            }
            if let Some((mesh, material)) = &node.mesh {
                mix(&(mesh.vertex_count() as u64).to_le_bytes());
                mix(mesh.vertex_bytes());
                mix(&material.variant.to_le_bytes());
            }
        }
        h
    }
}

impl SceneHost for RecordingScene {
    fn create_node(&mut self, parent: Option<NodeId>) -> NodeId {
        let parent = parent.filter(|p| {
            let known = self.nodes.contains_key(p);
            if !known {
                tracing::warn!(parent = p.0, "unknown parent, node created at root");
            }
            known
        });
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SceneNode {
                parent,
                ..SceneNode::default()
            },
        );
        self.event_log.push(SceneEvent::NodeCreated { id, parent });
        id
    }

    fn attach_mesh(&mut self, node: NodeId, mesh: TubeMesh, material: BranchMaterial) {
        let Some(data) = self.nodes.get_mut(&node) else {
            tracing::warn!(node = node.0, "attach_mesh on unknown node ignored");
            return;
        };
        self.event_log.push(SceneEvent::MeshAttached {
            id: node,
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
            material,
        });
        data.mesh = Some((mesh, material));
    }

    fn set_transform(&mut self, node: NodeId, transform: Transform) {
        let Some(data) = self.nodes.get_mut(&node) else {
            tracing::warn!(node = node.0, "set_transform on unknown node ignored");
            return;
        };
        let old = data.transform;
        data.transform = transform;
        self.event_log.push(SceneEvent::TransformSet {
            id: node,
            old,
            new: transform,
        });
    }
}

impl InstancedDrawSink for RecordingScene {
    fn draw_instanced(&mut self, batch: &LeafBatch, properties: &InstanceProperties) {
        self.instanced_draws += 1;
        self.instances_drawn += batch.count();
        self.event_log.push(SceneEvent::InstancedDraw {
            instances: batch.count(),
            data_property: properties.data.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_mesh::{TubeSpec, build_tube_mesh};

    fn small_tube() -> TubeMesh {
        let spec = TubeSpec::new(Vec3::ZERO, Vec3::Y, Vec3::new(0.0, 2.0, 0.0), 0.2);
        build_tube_mesh(&spec.with_segments(2, 3))
    }

    #[test]
    fn scene_starts_empty() {
        let scene = RecordingScene::new();
        assert_eq!(scene.node_count(), 0);
        assert!(scene.events().is_empty());
    }

    #[test]
    fn ids_are_sequential_and_parents_recorded() {
        let mut scene = RecordingScene::new();
        let root = scene.create_node(None);
        let a = scene.create_node(Some(root));
        let b = scene.create_node(Some(root));
        assert_eq!((root.0, a.0, b.0), (0, 1, 2));
        assert_eq!(scene.children(root).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(scene.node(a).unwrap().parent, Some(root));
    }

    #[test]
    fn unknown_parent_falls_back_to_root() {
        let mut scene = RecordingScene::new();
        let id = scene.create_node(Some(NodeId(99)));
        assert_eq!(scene.node(id).unwrap().parent, None);
    }

    #[test]
    fn calls_are_logged_in_order() {
        let mut scene = RecordingScene::new();
        let id = scene.create_node(None);
        scene.attach_mesh(id, small_tube(), BranchMaterial::default());
        scene.set_transform(id, Transform::from_position(Vec3::X));
        let events = scene.drain_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], SceneEvent::NodeCreated { .. }));
        assert!(matches!(events[1], SceneEvent::MeshAttached { triangles: 24, .. }));
        assert!(matches!(events[2], SceneEvent::TransformSet { .. }));
        assert!(scene.events().is_empty());
    }

    #[test]
    fn unknown_nodes_are_ignored() {
        let mut scene = RecordingScene::new();
        scene.attach_mesh(NodeId(5), small_tube(), BranchMaterial::default());
        scene.set_transform(NodeId(5), Transform::default());
        assert!(scene.events().is_empty());
        assert_eq!(scene.mesh_count(), 0);
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut scene = RecordingScene::new();
        let root = scene.create_node(None);
        let child = scene.create_node(Some(root));
        scene.set_transform(root, Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));
        scene.set_transform(
            child,
            Transform::from_position(Vec3::new(0.0, 2.0, 0.0)).with_uniform_scale(0.5),
        );
        let p = scene.world_matrix(child).transform_point3(Vec3::new(0.0, 2.0, 0.0));
        assert!((p - Vec3::new(1.0, 3.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn combined_mesh_is_in_world_space() {
        let mut scene = RecordingScene::new();
        let id = scene.create_node(None);
        scene.attach_mesh(id, small_tube(), BranchMaterial::default());
        scene.set_transform(id, Transform::from_position(Vec3::new(0.0, 10.0, 0.0)));
        let (lo, hi) = scene.combined_mesh().bounds().unwrap();
        assert!(lo.y >= 10.0 - 1e-5 && hi.y <= 12.0 + 1e-5);
        assert_eq!(scene.triangle_count(), 24);
    }

    #[test]
    fn state_hash_tracks_content() {
        let build = |x: f32| {
            let mut scene = RecordingScene::new();
            let id = scene.create_node(None);
            scene.set_transform(id, Transform::from_position(Vec3::new(x, 0.0, 0.0)));
            scene
        };
        assert_eq!(build(1.0).state_hash(), build(1.0).state_hash());
        assert_ne!(build(1.0).state_hash(), build(2.0).state_hash());
    }
}
