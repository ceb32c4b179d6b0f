use arbor_common::{Color, NodeId, Transform};
use arbor_mesh::TubeMesh;
use serde::{Deserialize, Serialize};

/// Bark material chosen for one branch: base texture variant plus tint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BranchMaterial {
    pub variant: u32,
    pub tint: Color,
}

impl Default for BranchMaterial {
    fn default() -> Self {
        Self {
            variant: 0,
            tint: Color::WHITE,
        }
    }
}

/// Scene graph the growth scheduler builds into.
///
/// Hosts own node storage and id allocation. A node created with a parent
/// inherits the parent's transform.
pub trait SceneHost {
    fn create_node(&mut self, parent: Option<NodeId>) -> NodeId;

    /// Give `node` a mesh. Replaces any mesh it had.
    fn attach_mesh(&mut self, node: NodeId, mesh: TubeMesh, material: BranchMaterial);

    /// Local transform relative to the parent node.
    fn set_transform(&mut self, node: NodeId, transform: Transform);
}
