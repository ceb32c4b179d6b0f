use std::fmt::Write;

use crate::recording::RecordingScene;

/// Renderer-agnostic interface over a recorded scene.
pub trait SceneRenderer {
    type Output;

    fn render(&self, scene: &RecordingScene) -> Self::Output;
}

/// Human-readable summary of a recorded scene, one line per node.
///
/// Useful for CLI output, logging, and testing the host interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Stop listing nodes after this many; `None` lists all.
    pub max_nodes: Option<usize>,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_nodes(max_nodes: usize) -> Self {
        Self {
            max_nodes: Some(max_nodes),
        }
    }
}

impl SceneRenderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &RecordingScene) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Scene (nodes={}, meshes={}, triangles={}) ===",
            scene.node_count(),
            scene.mesh_count(),
            scene.triangle_count()
        );
        let _ = writeln!(
            out,
            "Leaf draws: {} ({} instances)",
            scene.instanced_draws(),
            scene.instances_drawn()
        );

        let limit = self.max_nodes.unwrap_or(usize::MAX);
        for (id, node) in scene.nodes().iter().take(limit) {
            let p = node.transform.position;
            let parent = node
                .parent
                .map_or_else(|| "-".to_string(), |n| n.0.to_string());
            let _ = write!(
                out,
                "  [{:>4}] parent={parent:>4} pos=({:.2}, {:.2}, {:.2}) scale={:.2}",
                id.0, p.x, p.y, p.z, node.transform.scale.x
            );
            if let Some((mesh, material)) = &node.mesh {
                let t = material.tint;
                let _ = write!(
                    out,
                    " mesh={}v/{}t bark={} tint=({:.2}, {:.2}, {:.2})",
                    mesh.vertex_count(),
                    mesh.triangle_count(),
                    material.variant,
                    t.r,
                    t.g,
                    t.b
                );
            }
            out.push('\n');
        }
        if scene.node_count() > limit {
            let _ = writeln!(out, "  ... {} more", scene.node_count() - limit);
        }
        out
    }
}
