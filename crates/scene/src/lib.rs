//! Scene host boundary: the trait the growth scheduler builds into, an
//! in-memory recording host, a debug text summary and OBJ export.
//!
//! # Invariants
//! - Node ids are allocated by the host and never reused.
//! - The recording host's event log is append-only between drains.

mod host;
mod obj;
mod recording;
mod renderer;

pub use host::{BranchMaterial, SceneHost};
pub use obj::{write_obj, write_scene_obj};
pub use recording::{RecordingScene, SceneEvent, SceneNode};
pub use renderer::{DebugTextRenderer, SceneRenderer};

pub fn crate_info() -> &'static str {
    "arbor-scene v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
