//! Growth scheduler: paces branch and leaf construction over simulated time,
//! plus the tree configuration that drives the whole pipeline.
//!
//! # Invariants
//! - Branches start in segment order and never more than `parallel_branches` at once.
//! - Leaf clusters are spawned only after every branch has completed.
//! - Timed waits resume relative to their scheduled time, not the frame time.

mod config;
mod material;
mod pipeline;
mod scheduler;

pub use config::{
    GROWTH_STYLES, GrammarConfig, GrowthStyle, GrowthTiming, MeshSettings, TreeConfig,
};
pub use material::BarkPalette;
pub use pipeline::TreePipeline;
pub use scheduler::{GrowthPhase, GrowthScheduler, GrowthStats, MIN_FRAME_DT};

pub fn crate_info() -> &'static str {
    "arbor-growth v0.1.0"
}
