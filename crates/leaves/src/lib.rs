//! Leaf batcher: places leaf instances and packs them into fixed-capacity
//! instancing batches for a host draw sink.
//!
//! # Invariants
//! - No batch holds more than `max_leaves_per_batch` instances.
//! - Batches are a pure function of the leaf list, in insertion order.
//! - `leaf_count()` and `batch_count()` agree with the last rebuild.

mod batch;
mod batcher;
mod config;
mod spread;

pub use batch::{InstancedDrawSink, LeafBatch, LeafInstance};
pub use batcher::LeafBatcher;
pub use config::{InstanceProperties, LeafConfig, TintRanges};
pub use spread::SpreadPolicy;

pub fn crate_info() -> &'static str {
    "arbor-leaves v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("leaves"));
    }
}
