//! Shared types for the arbor workspace: transforms, node ids, colors,
//! configuration errors and small math/sampling helpers.
//!
//! # Invariants
//! - Helpers never return non-finite values for finite inputs.
//! - Configuration problems are the only errors surfaced by the core crates.

pub mod color;
pub mod error;
pub mod math;
pub mod sampling;
pub mod types;

pub use color::Color;
pub use error::ConfigError;
pub use types::{NodeId, Transform};

pub fn crate_info() -> &'static str {
    "arbor-common v0.1.0"
}
