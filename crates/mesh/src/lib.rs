//! Branch mesh builder: sweeps tapered tubes along quadratic bezier curves.
//!
//! # Invariants
//! - A tube with `c` curve and `r` radial segments has `(c + 1) * r` vertices.
//! - Ring radius never increases with height inside the taper range.
//! - Finite inputs never produce non-finite vertices.

mod bezier;
mod quad;
mod tube;

pub use bezier::{TANGENT_STEP, quadratic_bezier, tangent};
pub use quad::leaf_quad;
pub use tube::{
    DEFAULT_CURVE_SEGMENTS, DEFAULT_RADIAL_SEGMENTS, Ring, TubeMesh, TubeSpec, TubeVertex,
    build_tube_mesh,
};

pub fn crate_info() -> &'static str {
    "arbor-mesh v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("mesh"));
    }
}
