//! Turtle interpreter: walks an L-system symbol sequence and emits branch
//! segments plus leaf anchors.
//!
//! # Invariants
//! - `[` pushes the full turtle state and `]` restores it exactly.
//! - A `]` with an empty stack is counted and ignored; open `[` are closed at the end.
//! - Segments are emitted in sequence order with dense indices starting at 0.
//! - All randomness comes from the caller's RNG, drawn per symbol in order.

mod interpreter;
mod params;
mod skeleton;

pub use interpreter::TurtleInterpreter;
pub use params::{ControlJitter, GrowthParams, TaperPolicy};
pub use skeleton::{InterpretStats, Interpretation, LeafAnchor, Segment, TurtleState};

pub fn crate_info() -> &'static str {
    "arbor-turtle v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("turtle"));
    }
}
