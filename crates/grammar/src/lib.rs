//! Grammar engine: L-system string rewriting and the preset table.
//!
//! # Invariants
//! - Rewriting is a pure function of (axiom, rules, iterations).
//! - Symbols without a rule are copied unchanged.
//! - The first rule registered for a symbol wins; later duplicates are dropped.
//! - Presets are data in [`PRESETS`], never branches inside the engine.

mod engine;
mod preset;
mod rule;

pub use engine::{LSystem, MAX_ITERATIONS, generate, rewrite_once};
pub use preset::{PRESETS, PresetDefinition, TreePreset};
pub use rule::{Rule, RuleSet};

pub fn crate_info() -> &'static str {
    "arbor-grammar v0.1.0"
}
