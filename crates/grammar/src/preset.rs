use serde::{Deserialize, Serialize};

use crate::engine::LSystem;
use crate::rule::{Rule, RuleSet};

/// Named grammar presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreePreset {
    Maple,
    Pine,
    Fern,
    Bonsai,
}

/// Static grammar data for a preset.
#[derive(Debug)]
pub struct PresetDefinition {
    pub preset: TreePreset,
    pub name: &'static str,
    pub axiom: &'static str,
    pub rules: &'static [(char, &'static str)],
    pub iterations: u32,
}

pub static PRESETS: &[PresetDefinition] = &[
    PresetDefinition {
        preset: TreePreset::Maple,
        name: "maple",
        axiom: "X",
        rules: &[('X', "F[+X][-X]FX"), ('F', "FF")],
        iterations: 5,
    },
    PresetDefinition {
        preset: TreePreset::Pine,
        name: "pine",
        axiom: "X",
        rules: &[('X', "F[+X]F[-X]+X"), ('F', "FF")],
        iterations: 6,
    },
    PresetDefinition {
        preset: TreePreset::Fern,
        name: "fern",
        axiom: "X",
        rules: &[('X', "F[+X]F[-X]FX"), ('F', "FF")],
        iterations: 4,
    },
    PresetDefinition {
        preset: TreePreset::Bonsai,
        name: "bonsai",
        axiom: "X",
        rules: &[('X', "F[+X][-X]FX"), ('F', "FF")],
        iterations: 4,
    },
];

impl TreePreset {
    pub fn definition(self) -> &'static PresetDefinition {
        PRESETS
            .iter()
            .find(|d| d.preset == self)
            .unwrap_or(&PRESETS[0])
    }

    pub fn name(self) -> &'static str {
        self.definition().name
    }

    /// Case-insensitive lookup by preset name.
    pub fn from_name(name: &str) -> Option<Self> {
        PRESETS
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name.trim()))
            .map(|d| d.preset)
    }

    /// Grammar for this preset.
    pub fn lsystem(self) -> LSystem {
        let def = self.definition();
        LSystem {
            axiom: def.axiom.to_string(),
            rules: def
                .rules
                .iter()
                .map(|&(symbol, replacement)| Rule::new(symbol, replacement))
                .collect::<RuleSet>(),
            iterations: def.iterations,
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        PRESETS.iter().map(|d| d.preset)
    }
}
