use std::collections::HashMap;

use arbor_common::ConfigError;
use serde::{Deserialize, Serialize};

use crate::rule::RuleSet;

/// Upper bound on rewriting passes. Sequences grow exponentially per pass.
pub const MAX_ITERATIONS: u32 = 10;

/// Rewrite `axiom` through `rules` for `iterations` passes.
///
/// Every symbol with a rule is replaced by its replacement; every other
/// symbol is copied unchanged. `iterations` above [`MAX_ITERATIONS`] is
/// clamped. The result depends only on the inputs.
pub fn generate(axiom: &str, rules: &RuleSet, iterations: u32) -> String {
    let iterations = clamp_iterations(iterations);
    let mut current = axiom.to_string();
    for pass in 0..iterations {
        current = rewrite_once(&current, rules);
        tracing::trace!(pass, len = current.len(), "rewrite pass");
    }
    current
}

/// One parallel rewriting pass.
pub fn rewrite_once(sequence: &str, rules: &RuleSet) -> String {
    let capacity = sequence
        .chars()
        .map(|c| rules.get(c).map_or(c.len_utf8(), str::len))
        .sum();
    let mut next = String::with_capacity(capacity);
    for c in sequence.chars() {
        match rules.get(c) {
            Some(replacement) => next.push_str(replacement),
            None => next.push(c),
        }
    }
    next
}

fn clamp_iterations(iterations: u32) -> u32 {
    if iterations > MAX_ITERATIONS {
        tracing::warn!(
            requested = iterations,
            max = MAX_ITERATIONS,
            "iteration count clamped"
        );
        MAX_ITERATIONS
    } else {
        iterations
    }
}

/// A validated grammar: axiom, rule table and pass count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LSystem {
    pub axiom: String,
    pub rules: RuleSet,
    pub iterations: u32,
}

impl Default for LSystem {
    fn default() -> Self {
        Self {
            axiom: "F".into(),
            rules: RuleSet::new(),
            iterations: 5,
        }
    }
}

impl LSystem {
    pub fn new(
        axiom: impl Into<String>,
        rules: RuleSet,
        iterations: u32,
    ) -> Result<Self, ConfigError> {
        let system = Self {
            axiom: axiom.into(),
            rules,
            iterations,
        };
        system.validate()?;
        Ok(system)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations > MAX_ITERATIONS {
            return Err(ConfigError::IterationsOutOfRange {
                value: self.iterations,
                max: MAX_ITERATIONS,
            });
        }
        Ok(())
    }

    /// The fully rewritten sequence.
    pub fn generate(&self) -> String {
        let _span = tracing::debug_span!("generate", iterations = self.iterations).entered();
        let sequence = generate(&self.axiom, &self.rules, self.iterations);
        tracing::debug!(symbols = sequence.chars().count(), "sequence generated");
        sequence
    }

    /// Every generation from the axiom (index 0) up to the final one.
    pub fn generate_steps(&self) -> Vec<String> {
        let iterations = clamp_iterations(self.iterations);
        let mut steps = Vec::with_capacity(iterations as usize + 1);
        steps.push(self.axiom.clone());
        for _ in 0..iterations {
            let next = rewrite_once(steps.last().map_or("", String::as_str), &self.rules);
            steps.push(next);
        }
        steps
    }

    /// Number of symbols after `iterations` passes, computed from symbol
    /// multiplicities instead of building the string. Saturates at `u64::MAX`.
    pub fn expanded_len(&self, iterations: u32) -> u64 {
        let mut counts: HashMap<char, u64> = HashMap::new();
        for c in self.axiom.chars() {
            *counts.entry(c).or_default() += 1;
        }
        for _ in 0..iterations {
            let mut next: HashMap<char, u64> = HashMap::with_capacity(counts.len());
            for (&symbol, &count) in &counts {
                match self.rules.get(symbol) {
                    Some(replacement) => {
                        for c in replacement.chars() {
                            let slot = next.entry(c).or_default();
                            *slot = slot.saturating_add(count);
                        }
                    }
                    None => {
                        let slot = next.entry(symbol).or_default();
                        *slot = slot.saturating_add(count);
                    }
                }
            }
            counts = next;
        }
        counts.values().fold(0u64, |acc, &n| acc.saturating_add(n))
    }
}
