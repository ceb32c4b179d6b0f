use std::collections::HashMap;

use arbor_common::ConfigError;
use serde::{Deserialize, Serialize};

/// A single production: every `symbol` is replaced by `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub symbol: char,
    pub replacement: String,
}

impl Rule {
    pub fn new(symbol: char, replacement: impl Into<String>) -> Self {
        Self {
            symbol,
            replacement: replacement.into(),
        }
    }

    /// Parse the textual form `X=F[+X]` (also accepts `X->F[+X]`).
    ///
    /// Whitespace around the symbol is ignored. The replacement may be empty,
    /// which deletes the symbol on every pass.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let malformed = || ConfigError::MalformedRule(text.to_string());
        let (lhs, rhs) = text
            .split_once('=')
            .or_else(|| text.split_once("->"))
            .ok_or_else(malformed)?;

        let mut symbols = lhs.trim().chars();
        let symbol = symbols.next().ok_or_else(malformed)?;
        if symbols.next().is_some() {
            return Err(malformed());
        }
        Ok(Self::new(symbol, rhs.trim()))
    }
}

/// Ordered rule table with first-registered-wins lookup.
///
/// A second rule for a symbol that already has one is dropped and logged as a
/// warning; it is almost always an authoring mistake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Rule>", into = "Vec<Rule>")]
pub struct RuleSet {
    rules: Vec<Rule>,
    index: HashMap<char, usize>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule. Returns `false` (and keeps the existing rule) when the
    /// symbol is already mapped.
    pub fn insert(&mut self, rule: Rule) -> bool {
        if let Some(&existing) = self.index.get(&rule.symbol) {
            tracing::warn!(
                symbol = %rule.symbol,
                kept = %self.rules[existing].replacement,
                dropped = %rule.replacement,
                "duplicate rule ignored"
            );
            return false;
        }
        self.index.insert(rule.symbol, self.rules.len());
        self.rules.push(rule);
        true
    }

    /// Builder-style [`RuleSet::insert`].
    pub fn with_rule(mut self, symbol: char, replacement: impl Into<String>) -> Self {
        self.insert(Rule::new(symbol, replacement));
        self
    }

    /// Replacement for `symbol`, if a rule matches.
    #[inline]
    pub fn get(&self, symbol: char) -> Option<&str> {
        self.index
            .get(&symbol)
            .map(|&i| self.rules[i].replacement.as_str())
    }

    /// Rules in registration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        let mut set = Self::new();
        for rule in rules {
            set.insert(rule);
        }
        set
    }
}

impl From<RuleSet> for Vec<Rule> {
    fn from(set: RuleSet) -> Self {
        set.rules
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}
