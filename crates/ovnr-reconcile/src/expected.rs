use std::collections::BTreeSet;
use std::fmt;

use ovnr_flow::CanonicalRule;

/// The flows ovn-controller believes it has installed in the table of interest.
///
/// Ordered so reports list rules deterministically.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpectedSet {
    rules: BTreeSet<CanonicalRule>,
}

/// A remove event named a rule the expected set never held.
///
/// The set has drifted from the controller's real state; every diff after
/// this point is suspect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpectedSetInconsistency {
    pub rule: CanonicalRule,
}

impl fmt::Display for ExpectedSetInconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "removed flow was not in the expected set: {}", self.rule)
    }
}

impl std::error::Error for ExpectedSetInconsistency {}

impl ExpectedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, rule: &CanonicalRule) -> bool {
        self.rules.contains(rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalRule> {
        self.rules.iter()
    }

    /// Returns `false` when the rule was already present (no-op).
    pub fn add(&mut self, rule: CanonicalRule) -> bool {
        self.rules.insert(rule)
    }

    pub fn remove(&mut self, rule: &CanonicalRule) -> Result<(), ExpectedSetInconsistency> {
        if self.rules.remove(rule) {
            Ok(())
        } else {
            Err(ExpectedSetInconsistency { rule: rule.clone() })
        }
    }
}
