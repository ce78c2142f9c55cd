//! The authorization engine's in-memory policy model.
//!
//! The adapter never owns a `PolicyModel`: it is passed in per call, read on
//! save and appended to on load.

use std::collections::BTreeMap;

/// The rules held for a single policy type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assertion {
    /// Every rule of this type, in load or insertion order.
    pub policy: Vec<Vec<String>>,
}

/// Section (`"p"`, `"g"`) → policy type (`"p"`, `"p2"`, `"g"`, …) → rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyModel {
    sections: BTreeMap<String, BTreeMap<String, Assertion>>,
}

impl PolicyModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure an (initially empty) assertion exists for `ptype` under `sec`.
    pub fn declare(&mut self, sec: &str, ptype: &str) {
        self.assertion_mut(sec, ptype);
    }

    /// The assertion for `ptype` under `sec`, if declared.
    pub fn assertion(&self, sec: &str, ptype: &str) -> Option<&Assertion> {
        self.sections.get(sec).and_then(|types| types.get(ptype))
    }

    /// The assertion for `ptype` under `sec`, created on first use.
    pub fn assertion_mut(&mut self, sec: &str, ptype: &str) -> &mut Assertion {
        self.sections
            .entry(sec.to_string())
            .or_default()
            .entry(ptype.to_string())
            .or_default()
    }

    /// Every policy type declared under `sec` with its assertion.
    pub fn section(&self, sec: &str) -> impl Iterator<Item = (&str, &Assertion)> {
        self.sections
            .get(sec)
            .into_iter()
            .flat_map(|types| types.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Append one rule to `ptype` under `sec`.
    pub fn add_policy(&mut self, sec: &str, ptype: &str, rule: Vec<String>) {
        self.assertion_mut(sec, ptype).policy.push(rule);
    }

    /// The rules stored for `ptype` under `sec`; empty when undeclared.
    pub fn get_policy(&self, sec: &str, ptype: &str) -> &[Vec<String>] {
        self.assertion(sec, ptype)
            .map(|a| a.policy.as_slice())
            .unwrap_or(&[])
    }

    /// Drop every rule while keeping the declared policy types.
    pub fn clear_policy(&mut self) {
        for types in self.sections.values_mut() {
            for assertion in types.values_mut() {
                assertion.policy.clear();
            }
        }
    }

    /// Total number of rules across all sections and types.
    pub fn len(&self) -> usize {
        self.sections
            .values()
            .flat_map(|types| types.values())
            .map(|a| a.policy.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
