//! Validation of policy-model definition text.
//!
//! A model definition is the INI-style text the authorization engine reads:
//!
//! ```text
//! [request_definition]
//! r = sub, obj, act
//!
//! [policy_definition]
//! p = sub, obj, act
//!
//! [role_definition]
//! g = _, _
//!
//! [policy_effect]
//! e = some(where (p.eft == allow))
//!
//! [matchers]
//! m = g(r.sub, p.sub) && r.obj == p.obj && r.act == p.act
//! ```
//!
//! Text is parsed with casbin's own model loader, so anything the engine
//! accepts is accepted here. On top of that, the request, policy, effect and
//! matcher sections must all be declared.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use casbin::{prelude::DefaultModel, Model};
use tracing::debug;

use rulestore_contracts::{
    error::{RuleStoreError, RuleStoreResult},
    model::PolicyModel,
};

/// Section keys every definition must declare, with their header names.
const REQUIRED: [(&str, &str); 4] = [
    ("r", "request_definition"),
    ("p", "policy_definition"),
    ("e", "policy_effect"),
    ("m", "matchers"),
];

/// A validated model definition.
///
/// Keeps the text exactly as given, plus the assertion keys the engine
/// declared for each section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDefinition {
    text: String,
    /// section → declared keys (`"p"` → `{"p", "p2"}`)
    declared: BTreeMap<String, BTreeSet<String>>,
}

impl ModelDefinition {
    /// Parse and validate `text`.
    ///
    /// Runs casbin's async loader to completion on a private current-thread
    /// runtime, so it must not be called from inside another tokio runtime.
    pub fn parse(text: &str) -> RuleStoreResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|e| RuleStoreError::ConfigError {
                reason: format!("failed to start model parser runtime: {}", e),
            })?;
        let model = runtime
            .block_on(DefaultModel::from_str(text))
            .map_err(|e| RuleStoreError::InvalidModel {
                reason: e.to_string(),
            })?;

        let declared: BTreeMap<String, BTreeSet<String>> = model
            .get_model()
            .iter()
            .map(|(sec, assertions)| (sec.clone(), assertions.keys().cloned().collect()))
            .collect();

        for (sec, header) in REQUIRED {
            if declared.get(sec).map_or(true, BTreeSet::is_empty) {
                return Err(RuleStoreError::InvalidModel {
                    reason: format!("missing required section '{header}'"),
                });
            }
        }

        debug!(sections = declared.len(), "model definition parsed");
        Ok(Self {
            text: text.to_string(),
            declared,
        })
    }

    /// The definition text as it was given.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether section `sec` (`"r"`, `"p"`, …) declares `key`.
    pub fn declares(&self, sec: &str, key: &str) -> bool {
        self.declared.get(sec).is_some_and(|keys| keys.contains(key))
    }

    /// Keys declared in section `sec`, sorted.
    pub fn keys(&self, sec: &str) -> impl Iterator<Item = &str> {
        self.declared
            .get(sec)
            .into_iter()
            .flat_map(|keys| keys.iter().map(String::as_str))
    }

    /// An empty `PolicyModel` with one assertion per policy and role type.
    pub fn policy_model(&self) -> PolicyModel {
        let mut model = PolicyModel::new();
        for sec in ["p", "g"] {
            for key in self.keys(sec) {
                model.declare(sec, key);
            }
        }
        model
    }
}

impl FromStr for ModelDefinition {
    type Err = RuleStoreError;

    fn from_str(text: &str) -> RuleStoreResult<Self> {
        Self::parse(text)
    }
}
