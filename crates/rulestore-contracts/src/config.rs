//! Adapter configuration.
//!
//! The only setting is the collection name. It can be given inline or read
//! from a TOML document:
//!
//! ```toml
//! collection = "authz-policies"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RuleStoreError, RuleStoreResult};

/// Collection used when none is configured.
pub const DEFAULT_COLLECTION: &str = "casbin";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Collection holding policy records and the model definition.
    /// Optional. (Default: `"casbin"`)
    #[serde(default)]
    pub collection: Option<String>,
}

impl StoreConfig {
    pub fn with_collection(collection: impl Into<String>) -> Self {
        Self {
            collection: Some(collection.into()),
        }
    }

    /// The configured collection, or `DEFAULT_COLLECTION` when unset or empty.
    pub fn collection_name(&self) -> &str {
        match self.collection.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_COLLECTION,
        }
    }

    /// Parse `s` as TOML.
    ///
    /// Returns `RuleStoreError::ConfigError` if the TOML is malformed.
    pub fn from_toml_str(s: &str) -> RuleStoreResult<Self> {
        toml::from_str(s).map_err(|e| RuleStoreError::ConfigError {
            reason: format!("failed to parse store config TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as TOML.
    pub fn from_file(path: &Path) -> RuleStoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RuleStoreError::ConfigError {
            reason: format!("failed to read store config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}
