//! Saving and loading the model definition document.
//!
//! The definition is kept as one document with a single `text` field, under
//! the fixed id `conf` in the policy collection. Text is validated before it
//! is written, so an invalid definition never reaches storage.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use rulestore_contracts::{
    config::StoreConfig,
    document::{to_document_data, DocumentRef},
    error::{RuleStoreError, RuleStoreResult},
};
use rulestore_core::traits::{DocumentStore, Transaction};

use crate::definition::ModelDefinition;

/// Document id the model definition is stored under.
pub const MODEL_DOCUMENT_ID: &str = "conf";

#[derive(Debug, Serialize, Deserialize)]
struct ModelDocument {
    text: String,
}

fn model_ref(config: &StoreConfig) -> DocumentRef {
    DocumentRef::new(config.collection_name(), MODEL_DOCUMENT_ID)
}

/// Validate `text` and store it as the model definition, replacing any
/// previous one.
///
/// Returns `RuleStoreError::InvalidModel` without writing anything when the
/// text does not parse.
pub fn save_model<S>(store: &S, text: &str, config: &StoreConfig) -> RuleStoreResult<ModelDefinition>
where
    S: DocumentStore + ?Sized,
{
    let definition: ModelDefinition = text.parse()?;

    let reference = model_ref(config);
    let data = to_document_data(&ModelDocument {
        text: text.to_string(),
    })?;
    store.run_transaction(&mut |tx: &mut dyn Transaction| tx.set(&reference, data.clone()))?;

    info!(document = %reference, "model definition saved");
    Ok(definition)
}

/// Read the model definition from the file at `path`, then `save_model` it.
pub fn save_model_file<S>(
    store: &S,
    path: &Path,
    config: &StoreConfig,
) -> RuleStoreResult<ModelDefinition>
where
    S: DocumentStore + ?Sized,
{
    let text = std::fs::read_to_string(path).map_err(|e| RuleStoreError::ConfigError {
        reason: format!("failed to read model file '{}': {}", path.display(), e),
    })?;
    save_model(store, &text, config)
}

/// Load and parse the stored model definition.
///
/// Returns `RuleStoreError::NotFound` when no definition was ever saved.
pub fn load_model<S>(store: &S, config: &StoreConfig) -> RuleStoreResult<ModelDefinition>
where
    S: DocumentStore + ?Sized,
{
    let reference = model_ref(config);
    let document: ModelDocument = store.get(&reference)?.data_to()?;
    debug!(document = %reference, bytes = document.text.len(), "model definition loaded");
    document.text.parse()
}
