//! # rulestore-conf
//!
//! Validated storage of the policy-model definition next to the policy
//! records.
//!
//! This crate provides [`ModelDefinition`], model text validated by the
//! casbin model loader, and [`save_model`] / [`load_model`], which keep one
//! definition document per collection. Invalid text is rejected before any
//! write.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use rulestore_conf::{load_model, save_model};
//! use rulestore_contracts::config::StoreConfig;
//!
//! let config = StoreConfig::with_collection("authz");
//! save_model(&client, MODEL_TEXT, &config)?;
//! let definition = load_model(&client, &config)?;
//! let mut model = definition.policy_model();
//! ```

pub mod definition;
pub mod store;

pub use definition::ModelDefinition;
pub use store::{load_model, save_model, save_model_file, MODEL_DOCUMENT_ID};

// ── Tests ─────────────────────────────────────────────────────────────────────
