//! # rulestore-core
//!
//! The two seams of rulestore:
//!
//! - `Adapter`: what the authorization engine calls to persist policy
//! - `DocumentStore`: what the adapter calls to reach the document database
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rulestore_core::traits::{Adapter, DocumentStore, Transaction};
//! ```

pub mod traits;

pub use traits::{Adapter, DocumentIter, DocumentStore, Transaction};
