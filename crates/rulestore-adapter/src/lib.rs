//! # rulestore-adapter
//!
//! Stores authorization policy rules in a transactional document database.
//!
//! ## Overview
//!
//! This crate provides [`PolicyStoreAdapter`], which implements the
//! [`Adapter`](rulestore_core::traits::Adapter) trait on top of any
//! [`DocumentStore`](rulestore_core::traits::DocumentStore). It is built from
//! two pure pieces:
//!
//! - [`codec`]: policy line ⇄ fixed six-slot record
//! - [`filter`]: `(field_index, field_values)` ⇄ equality constraints
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use rulestore_adapter::PolicyStoreAdapter;
//! use rulestore_core::traits::Adapter;
//!
//! let adapter = PolicyStoreAdapter::new(client);
//! adapter.add_policy("p", "p", &["alice".into(), "data1".into(), "read".into()])?;
//! adapter.remove_filtered_policy("p", "p", 1, &["data1".into()])?;
//! adapter.close()?;
//! ```

pub mod adapter;
pub mod codec;
pub mod filter;

pub use adapter::PolicyStoreAdapter;

// ── Tests ─────────────────────────────────────────────────────────────────────
