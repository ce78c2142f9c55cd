//! Core trait definitions for rulestore.
//!
//! - `Adapter`: the persistence contract the authorization engine uses
//! - `DocumentStore`: a transactional document database connection
//! - `Transaction`: the operations available inside one atomic unit
//!
//! Adapters are written against `DocumentStore` only, so any backend that
//! honors its transaction contract can hold policy.

use rulestore_contracts::{
    document::{Document, DocumentData, DocumentRef, Query},
    error::RuleStoreResult,
    model::PolicyModel,
};

/// Streaming query results. Each item may fail independently.
pub type DocumentIter<'a> = Box<dyn Iterator<Item = RuleStoreResult<Document>> + 'a>;

/// Policy persistence as seen by the authorization engine.
///
/// Every method is synchronous from the caller's perspective. Only
/// `load_policy` touches the caller's model; mutating methods act on storage
/// alone, and the caller reconciles its in-memory view separately.
pub trait Adapter: Send + Sync {
    /// Append every stored rule to `model`.
    ///
    /// The model is not cleared first. On error, rules appended before the
    /// failure stay in `model`.
    fn load_policy(&self, model: &mut PolicyModel) -> RuleStoreResult<()>;

    /// Replace the stored rule set with every rule in `model`'s `p` and `g`
    /// sections, atomically.
    fn save_policy(&self, model: &PolicyModel) -> RuleStoreResult<()>;

    /// Store one rule.
    fn add_policy(&self, sec: &str, ptype: &str, rule: &[String]) -> RuleStoreResult<()>;

    /// Delete every stored record equal to `rule` on the type and fields 0–4.
    ///
    /// Deleting a rule that is not stored succeeds.
    fn remove_policy(&self, sec: &str, ptype: &str, rule: &[String]) -> RuleStoreResult<()>;

    /// Delete every stored rule of `ptype` whose fields match `field_values`
    /// starting at position `field_index`. Empty values match anything.
    fn remove_filtered_policy(
        &self,
        sec: &str,
        ptype: &str,
        field_index: i32,
        field_values: &[String],
    ) -> RuleStoreResult<()>;

    /// Store several rules in one atomic unit.
    fn add_policies(&self, sec: &str, ptype: &str, rules: &[Vec<String>]) -> RuleStoreResult<()>;

    /// Remove several rules in one atomic unit, each as `remove_policy` would.
    fn remove_policies(
        &self,
        sec: &str,
        ptype: &str,
        rules: &[Vec<String>],
    ) -> RuleStoreResult<()>;

    /// Delete every stored rule in one atomic unit.
    fn clear_policy(&self) -> RuleStoreResult<()>;
}

/// A connection to a transactional document database.
///
/// Implementations must be safe to share across threads; the adapter adds no
/// locking of its own.
pub trait DocumentStore: Send + Sync {
    /// Run `query` outside any transaction and stream the matches.
    fn documents(&self, query: &Query) -> RuleStoreResult<DocumentIter<'_>>;

    /// Fetch one document. Returns `RuleStoreError::NotFound` when absent.
    fn get(&self, reference: &DocumentRef) -> RuleStoreResult<Document>;

    /// Run `f` as one atomic unit.
    ///
    /// If `f` returns `Err`, none of its writes become visible and that error
    /// is returned unchanged. A commit failure is returned as the backend
    /// reports it. Backends may call `f` more than once.
    fn run_transaction(
        &self,
        f: &mut dyn FnMut(&mut dyn Transaction) -> RuleStoreResult<()>,
    ) -> RuleStoreResult<()>;

    /// Release the connection. Later calls on this handle fail.
    fn close(&self) -> RuleStoreResult<()>;
}

/// Operations available inside `DocumentStore::run_transaction`.
///
/// Reads observe the database as of the start of the transaction; writes
/// are buffered until commit.
pub trait Transaction {
    /// Run `query` inside the transaction.
    fn documents(&mut self, query: &Query) -> RuleStoreResult<Vec<Document>>;

    /// Create a document with a backend-assigned id in `collection`.
    fn create(&mut self, collection: &str, data: DocumentData) -> RuleStoreResult<DocumentRef>;

    /// Create or overwrite the document at `reference`.
    fn set(&mut self, reference: &DocumentRef, data: DocumentData) -> RuleStoreResult<()>;

    /// Delete the document at `reference`. Deleting a missing document succeeds.
    fn delete(&mut self, reference: &DocumentRef) -> RuleStoreResult<()>;
}
