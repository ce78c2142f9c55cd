//! `PolicyStoreAdapter`: the `Adapter` implementation over a `DocumentStore`.
//!
//! Every mutation runs inside one `DocumentStore::run_transaction` call and
//! every read of the records to delete happens inside that same transaction,
//! before any write. Errors from the store are returned exactly as the store
//! produced them; nothing is retried here.
//!
//! Known limitation: `save_policy` deletes and recreates the whole collection
//! in a single transaction, so very large policy sets can exceed a backend's
//! per-transaction operation limit. The adapter does not split the work,
//! because splitting would give up atomicity.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use rulestore_contracts::{
    config::StoreConfig,
    document::{to_document_data, DocumentData, DocumentRef, Query},
    error::RuleStoreResult,
    model::PolicyModel,
    rule::{PolicyLine, PolicyRecord, FIELD_NAMES, PTYPE_FIELD},
};
use rulestore_core::traits::{Adapter, DocumentStore, Transaction};

use crate::{codec, filter};

/// Sections written by `save_policy`, in write order.
const SAVED_SECTIONS: [&str; 2] = ["p", "g"];

/// Number of leading fields `remove_policy` matches on.
const REMOVE_MATCH_FIELDS: usize = 5;

/// Persists policy rules as flat records in one collection of a document
/// database.
///
/// The adapter owns its store handle. Call [`close`](Self::close) to release
/// it and observe the result; dropping the adapter also releases it, but any
/// failure there can only be logged.
///
/// ```rust,ignore
/// use rulestore_adapter::PolicyStoreAdapter;
/// use rulestore_contracts::config::StoreConfig;
///
/// let adapter = PolicyStoreAdapter::with_config(client, &StoreConfig::with_collection("authz"));
/// adapter.load_policy(&mut model)?;
/// adapter.close()?;
/// ```
pub struct PolicyStoreAdapter<S: DocumentStore> {
    store: S,
    collection: String,
    released: bool,
}

impl<S: DocumentStore> PolicyStoreAdapter<S> {
    /// Adapter over the default collection.
    pub fn new(store: S) -> Self {
        Self::with_config(store, &StoreConfig::default())
    }

    pub fn with_config(store: S, config: &StoreConfig) -> Self {
        let collection = config.collection_name().to_string();
        debug!(collection = %collection, "policy store adapter created");
        Self {
            store,
            collection,
            released: false,
        }
    }

    /// The collection policy records live in.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Release the store handle and report the outcome.
    pub fn close(mut self) -> RuleStoreResult<()> {
        self.released = true;
        self.store.close()
    }

    // ── Query builders ────────────────────────────────────────────────────────

    /// Every policy record: anything with a non-empty type.
    fn all_records(&self) -> Query {
        Query::new(self.collection.as_str()).where_gt(PTYPE_FIELD, "")
    }

    /// Records equal to `record` on the type and the first five fields.
    fn matching_rule(&self, record: &PolicyRecord) -> Query {
        let values = record.values();
        FIELD_NAMES
            .iter()
            .zip(values)
            .take(REMOVE_MATCH_FIELDS)
            .fold(
                self.all_records().where_eq(PTYPE_FIELD, record.ptype.as_str()),
                |query, (field, value)| query.where_eq(*field, value),
            )
    }

    /// Records of `ptype` matching the planned field constraints.
    fn matching_filter(&self, ptype: &str, field_index: i32, field_values: &[String]) -> Query {
        filter::plan(field_index, field_values).into_iter().fold(
            self.all_records().where_eq(PTYPE_FIELD, ptype),
            |query, constraint| query.where_eq(constraint.field_name(), constraint.value),
        )
    }

    // ── Transaction bodies ────────────────────────────────────────────────────

    /// Delete everything matched by any of `queries`, in one transaction.
    ///
    /// Returns how many documents were deleted. Zero is success.
    fn delete_matching(&self, queries: &[Query]) -> RuleStoreResult<usize> {
        let mut deleted = 0;
        self.store.run_transaction(&mut |tx: &mut dyn Transaction| {
            let mut targets = BTreeSet::new();
            for query in queries {
                for doc in tx.documents(query)? {
                    targets.insert(doc.reference);
                }
            }
            for reference in &targets {
                tx.delete(reference)?;
            }
            deleted = targets.len();
            Ok(())
        })?;
        Ok(deleted)
    }

    /// Create one document per entry of `lines`, in one transaction.
    fn create_all(&self, lines: &[DocumentData]) -> RuleStoreResult<()> {
        self.store.run_transaction(&mut |tx: &mut dyn Transaction| {
            for data in lines {
                tx.create(&self.collection, data.clone())?;
            }
            Ok(())
        })
    }

    fn encode_rules(ptype: &str, rules: &[Vec<String>]) -> RuleStoreResult<Vec<DocumentData>> {
        rules
            .iter()
            .map(|rule| to_document_data(&codec::encode(ptype, rule)))
            .collect()
    }
}

impl<S: DocumentStore> Adapter for PolicyStoreAdapter<S> {
    /// Stream every record and append it to `model`.
    ///
    /// Stops at the first read or decode error. Rules appended before that
    /// point stay in `model`.
    fn load_policy(&self, model: &mut PolicyModel) -> RuleStoreResult<()> {
        debug!(collection = %self.collection, "loading policy");

        let mut loaded = 0usize;
        for item in self.store.documents(&self.all_records())? {
            let record: PolicyRecord = item?.data_to()?;
            let (section, line) = codec::decode(&record)?;
            model.add_policy(&section, &line.ptype, line.fields);
            loaded += 1;
        }

        debug!(collection = %self.collection, count = loaded, "policy loaded");
        Ok(())
    }

    /// Replace the stored rule set with the `p` and `g` sections of `model`.
    ///
    /// Existing records are deleted and the new ones created in the same
    /// transaction, so readers see either the old set or the new one.
    fn save_policy(&self, model: &PolicyModel) -> RuleStoreResult<()> {
        let lines: Vec<PolicyLine> = SAVED_SECTIONS
            .iter()
            .flat_map(|sec| model.section(sec))
            .flat_map(|(ptype, assertion)| {
                assertion
                    .policy
                    .iter()
                    .map(move |rule| PolicyLine::new(ptype, rule.clone()))
            })
            .collect();
        let documents = lines
            .iter()
            .map(|line| to_document_data(&codec::encode_line(line)))
            .collect::<RuleStoreResult<Vec<_>>>()?;

        debug!(collection = %self.collection, count = documents.len(), "saving policy");

        let all = self.all_records();
        let mut replaced = 0;
        self.store.run_transaction(&mut |tx: &mut dyn Transaction| {
            let existing: Vec<DocumentRef> = tx
                .documents(&all)?
                .into_iter()
                .map(|doc| doc.reference)
                .collect();
            for reference in &existing {
                tx.delete(reference)?;
            }
            for data in &documents {
                tx.create(&self.collection, data.clone())?;
            }
            replaced = existing.len();
            Ok(())
        })?;

        info!(
            collection = %self.collection,
            removed = replaced,
            written = documents.len(),
            "policy saved"
        );
        Ok(())
    }

    fn add_policy(&self, sec: &str, ptype: &str, rule: &[String]) -> RuleStoreResult<()> {
        debug!(sec = %sec, ptype = %ptype, fields = rule.len(), "adding policy");
        let data = to_document_data(&codec::encode(ptype, rule))?;
        self.create_all(std::slice::from_ref(&data))
    }

    /// Matches on the type and fields 0–4 only. A stored record that differs
    /// from `rule` just in field 5 is removed as well.
    fn remove_policy(&self, sec: &str, ptype: &str, rule: &[String]) -> RuleStoreResult<()> {
        let query = self.matching_rule(&codec::encode(ptype, rule));
        let deleted = self.delete_matching(std::slice::from_ref(&query))?;
        debug!(sec = %sec, ptype = %ptype, deleted, "policy removed");
        Ok(())
    }

    fn remove_filtered_policy(
        &self,
        sec: &str,
        ptype: &str,
        field_index: i32,
        field_values: &[String],
    ) -> RuleStoreResult<()> {
        let query = self.matching_filter(ptype, field_index, field_values);
        let deleted = self.delete_matching(std::slice::from_ref(&query))?;
        debug!(
            sec = %sec,
            ptype = %ptype,
            field_index,
            constraints = query.filters.len(),
            deleted,
            "filtered policy removed"
        );
        Ok(())
    }

    fn add_policies(&self, sec: &str, ptype: &str, rules: &[Vec<String>]) -> RuleStoreResult<()> {
        debug!(sec = %sec, ptype = %ptype, count = rules.len(), "adding policies");
        let documents = Self::encode_rules(ptype, rules)?;
        self.create_all(&documents)
    }

    fn remove_policies(
        &self,
        sec: &str,
        ptype: &str,
        rules: &[Vec<String>],
    ) -> RuleStoreResult<()> {
        let queries: Vec<Query> = rules
            .iter()
            .map(|rule| self.matching_rule(&codec::encode(ptype, rule)))
            .collect();
        let deleted = self.delete_matching(&queries)?;
        debug!(sec = %sec, ptype = %ptype, rules = rules.len(), deleted, "policies removed");
        Ok(())
    }

    fn clear_policy(&self) -> RuleStoreResult<()> {
        let deleted = self.delete_matching(std::slice::from_ref(&self.all_records()))?;
        info!(collection = %self.collection, deleted, "policy cleared");
        Ok(())
    }
}

impl<S: DocumentStore> Drop for PolicyStoreAdapter<S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.store.close() {
            warn!(collection = %self.collection, error = %e, "failed to release store on drop");
        }
    }
}
