//! Buffered transactions and query evaluation.
//!
//! A `MemoryTransaction` reads from the collections as they were when the
//! transaction began and records writes in a pending list. The database
//! applies that list only after the transaction body returns `Ok`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use rulestore_contracts::{
    document::{Document, DocumentData, DocumentRef, FieldFilter, FilterOp, Query},
    error::{RuleStoreError, RuleStoreResult},
};
use rulestore_core::traits::Transaction;

/// One stored document body plus its creation time.
#[derive(Debug, Clone)]
pub(crate) struct StoredDocument {
    pub(crate) data: DocumentData,
    pub(crate) create_time: DateTime<Utc>,
}

/// collection name → document id → document.
pub(crate) type Collections = BTreeMap<String, BTreeMap<String, StoredDocument>>;

/// A write recorded inside a transaction, applied on commit.
#[derive(Debug, Clone)]
pub(crate) enum PendingWrite {
    Create { reference: DocumentRef, data: DocumentData },
    Set { reference: DocumentRef, data: DocumentData },
    Delete { reference: DocumentRef },
}

/// Return true if `data` satisfies `filter`.
///
/// Only string fields take part in comparisons; a missing or non-string
/// field never matches.
pub(crate) fn filter_matches(data: &DocumentData, filter: &FieldFilter) -> bool {
    match data.get(&filter.field) {
        Some(Value::String(actual)) => match filter.op {
            FilterOp::Equal => *actual == filter.value,
            FilterOp::GreaterThan => actual.as_str() > filter.value.as_str(),
        },
        _ => false,
    }
}

/// Evaluate `query` against `collections`, returning owned snapshots.
pub(crate) fn run_query(collections: &Collections, query: &Query) -> Vec<Document> {
    let Some(docs) = collections.get(&query.collection) else {
        return Vec::new();
    };
    docs.iter()
        .filter(|(_, doc)| query.filters.iter().all(|f| filter_matches(&doc.data, f)))
        .map(|(id, doc)| Document {
            reference: DocumentRef::new(query.collection.clone(), id.clone()),
            data: doc.data.clone(),
            create_time: doc.create_time,
        })
        .collect()
}

/// Apply committed writes in order.
pub(crate) fn apply_writes(collections: &mut Collections, writes: Vec<PendingWrite>) {
    let now = Utc::now();
    for write in writes {
        match write {
            PendingWrite::Create { reference, data } | PendingWrite::Set { reference, data } => {
                let docs = collections.entry(reference.collection).or_default();
                let create_time = docs.get(&reference.id).map(|d| d.create_time).unwrap_or(now);
                docs.insert(reference.id, StoredDocument { data, create_time });
            }
            PendingWrite::Delete { reference } => {
                if let Some(docs) = collections.get_mut(&reference.collection) {
                    docs.remove(&reference.id);
                }
            }
        }
    }
}

/// A transaction over a snapshot of the database.
pub(crate) struct MemoryTransaction<'a> {
    snapshot: &'a Collections,
    writes: Vec<PendingWrite>,
    /// Injected failure: the write at this zero-based position fails.
    fail_at: Option<(usize, RuleStoreError)>,
}

impl<'a> MemoryTransaction<'a> {
    pub(crate) fn new(snapshot: &'a Collections, fail_at: Option<(usize, RuleStoreError)>) -> Self {
        Self {
            snapshot,
            writes: Vec::new(),
            fail_at,
        }
    }

    pub(crate) fn into_writes(self) -> Vec<PendingWrite> {
        self.writes
    }

    fn record(&mut self, write: PendingWrite) -> RuleStoreResult<()> {
        let due = self
            .fail_at
            .as_ref()
            .is_some_and(|(position, _)| *position == self.writes.len());
        if due {
            if let Some((_, error)) = self.fail_at.take() {
                return Err(error);
            }
        }
        self.writes.push(write);
        Ok(())
    }

    fn id_taken(&self, reference: &DocumentRef) -> bool {
        let stored = self
            .snapshot
            .get(&reference.collection)
            .is_some_and(|docs| docs.contains_key(&reference.id));
        let pending = self.writes.iter().any(|w| {
            matches!(w, PendingWrite::Create { reference: r, .. } if r == reference)
        });
        stored || pending
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn documents(&mut self, query: &Query) -> RuleStoreResult<Vec<Document>> {
        Ok(run_query(self.snapshot, query))
    }

    fn create(&mut self, collection: &str, data: DocumentData) -> RuleStoreResult<DocumentRef> {
        let reference = DocumentRef::new(collection, Uuid::new_v4().simple().to_string());
        if self.id_taken(&reference) {
            return Err(RuleStoreError::AlreadyExists {
                path: reference.path(),
            });
        }
        self.record(PendingWrite::Create {
            reference: reference.clone(),
            data,
        })?;
        Ok(reference)
    }

    fn set(&mut self, reference: &DocumentRef, data: DocumentData) -> RuleStoreResult<()> {
        self.record(PendingWrite::Set {
            reference: reference.clone(),
            data,
        })
    }

    fn delete(&mut self, reference: &DocumentRef) -> RuleStoreResult<()> {
        self.record(PendingWrite::Delete {
            reference: reference.clone(),
        })
    }
}
