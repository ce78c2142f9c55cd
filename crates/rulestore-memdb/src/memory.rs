//! In-memory document database and its connection handles.
//!
//! `MemoryDatabase` plays the server: it owns every collection behind an
//! `Arc<Mutex<_>>`. `MemoryClient` plays a network connection: it implements
//! `DocumentStore`, can be closed independently, and is counted while open.
//!
//! Transactions hold the database lock for their whole body, so they are
//! serializable. Reads inside a transaction see the state at its start;
//! writes land only on commit.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use chrono::Utc;
use tracing::{debug, warn};

use rulestore_contracts::{
    document::{Document, DocumentData, DocumentRef, Query},
    error::{RuleStoreError, RuleStoreResult},
};
use rulestore_core::traits::{DocumentIter, DocumentStore, Transaction};

use crate::transaction::{
    apply_writes, run_query, Collections, MemoryTransaction, StoredDocument,
};

// ── Fault injection ───────────────────────────────────────────────────────────

/// A one-shot failure armed on the database, consumed by the next matching
/// operation on any connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// In the next transaction, the write after `after_writes` successful
    /// writes fails with `error`.
    Write {
        after_writes: usize,
        error: RuleStoreError,
    },
    /// The next non-transactional query yields `after_documents` documents,
    /// then `error`.
    Read {
        after_documents: usize,
        error: RuleStoreError,
    },
    /// The next transaction body succeeds but its commit fails with `error`.
    Commit { error: RuleStoreError },
}

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct DatabaseState {
    pub(crate) collections: Collections,
    pub(crate) open_connections: usize,
    pub(crate) commits: u64,
    pub(crate) fault: Option<Fault>,
}

fn lock(state: &Mutex<DatabaseState>) -> RuleStoreResult<MutexGuard<'_, DatabaseState>> {
    state.lock().map_err(|e| RuleStoreError::Unavailable {
        reason: format!("database state lock poisoned: {}", e),
    })
}

/// The state guard for connection bookkeeping, recovered if poisoned so the
/// open-connection count stays balanced.
fn counters(state: &Mutex<DatabaseState>) -> MutexGuard<'_, DatabaseState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Database ──────────────────────────────────────────────────────────────────

/// A shared, in-process document database.
///
/// Cloning yields another handle to the same data.
#[derive(Clone)]
pub struct MemoryDatabase {
    state: Arc<Mutex<DatabaseState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        let state = DatabaseState {
            collections: Collections::new(),
            open_connections: 0,
            commits: 0,
            fault: None,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Open a new connection.
    pub fn connect(&self) -> MemoryClient {
        counters(&self.state).open_connections += 1;
        MemoryClient {
            state: Arc::clone(&self.state),
            closed: AtomicBool::new(false),
        }
    }

    /// Connections opened and not yet closed.
    pub fn open_connections(&self) -> usize {
        counters(&self.state).open_connections
    }

    /// Number of committed transactions so far.
    pub fn commit_count(&self) -> u64 {
        counters(&self.state).commits
    }

    /// Arm a one-shot failure.
    pub fn inject_fault(&self, fault: Fault) {
        if let Ok(mut state) = self.state.lock() {
            state.fault = Some(fault);
        }
    }

    /// Every document body in `collection`, in id order.
    pub fn dump(&self, collection: &str) -> Vec<DocumentData> {
        let Ok(state) = self.state.lock() else {
            return Vec::new();
        };
        state
            .collections
            .get(collection)
            .map(|docs| docs.values().map(|d| d.data.clone()).collect())
            .unwrap_or_default()
    }

    /// Write a document directly, bypassing transactions. Used to seed data
    /// that the adapter itself would never produce.
    pub fn insert_raw(&self, reference: &DocumentRef, data: DocumentData) {
        if let Ok(mut state) = self.state.lock() {
            state
                .collections
                .entry(reference.collection.clone())
                .or_default()
                .insert(
                    reference.id.clone(),
                    StoredDocument {
                        data,
                        create_time: Utc::now(),
                    },
                );
        }
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

/// One connection to a `MemoryDatabase`.
///
/// Dropping a client without calling `close` leaves it counted as open, the
/// way an abandoned network session lingers until the server reaps it.
pub struct MemoryClient {
    state: Arc<Mutex<DatabaseState>>,
    closed: AtomicBool,
}

impl MemoryClient {
    fn ensure_open(&self) -> RuleStoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RuleStoreError::Unavailable {
                reason: "client is closed".to_string(),
            });
        }
        Ok(())
    }
}

impl DocumentStore for MemoryClient {
    fn documents(&self, query: &Query) -> RuleStoreResult<DocumentIter<'_>> {
        self.ensure_open()?;
        let mut state = lock(&self.state)?;

        let docs = run_query(&state.collections, query);
        let read_fault = match state.fault.take() {
            Some(Fault::Read {
                after_documents,
                error,
            }) => Some((after_documents, error)),
            other => {
                state.fault = other;
                None
            }
        };
        drop(state);

        debug!(collection = %query.collection, matched = docs.len(), "query executed");

        let mut items: Vec<RuleStoreResult<Document>> = docs.into_iter().map(Ok).collect();
        if let Some((after, error)) = read_fault {
            items.truncate(after);
            items.push(Err(error));
        }
        Ok(Box::new(items.into_iter()))
    }

    fn get(&self, reference: &DocumentRef) -> RuleStoreResult<Document> {
        self.ensure_open()?;
        let state = lock(&self.state)?;
        state
            .collections
            .get(&reference.collection)
            .and_then(|docs| docs.get(&reference.id))
            .map(|doc| Document {
                reference: reference.clone(),
                data: doc.data.clone(),
                create_time: doc.create_time,
            })
            .ok_or_else(|| RuleStoreError::NotFound {
                path: reference.path(),
            })
    }

    fn run_transaction(
        &self,
        f: &mut dyn FnMut(&mut dyn Transaction) -> RuleStoreResult<()>,
    ) -> RuleStoreResult<()> {
        self.ensure_open()?;
        let mut state = lock(&self.state)?;

        let (write_fault, commit_fault) = match state.fault.take() {
            Some(Fault::Write {
                after_writes,
                error,
            }) => (Some((after_writes, error)), None),
            Some(Fault::Commit { error }) => (None, Some(error)),
            other => {
                state.fault = other;
                (None, None)
            }
        };

        let mut tx = MemoryTransaction::new(&state.collections, write_fault);
        let outcome = f(&mut tx);
        let writes = tx.into_writes();

        if let Err(e) = outcome {
            debug!(pending = writes.len(), error = %e, "transaction rolled back");
            return Err(e);
        }
        if let Some(error) = commit_fault {
            warn!(pending = writes.len(), error = %error, "transaction commit failed");
            return Err(error);
        }

        let count = writes.len();
        apply_writes(&mut state.collections, writes);
        state.commits += 1;
        debug!(writes = count, "transaction committed");
        Ok(())
    }

    fn close(&self) -> RuleStoreResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(RuleStoreError::Unavailable {
                reason: "client is already closed".to_string(),
            });
        }
        let mut state = counters(&self.state);
        state.open_connections = state.open_connections.saturating_sub(1);
        debug!(open = state.open_connections, "client closed");
        Ok(())
    }
}
