//! # rulestore-memdb
//!
//! An in-process, transactional document database implementing the
//! [`DocumentStore`](rulestore_core::traits::DocumentStore) trait.
//!
//! ## Overview
//!
//! Documents are JSON objects grouped in named collections and addressed by
//! random ids. Queries AND together string comparisons on single fields.
//! Transactions are serializable and all-or-nothing. One-shot faults can be
//! armed to exercise failure paths deterministically.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rulestore_memdb::{MemoryDatabase, Fault};
//!
//! let db = MemoryDatabase::new();
//! let client = db.connect();
//! // hand `client` to an adapter; inspect `db` from tests
//! ```

pub mod memory;
mod transaction;

pub use memory::{Fault, MemoryClient, MemoryDatabase};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use rulestore_contracts::{
        document::{DocumentData, DocumentRef, Query},
        error::RuleStoreError,
    };
    use rulestore_core::traits::{DocumentStore, Transaction};

    use super::{Fault, MemoryDatabase};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn data(value: serde_json::Value) -> DocumentData {
        value.as_object().cloned().unwrap()
    }

    fn seed(db: &MemoryDatabase, id: &str, ptype: &str, v0: &str) {
        db.insert_raw(
            &DocumentRef::new("rules", id),
            data(json!({ "p_type": ptype, "v0": v0 })),
        );
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    #[test]
    fn test_query_equality_and_greater_than() {
        let db = MemoryDatabase::new();
        seed(&db, "a", "p", "alice");
        seed(&db, "b", "p", "bob");
        seed(&db, "c", "", "nobody");
        let client = db.connect();

        let all: Vec<_> = client
            .documents(&Query::new("rules").where_gt("p_type", ""))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(all.len(), 2, "empty p_type must not pass the > \"\" filter");

        let alice: Vec<_> = client
            .documents(&Query::new("rules").where_eq("v0", "alice"))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].reference.id, "a");
    }

    #[test]
    fn test_query_missing_field_never_matches() {
        let db = MemoryDatabase::new();
        seed(&db, "a", "p", "alice");
        let client = db.connect();

        let hits = client
            .documents(&Query::new("rules").where_eq("v1", ""))
            .unwrap()
            .count();
        assert_eq!(hits, 0);
    }

    #[test]
    fn test_query_unknown_collection_is_empty() {
        let db = MemoryDatabase::new();
        let client = db.connect();
        assert_eq!(client.documents(&Query::new("nothing")).unwrap().count(), 0);
    }

    #[test]
    fn test_get_missing_document_is_not_found() {
        let db = MemoryDatabase::new();
        let client = db.connect();
        match client.get(&DocumentRef::new("rules", "conf")) {
            Err(RuleStoreError::NotFound { path }) => assert_eq!(path, "rules/conf"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    // ── Transactions ──────────────────────────────────────────────────────────

    #[test]
    fn test_transaction_commits_writes() {
        let db = MemoryDatabase::new();
        seed(&db, "old", "p", "alice");
        let client = db.connect();

        client
            .run_transaction(&mut |tx: &mut dyn Transaction| {
                tx.delete(&DocumentRef::new("rules", "old"))?;
                tx.create("rules", data(json!({ "p_type": "p", "v0": "bob" })))?;
                Ok(())
            })
            .unwrap();

        let docs = db.dump("rules");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["v0"], json!("bob"));
        assert_eq!(db.commit_count(), 1);
    }

    #[test]
    fn test_transaction_reads_see_start_snapshot() {
        let db = MemoryDatabase::new();
        seed(&db, "a", "p", "alice");
        let client = db.connect();

        client
            .run_transaction(&mut |tx: &mut dyn Transaction| {
                tx.create("rules", data(json!({ "p_type": "p", "v0": "bob" })))?;
                let seen = tx.documents(&Query::new("rules"))?;
                assert_eq!(seen.len(), 1, "buffered writes are not visible to reads");
                Ok(())
            })
            .unwrap();

        assert_eq!(db.dump("rules").len(), 2);
    }

    #[test]
    fn test_transaction_error_discards_writes() {
        let db = MemoryDatabase::new();
        seed(&db, "a", "p", "alice");
        let client = db.connect();

        let err = client
            .run_transaction(&mut |tx: &mut dyn Transaction| {
                tx.delete(&DocumentRef::new("rules", "a"))?;
                Err(RuleStoreError::Cancelled {
                    reason: "caller went away".to_string(),
                })
            })
            .unwrap_err();

        assert!(matches!(err, RuleStoreError::Cancelled { .. }));
        assert_eq!(db.dump("rules").len(), 1);
        assert_eq!(db.commit_count(), 0);
    }

    #[test]
    fn test_set_overwrites_and_keeps_create_time() {
        let db = MemoryDatabase::new();
        let client = db.connect();
        let conf = DocumentRef::new("rules", "conf");

        for text in ["first", "second"] {
            client
                .run_transaction(&mut |tx: &mut dyn Transaction| {
                    tx.set(&conf, data(json!({ "text": text })))
                })
                .unwrap();
        }

        let doc = client.get(&conf).unwrap();
        assert_eq!(doc.data["text"], json!("second"));
        assert_eq!(db.dump("rules").len(), 1);
    }

    // ── Faults ────────────────────────────────────────────────────────────────

    #[test]
    fn test_write_fault_aborts_whole_transaction() {
        let db = MemoryDatabase::new();
        let client = db.connect();
        db.inject_fault(Fault::Write {
            after_writes: 2,
            error: RuleStoreError::PermissionDenied {
                reason: "quota".to_string(),
            },
        });

        let err = client
            .run_transaction(&mut |tx: &mut dyn Transaction| {
                for i in 0..4 {
                    tx.create("rules", data(json!({ "p_type": "p", "v0": i.to_string() })))?;
                }
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, RuleStoreError::PermissionDenied { .. }));
        assert!(db.dump("rules").is_empty());

        // The fault is one-shot.
        client
            .run_transaction(&mut |tx: &mut dyn Transaction| {
                tx.create("rules", data(json!({ "p_type": "p" }))).map(|_| ())
            })
            .unwrap();
        assert_eq!(db.dump("rules").len(), 1);
    }

    #[test]
    fn test_commit_fault_discards_writes() {
        let db = MemoryDatabase::new();
        let client = db.connect();
        db.inject_fault(Fault::Commit {
            error: RuleStoreError::Aborted {
                reason: "contention".to_string(),
            },
        });

        let err = client
            .run_transaction(&mut |tx: &mut dyn Transaction| {
                tx.create("rules", data(json!({ "p_type": "p" }))).map(|_| ())
            })
            .unwrap_err();

        assert!(matches!(err, RuleStoreError::Aborted { .. }));
        assert!(db.dump("rules").is_empty());
    }

    #[test]
    fn test_read_fault_interrupts_stream() {
        let db = MemoryDatabase::new();
        seed(&db, "a", "p", "alice");
        seed(&db, "b", "p", "bob");
        let client = db.connect();
        db.inject_fault(Fault::Read {
            after_documents: 1,
            error: RuleStoreError::DeadlineExceeded {
                reason: "slow".to_string(),
            },
        });

        let items: Vec<_> = client.documents(&Query::new("rules")).unwrap().collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(RuleStoreError::DeadlineExceeded { .. })));
    }

    // ── Connections ───────────────────────────────────────────────────────────

    #[test]
    fn test_close_releases_connection() {
        let db = MemoryDatabase::new();
        let client = db.connect();
        let other = db.connect();
        assert_eq!(db.open_connections(), 2);

        client.close().unwrap();
        assert_eq!(db.open_connections(), 1);
        assert!(matches!(
            client.documents(&Query::new("rules")),
            Err(RuleStoreError::Unavailable { .. })
        ));
        assert!(client.close().is_err(), "double close must be reported");

        // Other connections are unaffected.
        assert_eq!(other.documents(&Query::new("rules")).unwrap().count(), 0);
    }
}
