//! # rulestore-contracts
//!
//! Shared types, records, and errors for the rulestore policy adapter.
//!
//! All crates in the workspace import from here. No storage logic lives in
//! this crate: only data definitions, configuration, and error types.

pub mod config;
pub mod document;
pub mod error;
pub mod model;
pub mod rule;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use config::{StoreConfig, DEFAULT_COLLECTION};
    use document::{to_document_data, Document, DocumentRef, FilterOp, Query};
    use error::RuleStoreError;
    use model::PolicyModel;
    use rule::{PolicyLine, PolicyRecord};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    // ── StoreConfig ──────────────────────────────────────────────────────────

    #[test]
    fn collection_name_defaults_when_unset() {
        assert_eq!(StoreConfig::default().collection_name(), DEFAULT_COLLECTION);
        assert_eq!(StoreConfig::with_collection("").collection_name(), "casbin");
        assert_eq!(
            StoreConfig::with_collection("authz").collection_name(),
            "authz"
        );
    }

    #[test]
    fn config_parses_from_toml() {
        let config = StoreConfig::from_toml_str(r#"collection = "authz-unittest""#).unwrap();
        assert_eq!(config.collection_name(), "authz-unittest");

        let empty = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(empty.collection_name(), DEFAULT_COLLECTION);
    }

    #[test]
    fn config_toml_parse_error() {
        match StoreConfig::from_toml_str("collection = [") {
            Err(RuleStoreError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse store config TOML"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn config_missing_file_is_config_error() {
        let err = StoreConfig::from_file(std::path::Path::new("/nonexistent/rulestore.toml"))
            .unwrap_err();
        assert!(matches!(err, RuleStoreError::ConfigError { .. }));
    }

    // ── PolicyRecord serde ───────────────────────────────────────────────────

    #[test]
    fn record_uses_wire_field_names() {
        let record = PolicyRecord {
            ptype: "p".to_string(),
            v0: "alice".to_string(),
            v1: "data1".to_string(),
            v2: "read".to_string(),
            ..Default::default()
        };
        let data = to_document_data(&record).unwrap();
        assert_eq!(data["p_type"], json!("p"));
        assert_eq!(data["v0"], json!("alice"));
        assert_eq!(data["v5"], json!(""));
        assert!(!data.contains_key("ptype"));
    }

    #[test]
    fn record_missing_slots_decode_as_empty() {
        let data = json!({ "p_type": "g", "v0": "alice", "v1": "admin" });
        let doc = Document {
            reference: DocumentRef::new("casbin", "abc"),
            data: data.as_object().unwrap().clone(),
            create_time: chrono::Utc::now(),
        };
        let record: PolicyRecord = doc.data_to().unwrap();
        assert_eq!(record.values(), ["alice", "admin", "", "", "", ""]);
    }

    #[test]
    fn record_with_wrong_field_type_is_decode_error() {
        let data = json!({ "p_type": "p", "v0": 42 });
        let doc = Document {
            reference: DocumentRef::new("casbin", "bad"),
            data: data.as_object().unwrap().clone(),
            create_time: chrono::Utc::now(),
        };
        match doc.data_to::<PolicyRecord>() {
            Err(RuleStoreError::Decode { reason }) => assert!(reason.contains("casbin/bad")),
            other => panic!("expected Decode, got {:?}", other),
        }
    }

    // ── PolicyLine ───────────────────────────────────────────────────────────

    #[test]
    fn line_section_is_first_character_of_type() {
        assert_eq!(PolicyLine::new("p2", vec![]).section().as_deref(), Some("p"));
        assert_eq!(PolicyLine::new("g", vec![]).section().as_deref(), Some("g"));
        assert_eq!(PolicyLine::new("", vec![]).section(), None);
    }

    // ── PolicyModel ──────────────────────────────────────────────────────────

    #[test]
    fn model_add_and_get_policy() {
        let mut model = PolicyModel::new();
        model.add_policy("p", "p", strings(&["alice", "data1", "read"]));
        model.add_policy("g", "g", strings(&["alice", "admin"]));

        assert_eq!(model.get_policy("p", "p"), &[strings(&["alice", "data1", "read"])]);
        assert_eq!(model.get_policy("g", "g").len(), 1);
        assert!(model.get_policy("g", "g2").is_empty());
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn model_clear_keeps_declared_types() {
        let mut model = PolicyModel::new();
        model.declare("p", "p");
        model.add_policy("p", "p", strings(&["bob", "data2", "write"]));
        model.clear_policy();

        assert!(model.is_empty());
        assert!(model.assertion("p", "p").is_some());
    }

    // ── Query ────────────────────────────────────────────────────────────────

    #[test]
    fn query_builder_accumulates_filters_in_order() {
        let query = Query::new("casbin").where_gt("p_type", "").where_eq("v0", "alice");
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[0].op, FilterOp::GreaterThan);
        assert_eq!(query.equality("v0"), Some("alice"));
        assert_eq!(query.equality("p_type"), None);
    }

    // ── RuleStoreError display messages ──────────────────────────────────────

    #[test]
    fn error_not_found_display() {
        let err = RuleStoreError::NotFound {
            path: "casbin/conf".to_string(),
        };
        assert!(err.to_string().contains("document not found"));
        assert!(err.to_string().contains("casbin/conf"));
        assert!(err.is_storage());
    }

    #[test]
    fn error_invalid_model_is_not_storage() {
        let err = RuleStoreError::InvalidModel {
            reason: "missing section 'matchers'".to_string(),
        };
        assert!(err.to_string().contains("invalid model definition"));
        assert!(!err.is_storage());
    }
}
