//! Document, reference, and query types for the storage seam.
//!
//! These mirror what a remote document database exposes: collections of
//! JSON-object documents addressed by backend-assigned ids, and queries made
//! of ANDed single-field comparisons.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::error::{RuleStoreError, RuleStoreResult};

/// The field map stored in one document.
pub type DocumentData = Map<String, Value>;

/// Address of a single document: `collection/id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef {
    pub collection: String,
    pub id: String,
}

impl DocumentRef {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Slash-separated path, used in error messages and logs.
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A document snapshot returned by a read.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub reference: DocumentRef,
    pub data: DocumentData,
    pub create_time: DateTime<Utc>,
}

impl Document {
    /// Deserialize the document's fields into `T`.
    ///
    /// Returns `RuleStoreError::Decode` when the fields do not fit `T`.
    pub fn data_to<T: DeserializeOwned>(&self) -> RuleStoreResult<T> {
        serde_json::from_value(Value::Object(self.data.clone())).map_err(|e| {
            RuleStoreError::Decode {
                reason: format!("document '{}': {}", self.reference, e),
            }
        })
    }
}

/// Serialize `value` into a document field map.
///
/// Fails with `RuleStoreError::Decode` when `value` does not serialize to a
/// JSON object.
pub fn to_document_data<T: Serialize>(value: &T) -> RuleStoreResult<DocumentData> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RuleStoreError::Decode {
            reason: format!("expected an object, got {}", other),
        }),
        Err(e) => Err(RuleStoreError::Decode {
            reason: e.to_string(),
        }),
    }
}

/// Comparison applied by a `FieldFilter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// The field is a string equal to the operand.
    Equal,
    /// The field is a string ordered after the operand.
    GreaterThan,
}

/// One `field <op> value` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

/// A collection scan narrowed by ANDed field filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<FieldFilter>,
}

impl Query {
    /// A query matching every document in `collection`.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
        }
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter(field, FilterOp::Equal, value)
    }

    pub fn where_gt(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter(field, FilterOp::GreaterThan, value)
    }

    fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// The operand of the equality filter on `field`, if one was added.
    pub fn equality(&self, field: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.field == field && f.op == FilterOp::Equal)
            .map(|f| f.value.as_str())
    }
}
