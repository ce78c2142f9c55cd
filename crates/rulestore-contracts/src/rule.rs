//! Policy lines and their flat storage records.
//!
//! A `PolicyLine` is the in-memory form of one rule: a policy type plus an
//! ordered, variable-length list of fields. A `PolicyRecord` is the fixed
//! six-slot shape written to the document store. Conversion between the two
//! happens only in the adapter's codec.

use serde::{Deserialize, Serialize};

/// Maximum number of fields a stored rule can carry.
pub const MAX_FIELDS: usize = 6;

/// Document field holding the policy type.
pub const PTYPE_FIELD: &str = "p_type";

/// Document field names for field positions `0..MAX_FIELDS`.
pub const FIELD_NAMES: [&str; MAX_FIELDS] = ["v0", "v1", "v2", "v3", "v4", "v5"];

/// One policy rule, tagged with the policy type it belongs to.
///
/// `fields` holds only the fields that are present. An empty string never
/// appears here as a placeholder for a missing trailing field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolicyLine {
    /// Policy type key, e.g. `"p"`, `"p2"`, `"g"`.
    pub ptype: String,
    /// The rule's fields, in order.
    pub fields: Vec<String>,
}

impl PolicyLine {
    pub fn new(ptype: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            ptype: ptype.into(),
            fields,
        }
    }

    /// The model section this line belongs to: the first character of its
    /// policy type. `None` when the type is empty.
    pub fn section(&self) -> Option<String> {
        self.ptype.chars().next().map(String::from)
    }
}

/// The fixed-width record stored for every policy line.
///
/// Field names match the legacy wire layout so existing collections stay
/// readable. Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    #[serde(rename = "p_type")]
    pub ptype: String,
    #[serde(default)]
    pub v0: String,
    #[serde(default)]
    pub v1: String,
    #[serde(default)]
    pub v2: String,
    #[serde(default)]
    pub v3: String,
    #[serde(default)]
    pub v4: String,
    #[serde(default)]
    pub v5: String,
}

impl PolicyRecord {
    /// The six value slots in position order.
    pub fn values(&self) -> [&str; MAX_FIELDS] {
        [
            &self.v0, &self.v1, &self.v2, &self.v3, &self.v4, &self.v5,
        ]
    }

    /// Mutable access to the slot at `index`, or `None` past the last slot.
    pub fn value_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.v0),
            1 => Some(&mut self.v1),
            2 => Some(&mut self.v2),
            3 => Some(&mut self.v3),
            4 => Some(&mut self.v4),
            5 => Some(&mut self.v5),
            _ => None,
        }
    }
}
