//! Filter planning for filtered bulk removal.
//!
//! A caller addresses stored fields with an offset and a list of values:
//! `(field_index, field_values)` covers the absolute positions
//! `field_index .. field_index + field_values.len()`. Every position in
//! `0..MAX_FIELDS` that falls inside that window and carries a non-empty
//! value becomes an equality constraint. Positions outside the window, and
//! empty values, are wildcards.
//!
//! `field_index` may be negative; the part of the window before position 0
//! addresses nothing.

use rulestore_contracts::rule::{FIELD_NAMES, MAX_FIELDS};

/// Equality constraint on one stored field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConstraint {
    /// Absolute field position, `0..MAX_FIELDS`.
    pub position: usize,
    /// Required value; never empty.
    pub value: String,
}

impl FieldConstraint {
    /// The document field this constraint applies to (`v0` .. `v5`).
    pub fn field_name(&self) -> &'static str {
        FIELD_NAMES[self.position]
    }
}

/// Compute the field constraints for `(field_index, field_values)`.
///
/// Constraints come back in ascending position order.
pub fn plan(field_index: i32, field_values: &[String]) -> Vec<FieldConstraint> {
    let start = i64::from(field_index);
    let end = start.saturating_add(field_values.len() as i64);

    (0..MAX_FIELDS)
        .filter_map(|position| {
            let absolute = position as i64;
            if absolute < start || absolute >= end {
                return None;
            }
            let value = &field_values[(absolute - start) as usize];
            if value.is_empty() {
                return None;
            }
            Some(FieldConstraint {
                position,
                value: value.clone(),
            })
        })
        .collect()
}
