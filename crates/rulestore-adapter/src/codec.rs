//! Mapping between `PolicyLine` and the fixed-width `PolicyRecord`.
//!
//! Encoding places field `i` in slot `vi` and leaves the remaining slots
//! empty. Decoding keeps the longest run of non-empty slots starting at
//! `v0`: the first empty slot ends the rule, and anything stored after it is
//! ignored. This is the only place an empty string stands in for "absent".

use tracing::warn;

use rulestore_contracts::{
    error::{RuleStoreError, RuleStoreResult},
    rule::{PolicyLine, PolicyRecord, MAX_FIELDS},
};

/// Encode `rule` of type `ptype` as a flat record.
///
/// Fields past `MAX_FIELDS` have no slot and are dropped with a warning.
pub fn encode(ptype: &str, rule: &[String]) -> PolicyRecord {
    if rule.len() > MAX_FIELDS {
        warn!(
            ptype = %ptype,
            fields = rule.len(),
            max = MAX_FIELDS,
            "rule has more fields than a record can hold; truncating"
        );
    }

    let mut record = PolicyRecord {
        ptype: ptype.to_string(),
        ..Default::default()
    };
    for (index, value) in rule.iter().enumerate().take(MAX_FIELDS) {
        if let Some(slot) = record.value_mut(index) {
            slot.clone_from(value);
        }
    }
    record
}

/// Encode a `PolicyLine`.
pub fn encode_line(line: &PolicyLine) -> PolicyRecord {
    encode(&line.ptype, &line.fields)
}

/// Decode a record into its section and policy line.
///
/// A record whose `v0` is empty decodes to a zero-field line; that is kept,
/// not rejected. Returns `RuleStoreError::Decode` only when the record has no
/// policy type to derive a section from.
pub fn decode(record: &PolicyRecord) -> RuleStoreResult<(String, PolicyLine)> {
    let fields: Vec<String> = record
        .values()
        .into_iter()
        .take_while(|value| !value.is_empty())
        .map(str::to_string)
        .collect();

    let line = PolicyLine::new(record.ptype.clone(), fields);
    let section = line.section().ok_or_else(|| RuleStoreError::Decode {
        reason: "record has an empty policy type".to_string(),
    })?;
    Ok((section, line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn three_field_rule_decodes_to_three_fields() {
        let rule = strings(&["alice", "data1", "read"]);
        let record = encode("p", &rule);
        assert_eq!(record.values(), ["alice", "data1", "read", "", "", ""]);

        let (section, line) = decode(&record).unwrap();
        assert_eq!(section, "p");
        assert_eq!(line.ptype, "p");
        assert_eq!(line.fields, rule, "decode must not pad with trailing empties");
    }

    #[test]
    fn full_width_rule_keeps_all_fields() {
        let rule = strings(&["domain1", "alice", "data3", "read", "accept", "service1"]);
        let (_, line) = decode(&encode("p", &rule)).unwrap();
        assert_eq!(line.fields, rule);
    }

    #[test]
    fn section_comes_from_type_prefix() {
        let (section, line) = decode(&encode("g2", &strings(&["alice", "admin"]))).unwrap();
        assert_eq!(section, "g");
        assert_eq!(line.ptype, "g2");
    }

    #[test]
    fn empty_rule_decodes_to_zero_fields() {
        let record = encode("p", &[]);
        let (section, line) = decode(&record).unwrap();
        assert_eq!(section, "p");
        assert!(line.fields.is_empty());
    }

    #[test]
    fn decode_stops_at_first_empty_slot() {
        let record = PolicyRecord {
            ptype: "p".to_string(),
            v0: "alice".to_string(),
            v1: String::new(),
            v2: "read".to_string(),
            ..Default::default()
        };
        let (_, line) = decode(&record).unwrap();
        assert_eq!(line.fields, strings(&["alice"]));
    }

    #[test]
    fn overlong_rule_is_truncated() {
        let rule = strings(&["a", "b", "c", "d", "e", "f", "g"]);
        let (_, line) = decode(&encode("p", &rule)).unwrap();
        assert_eq!(line.fields, rule[..MAX_FIELDS].to_vec());
    }

    #[test]
    fn empty_type_is_decode_error() {
        let record = PolicyRecord::default();
        assert!(matches!(decode(&record), Err(RuleStoreError::Decode { .. })));
    }

    #[test]
    fn encode_line_matches_encode() {
        let line = PolicyLine::new("g", strings(&["bob", "admin"]));
        assert_eq!(encode_line(&line), encode("g", &line.fields));
    }
}
