//! Tag codec
//!
//! AWS APIs carry resource tags as an ordered list of `{"Key": .., "Value": ..}`
//! records; locally we want a plain mapping. Conversion is lossless except
//! that duplicate wire keys collapse last-write-wins in mapping form.

use serde_json::{json, Value};
use std::collections::BTreeMap;

/// `[{"Key": "xyz", "Value": "abc"}, ...]` -> `{"xyz": "abc", ...}`
///
/// Entries without a string `Key`/`Value` pair are skipped.
pub fn parse_tag_list(tag_list: &Value) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    if let Some(entries) = tag_list.as_array() {
        for entry in entries {
            let key = entry.get("Key").and_then(|v| v.as_str());
            let value = entry.get("Value").and_then(|v| v.as_str());
            if let (Some(key), Some(value)) = (key, value) {
                tags.insert(key.to_string(), value.to_string());
            }
        }
    }
    tags
}

/// `{"xyz": "abc", ...}` -> `[{"Key": "xyz", "Value": "abc"}, ...]`
pub fn assemble_tag_list(tags: &BTreeMap<String, String>) -> Value {
    Value::Array(
        tags.iter()
            .map(|(key, value)| json!({ "Key": key, "Value": value }))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_mapping() {
        let mut tags = BTreeMap::new();
        tags.insert("Name".to_string(), "x".to_string());
        tags.insert("env".to_string(), "prod".to_string());

        let wire = assemble_tag_list(&tags);
        assert_eq!(parse_tag_list(&wire), tags);
    }

    #[test]
    fn duplicate_wire_keys_collapse_last_write_wins() {
        let wire = json!([
            { "Key": "Name", "Value": "first" },
            { "Key": "Name", "Value": "second" },
        ]);
        let tags = parse_tag_list(&wire);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags["Name"], "second");
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let wire = json!([
            { "Key": "ok", "Value": "yes" },
            { "Key": "no-value" },
            { "Value": "no-key" },
            { "Key": 42, "Value": "typed" },
        ]);
        let tags = parse_tag_list(&wire);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags["ok"], "yes");
    }

    #[test]
    fn non_array_input_yields_empty_mapping() {
        assert!(parse_tag_list(&Value::Null).is_empty());
        assert!(parse_tag_list(&json!({"Key": "x"})).is_empty());
    }
}
