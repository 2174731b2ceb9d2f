//! Enrichment records and the priority merge.

use std::collections::BTreeMap;

use serde_json::Value;

/// Field name -> value, as returned by one source or the merged result.
pub type EnrichmentRecord = BTreeMap<String, Value>;

/// Whether a field value carries no information.
///
/// Null, `false`, zero, and empty strings, arrays and objects are all empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Merges records given in priority order, highest first.
///
/// Each field takes the first non-empty value seen; later records only fill
/// gaps and never overwrite a populated field.
pub fn merge_records<I>(records: I) -> EnrichmentRecord
where
    I: IntoIterator<Item = EnrichmentRecord>,
{
    let mut merged = EnrichmentRecord::new();

    for record in records {
        for (field, value) in record {
            if is_empty_value(&value) {
                continue;
            }
            merged.entry(field).or_insert(value);
        }
    }

    merged
}
