//! Table checksums
//!
//! Hashes a whole table's rows into one hex digest so two runs can be
//! compared for byte-identical output. Serialized rows are normalized to
//! sorted-key JSON first, keeping the digest independent of field order.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::domain::{MercatorError, Result};

/// SHA-256 digest over a table's rows in their given order
///
/// # Errors
///
/// Returns [`MercatorError::Serialization`] if a row fails to serialize.
pub fn table_checksum<T: Serialize>(rows: &[T]) -> Result<String> {
    let mut hasher = Sha256::new();
    for row in rows {
        let value = serde_json::to_value(row)
            .map_err(|e| MercatorError::Serialization(e.to_string()))?;
        let normalized = normalize_json(&value);
        let line = serde_json::to_string(&normalized)
            .map_err(|e| MercatorError::Serialization(e.to_string()))?;
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    let result = hasher.finalize();
    Ok(format!("{result:x}"))
}

/// Recursively sorts object keys so field order never changes the digest
fn normalize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: std::collections::BTreeMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), normalize_json(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(arr) => Value::Array(arr.iter().map(normalize_json).collect()),
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tables::CustomerRow;

    #[test]
    fn test_checksum_is_deterministic() {
        let rows = vec![CustomerRow::unknown_member()];
        let first = table_checksum(&rows).unwrap();
        let second = table_checksum(&rows).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_checksum_changes_with_content() {
        let unknown_only = vec![CustomerRow::unknown_member()];
        let mut renamed = unknown_only.clone();
        renamed[0].country = "France".to_string();
        assert_ne!(
            table_checksum(&unknown_only).unwrap(),
            table_checksum(&renamed).unwrap()
        );
    }

    #[test]
    fn test_checksum_changes_with_row_order() {
        let a = CustomerRow::unknown_member();
        let mut b = CustomerRow::unknown_member();
        b.country = "France".to_string();
        assert_ne!(
            table_checksum(&[a.clone(), b.clone()]).unwrap(),
            table_checksum(&[b, a]).unwrap()
        );
    }

    #[test]
    fn test_empty_table_has_stable_checksum() {
        let rows: Vec<CustomerRow> = Vec::new();
        let first = table_checksum(&rows).unwrap();
        let second = table_checksum(&rows).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let scrambled = serde_json::json!([{"b": 2, "a": 1}]);
        let sorted = serde_json::json!([{"a": 1, "b": 2}]);
        let scrambled_rows = scrambled.as_array().unwrap();
        let sorted_rows = sorted.as_array().unwrap();
        assert_eq!(
            table_checksum(scrambled_rows).unwrap(),
            table_checksum(sorted_rows).unwrap()
        );
    }
}
