//! Canonical JSON serialization for deterministic fingerprints
//!
//! Sorted map keys, no whitespace, blake3 over the resulting bytes. Used to
//! compare models produced by independent training runs.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::errors::Result;

/// Serialize a value to canonical JSON (sorted keys, no whitespace)
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let json_value = serde_json::to_value(value)?;
    let canonical = canonicalize_value(&json_value);
    Ok(serde_json::to_string(&canonical)?)
}

/// Sort all object keys recursively
fn canonicalize_value(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let sorted: BTreeMap<_, _> = map
                .iter()
                .map(|(k, v)| (k.clone(), canonicalize_value(v)))
                .collect();
            serde_json::Value::Object(sorted.into_iter().collect())
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(canonicalize_value).collect())
        }
        other => other.clone(),
    }
}

/// Blake3 hash of the canonical JSON representation
pub fn hash_canonical<T: Serialize>(value: &T) -> Result<[u8; 32]> {
    let json = to_canonical_json(value)?;
    Ok(*blake3::hash(json.as_bytes()).as_bytes())
}

/// Blake3 hash of the canonical JSON representation, hex encoded
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> Result<String> {
    Ok(hex::encode(hash_canonical(value)?))
}
