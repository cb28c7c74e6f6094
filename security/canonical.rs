//! Canonical JSON serialization and audit hashing
//!
//! Hash equality must mean data equality, so hashing goes through an
//! explicit canonical form: object keys recursively sorted, numbers and
//! strings rendered exactly as serde_json does. Incidental key order in
//! the input never changes the digest.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Render a JSON value in canonical form
///
/// Objects are written with keys in ascending order at every level;
/// arrays keep their order. Output is compact (no whitespace).
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            // serde_json already renders scalars deterministically
            out.push_str(&value.to_string());
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            out.push('{');
            for (i, (key, item)) in sorted.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

/// Deterministic SHA-256 digest of a canonicalized payload
///
/// Always 64 lowercase hex characters. Same logical data gives the same
/// hash regardless of key ordering; any field change gives a different
/// hash.
pub fn audit_hash(value: &Value) -> String {
    let canonical = canonicalize(value);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
