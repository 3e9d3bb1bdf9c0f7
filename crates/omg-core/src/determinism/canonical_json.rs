//! Canonical JSON encoding.
//!
//! Rules:
//! - object keys are sorted lexicographically (byte order), recursively
//! - array order is preserved (element order in documents is significant)
//! - no insignificant whitespace
//! - strings and numbers use serde_json's escaping and formatting
//!
//! Two resources with the same canonical bytes always get the same content
//! address, whatever order their maps were built in.

use itertools::Itertools;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{OmgError, OmgResult};
use crate::model::Resource;

/// Return a copy of `value` with every object rebuilt in sorted key order.
pub fn canonicalize_json(value: &Value) -> OmgResult<Value> {
    Ok(match value {
        Value::Object(obj) => {
            let mut out = Map::new();
            for (k, v) in obj.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
                out.insert(k.clone(), canonicalize_json(v)?);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(canonicalize_json)
                .collect::<OmgResult<Vec<_>>>()?,
        ),
        other => other.clone(),
    })
}

/// Encode a JSON value to canonical bytes.
pub fn to_canonical_bytes(value: &Value) -> OmgResult<Vec<u8>> {
    let mut out = Vec::new();
    write_value(&mut out, value)?;
    Ok(out)
}

/// Encode any serializable value (typically a [`Resource`]) to canonical bytes.
pub fn to_canonical_bytes_of<T: Serialize>(value: &T) -> OmgResult<Vec<u8>> {
    let v = serde_json::to_value(value)
        .map_err(|e| OmgError::serialization(format!("failed to serialize value: {e}")))?;
    to_canonical_bytes(&v)
}

/// Canonical bytes of a resource, as hashed and persisted by stores.
pub fn resource_bytes(resource: &Resource) -> OmgResult<Vec<u8>> {
    to_canonical_bytes_of(resource)
}

fn write_value(out: &mut Vec<u8>, value: &Value) -> OmgResult<()> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_string(out, s)?,
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(out, item)?;
            }
            out.push(b']');
        }
        Value::Object(obj) => {
            out.push(b'{');
            for (i, (k, v)) in obj.iter().sorted_by(|a, b| a.0.cmp(b.0)).enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(out, k)?;
                out.push(b':');
                write_value(out, v)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn write_string(out: &mut Vec<u8>, s: &str) -> OmgResult<()> {
    serde_json::to_writer(&mut *out, s)
        .map_err(|e| OmgError::serialization(format!("failed to encode string: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_sorted_recursively() {
        let v = json!({"b": [3, 2, 1], "a": {"y": 2, "x": 1}});
        let bytes = to_canonical_bytes(&v).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"a":{"x":1,"y":2},"b":[3,2,1]}"#
        );
    }

    #[test]
    fn canonicalize_is_stable() {
        let v = json!({"z": "q\"uote", "a": [{"d": 1, "c": 2}]});
        let c1 = canonicalize_json(&v).unwrap();
        let c2 = canonicalize_json(&c1).unwrap();
        assert_eq!(c1, c2);
        assert_eq!(to_canonical_bytes(&c1).unwrap(), to_canonical_bytes(&v).unwrap());
    }
}
