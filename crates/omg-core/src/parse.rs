//! Parsing helpers for stored OpenMetaGraph resources.
//!
//! Core crate avoids filesystem/network I/O. Parsing helpers in this module operate on:
//! - in-memory bytes
//! - in-memory JSON values
//!
//! This module provides:
//! - strict JSON parsing with size limits
//! - resource kind detection from the `kind` discriminant
//! - typed decoding into [`Resource`]
//!
//! Callers pass explicit limits (see `LimitsConfig::max_resource_bytes`).

use serde_json::Value;

use crate::errors::{OmgError, OmgResult};
use crate::model::{Resource, ResourceKind};

/// Default maximum JSON bytes accepted by helpers (2 MiB).
pub const DEFAULT_MAX_RESOURCE_BYTES: usize = 2 * 1024 * 1024;

/// Parse JSON bytes into `serde_json::Value` with a hard size limit.
pub fn parse_json_bytes(bytes: &[u8], max_bytes: usize) -> OmgResult<Value> {
    if bytes.len() > max_bytes {
        return Err(OmgError::invalid_argument(format!(
            "JSON payload too large ({} bytes > limit {})",
            bytes.len(),
            max_bytes
        )));
    }

    serde_json::from_slice(bytes)
        .map_err(|e| OmgError::serialization(format!("failed to parse JSON: {e}")))
}

/// Detect the resource kind of a parsed JSON value.
///
/// Returns `None` for non-objects, a missing `kind`, or an unknown kind.
pub fn detect_kind(v: &Value) -> Option<ResourceKind> {
    v.as_object()?
        .get("kind")
        .and_then(Value::as_str)
        .and_then(ResourceKind::parse)
}

/// Decode a JSON value into a typed resource.
pub fn resource_from_value(v: Value) -> OmgResult<Resource> {
    if detect_kind(&v).is_none() {
        let kind = v
            .get("kind")
            .map(|k| k.to_string())
            .unwrap_or_else(|| "<missing>".to_string());
        return Err(OmgError::serialization(format!(
            "unrecognized resource kind: {kind}"
        )));
    }
    serde_json::from_value(v)
        .map_err(|e| OmgError::serialization(format!("malformed resource: {e}")))
}

/// Parse resource bytes with a size limit.
pub fn parse_resource(bytes: &[u8], max_bytes: usize) -> OmgResult<Resource> {
    let v = parse_json_bytes(bytes, max_bytes)?;
    resource_from_value(v)
}
