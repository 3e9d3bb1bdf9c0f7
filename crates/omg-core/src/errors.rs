//! Error types shared by every OpenMetaGraph crate.
//!
//! The taxonomy mirrors the places a request can fail:
//! - resolution: an address does not resolve, resolves to the wrong kind, or
//!   alias expansion loops
//! - validation: a document or payload does not fit the merged schema shape
//! - compilation: merged schemas disagree about a key
//! - capability: the injected fetch/store failed (passed through with context)
//!
//! Every variant exposes a stable dotted `code()` for structured error lists.

use std::fmt;

use thiserror::Error;

use crate::model::{Address, ElementKind, ResourceKind};

pub type OmgResult<T> = Result<T, OmgError>;

/// Boxed error produced by an injected capability.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum OmgError {
    #[error("cannot resolve '{address}': {reason}")]
    Resolution {
        address: Address,
        reason: ResolutionReason,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cannot merge key '{key}': {reason}")]
    Compilation { key: String, reason: String },

    #[error("{op} failed for {target}: {source}")]
    Capability {
        op: CapabilityOp,
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionReason {
    #[error("not found")]
    NotFound,

    #[error("expected {expected}, got {actual}")]
    WrongKind { expected: String, actual: ResourceKind },

    #[error("alias cycle {}", join_path(.path))]
    AliasCycle { path: Vec<Address> },

    #[error("alias nesting exceeds {limit}")]
    DepthExceeded { limit: usize },
}

fn join_path(path: &[Address]) -> String {
    path.iter()
        .map(Address::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Which capability call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityOp {
    Fetch,
    Store,
}

impl fmt::Display for CapabilityOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityOp::Fetch => f.write_str("fetch"),
            CapabilityOp::Store => f.write_str("store"),
        }
    }
}

/// A document or payload that does not fit a schema.
///
/// `path` is the dotted key path of the offending value (`inner.data`,
/// `photos[1]`), or empty for the root.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}{kind}", path_prefix(.path))]
pub struct ValidationError {
    pub path: String,
    pub kind: ValidationErrorKind,
}

fn path_prefix(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("'{path}': ")
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationErrorKind {
    #[error("key is not defined by any requested schema")]
    UnknownKey,

    #[error("required {expected} value is missing")]
    Missing { expected: String },

    #[error("key is not multiple, yet {count} values are present")]
    Duplicate { count: usize },

    #[error("expected a {expected} element, got {actual}")]
    KindMismatch {
        expected: ElementKind,
        actual: ElementKind,
    },

    #[error("expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("content type '{content_type}' is not one of [{}]", .allowed.join(", "))]
    ContentTypeNotAllowed {
        content_type: String,
        allowed: Vec<String>,
    },
}

impl ValidationError {
    pub fn new(path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            ValidationErrorKind::UnknownKey => "validation.unknown_key",
            ValidationErrorKind::Missing { .. } | ValidationErrorKind::Duplicate { .. } => {
                "validation.cardinality"
            }
            ValidationErrorKind::KindMismatch { .. } => "validation.kind",
            ValidationErrorKind::ShapeMismatch { .. } => "validation.shape",
            ValidationErrorKind::ContentTypeNotAllowed { .. } => "validation.content_type",
        }
    }
}

impl OmgError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        OmgError::InvalidArgument(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        OmgError::Serialization(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        OmgError::Invariant(msg.into())
    }

    pub fn not_found(address: &Address) -> Self {
        OmgError::Resolution {
            address: address.clone(),
            reason: ResolutionReason::NotFound,
        }
    }

    pub fn wrong_kind(
        address: &Address,
        expected: impl Into<String>,
        actual: ResourceKind,
    ) -> Self {
        OmgError::Resolution {
            address: address.clone(),
            reason: ResolutionReason::WrongKind {
                expected: expected.into(),
                actual,
            },
        }
    }

    pub fn conflict(key: impl Into<String>, reason: impl Into<String>) -> Self {
        OmgError::Compilation {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        OmgError::Validation(ValidationError::new(path, kind))
    }

    pub fn capability<E>(op: CapabilityOp, target: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        OmgError::Capability {
            op,
            target: target.into(),
            source: source.into(),
        }
    }

    /// Stable dotted error code.
    pub fn code(&self) -> &'static str {
        match self {
            OmgError::Resolution { reason, .. } => match reason {
                ResolutionReason::NotFound => "resolution.not_found",
                ResolutionReason::WrongKind { .. } => "resolution.wrong_kind",
                ResolutionReason::AliasCycle { .. } => "resolution.alias_cycle",
                ResolutionReason::DepthExceeded { .. } => "resolution.depth_exceeded",
            },
            OmgError::Validation(v) => v.code(),
            OmgError::Compilation { .. } => "compilation.conflict",
            OmgError::Capability { op, .. } => match op {
                CapabilityOp::Fetch => "capability.fetch",
                CapabilityOp::Store => "capability.store",
            },
            OmgError::Serialization(_) => "serialization",
            OmgError::InvalidArgument(_) => "invalid_argument",
            OmgError::Invariant(_) => "invariant",
        }
    }

    /// Dotted key path of a validation failure, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            OmgError::Validation(v) if !v.path.is_empty() => Some(&v.path),
            _ => None,
        }
    }

    /// Prefix the key path of a validation failure with `key`.
    pub fn within(self, key: &str) -> Self {
        match self {
            OmgError::Validation(mut v) => {
                v.path = if v.path.is_empty() {
                    key.to_string()
                } else if v.path.starts_with('[') {
                    format!("{key}{}", v.path)
                } else {
                    format!("{key}.{}", v.path)
                };
                OmgError::Validation(v)
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for OmgError {
    fn from(e: serde_json::Error) -> Self {
        OmgError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_cycle_message_shows_path() {
        let e = OmgError::Resolution {
            address: Address::from("a"),
            reason: ResolutionReason::AliasCycle {
                path: vec![Address::from("a"), Address::from("b"), Address::from("a")],
            },
        };
        assert_eq!(e.to_string(), "cannot resolve 'a': alias cycle a -> b -> a");
        assert_eq!(e.code(), "resolution.alias_cycle");
    }

    #[test]
    fn within_builds_dotted_paths() {
        let e = OmgError::validation("data", ValidationErrorKind::UnknownKey)
            .within("[0]")
            .within("inner");
        assert_eq!(e.path(), Some("inner[0].data"));
        assert!(e.to_string().starts_with("'inner[0].data': "));
    }

    #[test]
    fn capability_errors_keep_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let e = OmgError::capability(CapabilityOp::Store, "schema", io);
        assert_eq!(e.code(), "capability.store");
        assert!(e.to_string().contains("disk on fire"));
    }
}
