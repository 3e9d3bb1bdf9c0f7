//! OpenMetaGraph data models.
//!
//! This module defines the strongly-typed Rust representations of the three
//! resource kinds that live in a content-addressed store:
//! - [`Document`]: a flat list of typed elements, optionally referencing other documents
//! - [`Schema`]: a per-key shape declaration for documents
//! - [`Alias`]: a named pointer to one or more schema-or-alias addresses
//!
//! Design goals:
//! - **Wire fidelity:** serde derives produce exactly the JSON shape that is stored
//!   and fetched (`kind` discriminated, element order preserved).
//! - **Deterministic serialization:** the bytes used for content addressing are
//!   produced by `crate::determinism::canonical_json`, not by default serde output.
//! - **Minimal policy:** models are mostly "dumb" data. Resolution, merging and
//!   validation live in higher layers.

use std::fmt;

use serde::{Deserialize, Serialize};

mod document;
mod element;
mod schema;

pub use document::Document;
pub use element::{Element, ElementKind};
pub use schema::{Alias, ElementDef, Schema};

/// Scheme prefix accepted (and stripped) on addresses handed in by callers.
pub const IPFS_SCHEME: &str = "ipfs://";

/// Opaque content address of an immutable stored resource.
///
/// Equality is exact string match; two resources are the same iff their
/// addresses are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the address with an `ipfs://` scheme prefix removed.
    pub fn normalized(&self) -> Address {
        match self.0.strip_prefix(IPFS_SCHEME) {
            Some(rest) => Address(rest.to_string()),
            None => self.clone(),
        }
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Discriminant of a stored resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Document,
    Schema,
    Alias,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Schema => "schema",
            Self::Alias => "alias",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "document" => Some(Self::Document),
            "schema" => Some(Self::Schema),
            "alias" => Some(Self::Alias),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any resource that can be stored under a content address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resource {
    Document(Document),
    Schema(Schema),
    Alias(Alias),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Document(_) => ResourceKind::Document,
            Resource::Schema(_) => ResourceKind::Schema,
            Resource::Alias(_) => ResourceKind::Alias,
        }
    }

    /// Human-readable name, if the resource kind carries one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Resource::Document(_) => None,
            Resource::Schema(s) => Some(&s.name),
            Resource::Alias(a) => Some(&a.name),
        }
    }
}

impl From<Document> for Resource {
    fn from(d: Document) -> Self {
        Resource::Document(d)
    }
}

impl From<Schema> for Resource {
    fn from(s: Schema) -> Self {
        Resource::Schema(s)
    }
}

impl From<Alias> for Resource {
    fn from(a: Alias) -> Self {
        Resource::Alias(a)
    }
}

/// Lightweight structural checks for model consumers.
///
/// These checks only look at one resource in isolation; they never fetch.
pub mod validate {
    use super::*;
    use crate::errors::{OmgError, OmgResult};

    /// Validate that a schema is well-formed:
    /// - the name is not empty
    /// - no element key is empty
    /// - every `node` definition names at least one schema
    pub fn schema_basic(schema: &Schema) -> OmgResult<()> {
        if schema.name.trim().is_empty() {
            return Err(OmgError::invalid_argument("schema name must not be empty"));
        }
        for (key, def) in &schema.elements {
            if key.is_empty() {
                return Err(OmgError::invalid_argument("schema element keys must not be empty"));
            }
            if let ElementDef::Node { schemas, .. } = def {
                if schemas.is_empty() {
                    return Err(OmgError::invalid_argument(format!(
                        "node element '{key}' must reference at least one schema"
                    )));
                }
                if schemas.iter().any(Address::is_empty) {
                    return Err(OmgError::invalid_argument(format!(
                        "node element '{key}' references an empty address"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validate that an alias is well-formed (non-empty name, no empty addresses).
    pub fn alias_basic(alias: &Alias) -> OmgResult<()> {
        if alias.name.trim().is_empty() {
            return Err(OmgError::invalid_argument("alias name must not be empty"));
        }
        if alias.schemas.iter().any(Address::is_empty) {
            return Err(OmgError::invalid_argument(format!(
                "alias '{}' references an empty address",
                alias.name
            )));
        }
        Ok(())
    }

    /// Validate that every element of a document has a non-empty key.
    pub fn document_basic(doc: &Document) -> OmgResult<()> {
        for (i, el) in doc.elements.iter().enumerate() {
            if el.key().is_empty() {
                return Err(OmgError::invalid_argument(format!(
                    "document element {i} has an empty key"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn address_strips_ipfs_scheme() {
        let a = Address::from("ipfs://QmCid");
        assert_eq!(a.normalized(), Address::from("QmCid"));
        assert_eq!(Address::from("QmCid").normalized(), Address::from("QmCid"));
    }

    #[test]
    fn resource_is_tagged_by_kind() {
        let v = json!({
            "kind": "alias",
            "version": "0.1.0",
            "name": "bundle",
            "schemas": ["a", "b"]
        });
        let r: Resource = serde_json::from_value(v.clone()).unwrap();
        assert_eq!(r.kind(), ResourceKind::Alias);
        assert_eq!(r.name(), Some("bundle"));
        assert_eq!(serde_json::to_value(&r).unwrap(), v);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let v = json!({"kind": "omg", "version": "0.1.0"});
        assert!(serde_json::from_value::<Resource>(v).is_err());
    }

    #[test]
    fn schema_basic_rejects_empty_node_schemas() {
        let v = json!({
            "kind": "schema",
            "version": "0.1.0",
            "name": "s",
            "elements": { "inner": { "kind": "node", "multiple": false, "schemas": [] } }
        });
        let Resource::Schema(s) = serde_json::from_value(v).unwrap() else {
            panic!("expected schema");
        };
        let err = validate::schema_basic(&s).unwrap_err();
        assert!(err.to_string().contains("at least one schema"));
    }
}
