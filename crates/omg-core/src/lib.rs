//! omg-core
//!
//! Core primitives for OpenMetaGraph:
//! - Document/Schema/Alias models and their JSON wire format
//! - Canonical JSON encoding for deterministic content addressing
//! - Hashing utilities with domain separation
//! - Fetch/store capability traits injected into every higher layer
//! - Untyped traversal over documents linked by `node` elements

pub mod capability;
pub mod config;
pub mod determinism;
pub mod errors;
pub mod graph;
pub mod model;
pub mod parse;
pub mod version;

pub use crate::errors::{OmgError, OmgResult};

/// Format version stamped on resources created by this crate family.
pub const FORMAT_VERSION: &str = "0.1.0";

/// Domain separation labels.
/// These must remain stable across versions.
pub mod domain {
    pub const TYPE_NAME: &str = "omg.v1.typename";
}

/// Convenience re-exports.
pub mod prelude {
    pub use crate::capability::{Capabilities, ContentStore, Fetcher};
    pub use crate::config::{CoreConfig, MergePolicy};
    pub use crate::determinism::canonical_json::{canonicalize_json, to_canonical_bytes};
    pub use crate::determinism::hashing::{hash_bytes_hex, HashAlg};
    pub use crate::graph::GraphNode;
    pub use crate::model::{
        Address, Alias, Document, Element, ElementDef, ElementKind, Resource, ResourceKind,
        Schema,
    };
    pub use crate::{OmgError, OmgResult};
}
