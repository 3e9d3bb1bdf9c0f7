//! omg-query
//!
//! Schema-driven query/mutation compiler and validator for OpenMetaGraph:
//! - [`resolver`]: expands schema/alias addresses into concrete schemas
//! - [`compiler`]: turns a schema set into typed object types, deduplicated
//!   by schema-set identity
//! - [`validator`]: per-key shape and cardinality rules for payloads and
//!   documents
//! - [`materializer`]: nested payload -> flat documents, children stored first
//! - [`surface`]: `get` / `createSchema` / `createDocument` / `createAlias`
//!
//! All I/O goes through the [`omg_core::capability::Capabilities`] handed in
//! by the host.

pub mod compiler;
pub mod input;
pub mod materializer;
pub mod merge;
pub mod naming;
pub mod reader;
pub mod resolver;
pub mod selection;
pub mod surface;
pub mod types;
pub mod validator;

pub use compiler::{CompiledSurface, TypeCompiler};
pub use input::{AliasInput, CreateResponse, FileKeyInput, KeyInput, NodeKeyInput, SchemaInput};
pub use resolver::{ResolvedSchema, ResolvedSet, SchemaResolver};
pub use selection::Selection;
pub use surface::{Operation, Response, ResponseError, Surface};
pub use types::{Direction, Field, FieldType, ObjectType, TypeIdentity, TypeRegistry};
pub use validator::Validator;
