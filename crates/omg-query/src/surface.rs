//! The query/mutation surface.
//!
//! A [`Surface`] is compiled once for a requested schema set and then serves:
//! - `get(key)`: fetch a document and read the selected fields through the
//!   compiled types
//! - `createSchema`, `createAlias`: build, check and store a resource
//! - `createDocument`: validate and materialize a payload against the
//!   surface's schema set, then store the root document
//!
//! [`Surface::execute`] wraps these in an operation envelope whose failures
//! come back as a structured error list instead of an `Err`.
//!
//! A surface built from an empty schema list is schemaless: the create
//! operations for schemas and aliases work, `get` and `createDocument` fail
//! with "schema is required".

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use omg_core::capability::Capabilities;
use omg_core::config::{validate_config, CoreConfig};
use omg_core::model::{validate, Address, Resource};
use omg_core::{OmgError, OmgResult};

use crate::compiler::{CompiledSurface, TypeCompiler};
use crate::input::{AliasInput, CreateResponse, SchemaInput};
use crate::materializer::Materializer;
use crate::reader::DocumentReader;
use crate::resolver::SchemaResolver;
use crate::selection::Selection;
use crate::validator::Validator;

struct Compiled {
    surface: CompiledSurface,
    validator: Validator,
}

pub struct Surface {
    caps: Capabilities,
    config: CoreConfig,
    requested: Vec<Address>,
    compiled: Option<Compiled>,
}

impl Surface {
    /// Resolve and compile `schemas`. An empty list yields a schemaless surface.
    #[instrument(level = "info", skip_all, fields(schemas = schemas.len()))]
    pub async fn build(
        caps: Capabilities,
        config: CoreConfig,
        schemas: &[Address],
    ) -> OmgResult<Self> {
        validate_config(&config)?;
        let requested: Vec<Address> = schemas.iter().map(Address::normalized).collect();

        let compiled = if requested.is_empty() {
            None
        } else {
            let resolver = SchemaResolver::new(caps.clone(), config.limits.max_alias_depth);
            let surface = TypeCompiler::new(resolver, config.merge.policy)
                .compile(&requested)
                .await?;
            let validator = Validator::from_compiled(&surface);
            info!(
                root = %surface.root_type()?.name,
                types = surface.types().len(),
                "surface ready"
            );
            Some(Compiled { surface, validator })
        };

        Ok(Self {
            caps,
            config,
            requested,
            compiled,
        })
    }

    pub fn requested(&self) -> &[Address] {
        &self.requested
    }

    pub fn compiled(&self) -> Option<&CompiledSurface> {
        self.compiled.as_ref().map(|c| &c.surface)
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.compiled.as_ref().map(|c| &c.validator)
    }

    fn require(&self) -> OmgResult<&Compiled> {
        self.compiled
            .as_ref()
            .ok_or_else(|| OmgError::invalid_argument("schema is required"))
    }

    /// Every field of the root type, node types expanded to `max_node_depth`.
    pub fn default_selection(&self) -> OmgResult<Selection> {
        Selection::all(&self.require()?.surface, self.config.limits.max_node_depth)
    }

    /// Fetch the document at `address` and read `selection` from it. An
    /// empty selection reads everything (see [`default_selection`](Self::default_selection)).
    #[instrument(level = "debug", skip_all, fields(address = %address))]
    pub async fn get(&self, address: &Address, selection: &Selection) -> OmgResult<Value> {
        let compiled = self.require()?;
        let default;
        let selection = if selection.is_empty() {
            default = self.default_selection()?;
            &default
        } else {
            selection
        };

        let doc = self.caps.fetch_document(address).await?;
        validate::document_basic(&doc)?;
        let root = compiled.surface.root_type()?;
        DocumentReader::new(&self.caps, &compiled.surface)
            .read(root, doc, selection)
            .await
    }

    #[instrument(level = "debug", skip_all, fields(name = %input.name))]
    pub async fn create_schema(&self, input: SchemaInput) -> OmgResult<CreateResponse> {
        let schema = input.into_schema(&self.config.format.version)?;
        let key = self.caps.store(&Resource::Schema(schema)).await?;
        debug!(key = %key, "schema created");
        Ok(CreateResponse { key })
    }

    #[instrument(level = "debug", skip_all, fields(name = %input.name))]
    pub async fn create_alias(&self, input: AliasInput) -> OmgResult<CreateResponse> {
        let alias = input.into_alias(&self.config.format.version)?;
        let key = self.caps.store(&Resource::Alias(alias)).await?;
        debug!(key = %key, "alias created");
        Ok(CreateResponse { key })
    }

    #[instrument(level = "debug", skip_all)]
    pub async fn create_document(&self, payload: &Value) -> OmgResult<CreateResponse> {
        let compiled = self.require()?;
        let doc = Materializer::new(&self.caps, &compiled.validator, &self.config.format.version)
            .materialize(payload, &self.requested)
            .await?;
        let key = self.caps.store(&Resource::Document(doc)).await?;
        debug!(key = %key, "document created");
        Ok(CreateResponse { key })
    }

    /// Run one operation, reporting failure in the response.
    pub async fn execute(&self, op: Operation) -> Response {
        let (field, result) = match op {
            Operation::Get { key, selection } => (
                "get",
                self.get(&key, &selection.unwrap_or_default()).await,
            ),
            Operation::CreateSchema { schema } => (
                "createSchema",
                self.create_schema(schema).await.and_then(to_value),
            ),
            Operation::CreateDocument { doc } => (
                "createDocument",
                self.create_document(&doc).await.and_then(to_value),
            ),
            Operation::CreateAlias { alias } => (
                "createAlias",
                self.create_alias(alias).await.and_then(to_value),
            ),
        };

        match result {
            Ok(value) => Response {
                data: Some(json!({ field: value })),
                errors: Vec::new(),
            },
            Err(e) => Response {
                data: None,
                errors: vec![ResponseError::from_error(field, &e)],
            },
        }
    }
}

fn to_value(r: CreateResponse) -> OmgResult<Value> {
    Ok(serde_json::to_value(r)?)
}

/// One surface operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    Get {
        key: Address,
        #[serde(default)]
        selection: Option<Selection>,
    },
    CreateSchema {
        schema: SchemaInput,
    },
    CreateDocument {
        doc: Value,
    },
    CreateAlias {
        alias: AliasInput,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResponseError>,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: String,
    pub message: String,
    /// Operation field followed by the key path, e.g. `["get", "inner.data"]`.
    pub path: Vec<String>,
}

impl ResponseError {
    pub fn from_error(field: &str, e: &OmgError) -> Self {
        let mut path = vec![field.to_string()];
        if let Some(p) = e.path() {
            path.push(p.to_string());
        }
        Self {
            code: e.code().to_string(),
            message: e.to_string(),
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use omg_store::MemoryStore;
    use serde_json::json;

    use super::*;

    fn caps() -> Capabilities {
        Capabilities::from_shared(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn schemaless_surface_requires_schema_for_get() {
        let surface = Surface::build(caps(), CoreConfig::default(), &[]).await.unwrap();
        let resp = surface
            .execute(Operation::Get {
                key: "x".into(),
                selection: None,
            })
            .await;
        assert!(resp.data.is_none());
        assert_eq!(resp.errors[0].code, "invalid_argument");
        assert!(resp.errors[0].message.contains("schema is required"));
    }

    #[tokio::test]
    async fn schemaless_surface_still_creates_schemas() {
        let surface = Surface::build(caps(), CoreConfig::default(), &[]).await.unwrap();
        let op: Operation = serde_json::from_value(json!({
            "op": "createSchema",
            "schema": {"name": "s", "strings": [{"key": "title"}]}
        }))
        .unwrap();
        let resp = surface.execute(op).await;
        assert!(resp.is_ok());
        assert!(resp.data.unwrap()["createSchema"]["key"].is_string());
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let mut config = CoreConfig::default();
        config.limits.max_alias_depth = 0;
        assert!(Surface::build(caps(), config, &[]).await.is_err());
    }
}
