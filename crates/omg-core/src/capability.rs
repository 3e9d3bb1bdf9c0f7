//! Fetch/store capabilities.
//!
//! Every component that touches the content-addressed store receives these
//! explicitly. There are no global clients: hosts build a [`Capabilities`]
//! bundle once and pass it down, tests swap in in-memory fakes.
//!
//! Contract:
//! - `fetch` fails when the address does not resolve; it never returns an
//!   empty or placeholder resource.
//! - `store` is content-addressed: storing byte-identical canonical
//!   serializations twice yields the same address.
//! - neither call is retried or timed out here; that belongs to the
//!   implementation.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::errors::{OmgError, OmgResult};
use crate::model::{Address, Alias, Document, Resource, ResourceKind, Schema};

/// Read side of a content-addressed store.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, address: &Address) -> OmgResult<Resource>;
}

/// Write side of a content-addressed store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn store(&self, resource: &Resource) -> OmgResult<Address>;
}

/// Either a schema or an alias, as accepted by the schema resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaRef {
    Schema(Schema),
    Alias(Alias),
}

/// The injected capabilities, cheap to clone.
#[derive(Clone)]
pub struct Capabilities {
    pub fetcher: Arc<dyn Fetcher>,
    pub store: Arc<dyn ContentStore>,
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

impl Capabilities {
    pub fn new(fetcher: Arc<dyn Fetcher>, store: Arc<dyn ContentStore>) -> Self {
        Self { fetcher, store }
    }

    /// Build both capabilities from one value implementing both traits.
    pub fn from_shared<T>(backend: Arc<T>) -> Self
    where
        T: Fetcher + ContentStore + 'static,
    {
        Self {
            fetcher: backend.clone(),
            store: backend,
        }
    }

    /// Fetch any resource. `ipfs://` prefixes are stripped first.
    pub async fn fetch(&self, address: &Address) -> OmgResult<Resource> {
        let address = address.normalized();
        trace!(address = %address, "fetch");
        self.fetcher.fetch(&address).await
    }

    /// Fetch a resource that must be a document.
    pub async fn fetch_document(&self, address: &Address) -> OmgResult<Document> {
        match self.fetch(address).await? {
            Resource::Document(d) => Ok(d),
            other => Err(OmgError::wrong_kind(
                &address.normalized(),
                ResourceKind::Document.as_str(),
                other.kind(),
            )),
        }
    }

    /// Fetch a resource that must be a schema or an alias.
    pub async fn fetch_schema_or_alias(&self, address: &Address) -> OmgResult<SchemaRef> {
        match self.fetch(address).await? {
            Resource::Schema(s) => Ok(SchemaRef::Schema(s)),
            Resource::Alias(a) => Ok(SchemaRef::Alias(a)),
            other => Err(OmgError::wrong_kind(
                &address.normalized(),
                "schema or alias",
                other.kind(),
            )),
        }
    }

    pub async fn store(&self, resource: &Resource) -> OmgResult<Address> {
        let address = self.store.store(resource).await?;
        trace!(address = %address, kind = %resource.kind(), "stored");
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::errors::ResolutionReason;

    struct One(Resource);

    #[async_trait]
    impl Fetcher for One {
        async fn fetch(&self, address: &Address) -> OmgResult<Resource> {
            if address.as_str() == "a" {
                Ok(self.0.clone())
            } else {
                Err(OmgError::not_found(address))
            }
        }
    }

    #[async_trait]
    impl ContentStore for One {
        async fn store(&self, _resource: &Resource) -> OmgResult<Address> {
            Ok(Address::from("a"))
        }
    }

    fn caps(r: Resource) -> Capabilities {
        Capabilities::from_shared(Arc::new(One(r)))
    }

    #[tokio::test]
    async fn fetch_strips_scheme() {
        let c = caps(Document::new("0.1.0", vec![]).into());
        let doc = c.fetch_document(&Address::from("ipfs://a")).await.unwrap();
        assert!(doc.elements.is_empty());
    }

    #[tokio::test]
    async fn wrong_kind_names_address() {
        let c = caps(Schema::new("0.1.0", "s").into());
        let err = c.fetch_document(&Address::from("a")).await.unwrap_err();
        assert_matches!(
            err,
            OmgError::Resolution { ref address, reason: ResolutionReason::WrongKind { .. } }
                if address.as_str() == "a"
        );
    }

    #[tokio::test]
    async fn documents_are_not_schemas() {
        let c = caps(Document::new("0.1.0", vec![]).into());
        let err = c.fetch_schema_or_alias(&Address::from("a")).await.unwrap_err();
        assert_eq!(err.code(), "resolution.wrong_kind");
        assert!(err.to_string().contains("expected schema or alias, got document"));
    }
}
