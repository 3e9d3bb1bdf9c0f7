//! Schema resolution.
//!
//! Expands a list of schema-or-alias addresses into the flat set of concrete
//! schemas they denote, following aliases transitively.
//!
//! Properties:
//! - siblings are fetched concurrently; the first failure aborts the whole
//!   resolution
//! - the output is a set: duplicates reached through several aliases are
//!   kept once (first occurrence in input order)
//! - an alias that reaches itself fails with an alias-cycle error carrying
//!   the expansion path; nesting beyond `max_alias_depth` fails too

use futures::future::{try_join_all, BoxFuture, FutureExt};
use tracing::{debug, instrument};

use omg_core::capability::{Capabilities, SchemaRef};
use omg_core::determinism::stable_sort::dedup_preserving_order;
use omg_core::errors::ResolutionReason;
use omg_core::model::{Address, ResourceKind, Schema};
use omg_core::{OmgError, OmgResult};

/// A concrete schema and the address it was fetched from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    pub address: Address,
    pub schema: Schema,
}

/// One of the addresses handed to the resolver, with the name of what it
/// points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootRef {
    pub address: Address,
    pub name: String,
    pub kind: ResourceKind,
}

/// Result of resolving an address list.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSet {
    /// The requested addresses, normalized, in input order.
    pub roots: Vec<RootRef>,
    /// Every concrete schema reached, deduplicated by address.
    pub schemas: Vec<ResolvedSchema>,
}

impl ResolvedSet {
    pub fn root_names(&self) -> Vec<&str> {
        self.roots.iter().map(|r| r.name.as_str()).collect()
    }
}

struct Expanded {
    name: String,
    kind: ResourceKind,
    schemas: Vec<ResolvedSchema>,
}

#[derive(Debug, Clone)]
pub struct SchemaResolver {
    caps: Capabilities,
    max_alias_depth: usize,
}

impl SchemaResolver {
    pub fn new(caps: Capabilities, max_alias_depth: usize) -> Self {
        Self {
            caps,
            max_alias_depth,
        }
    }

    /// Resolve addresses to their concrete schemas. Treat the result as a set.
    pub async fn resolve_all(&self, addresses: &[Address]) -> OmgResult<Vec<ResolvedSchema>> {
        Ok(self.resolve_set(addresses).await?.schemas)
    }

    /// Like [`resolve_all`](Self::resolve_all), also reporting what each
    /// requested address pointed at.
    #[instrument(level = "debug", skip_all, fields(count = addresses.len()))]
    pub async fn resolve_set(&self, addresses: &[Address]) -> OmgResult<ResolvedSet> {
        let normalized: Vec<Address> = addresses.iter().map(Address::normalized).collect();
        let expanded = try_join_all(
            normalized
                .iter()
                .map(|a| self.expand(a.clone(), Vec::new())),
        )
        .await?;

        let mut roots = Vec::with_capacity(normalized.len());
        let mut schemas = Vec::new();
        for (address, e) in normalized.into_iter().zip(expanded) {
            roots.push(RootRef {
                address,
                name: e.name,
                kind: e.kind,
            });
            schemas.extend(e.schemas);
        }
        let schemas = dedup_preserving_order(schemas, |s| s.address.clone());

        debug!(roots = roots.len(), schemas = schemas.len(), "resolved schema set");
        Ok(ResolvedSet { roots, schemas })
    }

    /// `path` holds the aliases currently being expanded above `address`.
    fn expand(&self, address: Address, path: Vec<Address>) -> BoxFuture<'_, OmgResult<Expanded>> {
        async move {
            if path.contains(&address) {
                let mut cycle = path;
                cycle.push(address.clone());
                return Err(OmgError::Resolution {
                    address,
                    reason: ResolutionReason::AliasCycle { path: cycle },
                });
            }

            match self.caps.fetch_schema_or_alias(&address).await? {
                SchemaRef::Schema(schema) => Ok(Expanded {
                    name: schema.name.clone(),
                    kind: ResourceKind::Schema,
                    schemas: vec![ResolvedSchema { address, schema }],
                }),
                SchemaRef::Alias(alias) => {
                    if path.len() >= self.max_alias_depth {
                        return Err(OmgError::Resolution {
                            address,
                            reason: ResolutionReason::DepthExceeded {
                                limit: self.max_alias_depth,
                            },
                        });
                    }
                    let mut child_path = path;
                    child_path.push(address);

                    let children = try_join_all(
                        alias
                            .schemas
                            .iter()
                            .map(|c| self.expand(c.normalized(), child_path.clone())),
                    )
                    .await?;

                    Ok(Expanded {
                        name: alias.name,
                        kind: ResourceKind::Alias,
                        schemas: children.into_iter().flat_map(|c| c.schemas).collect(),
                    })
                }
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use omg_core::capability::{ContentStore, Fetcher};
    use omg_core::model::{Alias, Document, ElementDef, Resource};

    use super::*;

    #[derive(Default)]
    struct Fixture(HashMap<&'static str, Resource>);

    impl Fixture {
        fn with(mut self, addr: &'static str, r: impl Into<Resource>) -> Self {
            self.0.insert(addr, r.into());
            self
        }

        fn resolver(self) -> SchemaResolver {
            SchemaResolver::new(Capabilities::from_shared(Arc::new(self)), 4)
        }
    }

    #[async_trait]
    impl Fetcher for Fixture {
        async fn fetch(&self, address: &Address) -> OmgResult<Resource> {
            self.0
                .get(address.as_str())
                .cloned()
                .ok_or_else(|| OmgError::not_found(address))
        }
    }

    #[async_trait]
    impl ContentStore for Fixture {
        async fn store(&self, _r: &Resource) -> OmgResult<Address> {
            Err(OmgError::invariant("read-only fixture"))
        }
    }

    fn schema(name: &str) -> Schema {
        Schema::new("0.1.0", name).with_element("foo", ElementDef::String { multiple: false })
    }

    fn alias(name: &str, to: &[&str]) -> Alias {
        Alias::new("0.1.0", name, to.iter().map(|s| Address::from(*s)).collect())
    }

    #[tokio::test]
    async fn expands_nested_aliases_and_dedups() {
        let r = Fixture::default()
            .with("s1", schema("one"))
            .with("s2", schema("two"))
            .with("a", alias("a", &["s1", "b"]))
            .with("b", alias("b", &["s2", "s1"]))
            .resolver();

        let set = r
            .resolve_set(&[Address::from("a"), Address::from("ipfs://s2")])
            .await
            .unwrap();
        let addrs: Vec<_> = set.schemas.iter().map(|s| s.address.as_str()).collect();
        assert_eq!(addrs, vec!["s1", "s2"]);
        assert_eq!(set.root_names(), vec!["a", "two"]);
        assert_eq!(set.roots[1].address.as_str(), "s2");
    }

    #[tokio::test]
    async fn detects_alias_cycle() {
        let r = Fixture::default()
            .with("a", alias("a", &["b"]))
            .with("b", alias("b", &["a"]))
            .resolver();

        let err = r.resolve_all(&[Address::from("a")]).await.unwrap_err();
        assert_matches!(
            err,
            OmgError::Resolution { reason: ResolutionReason::AliasCycle { ref path }, .. }
                if path.iter().map(Address::as_str).collect::<Vec<_>>() == ["a", "b", "a"]
        );
    }

    #[tokio::test]
    async fn diamond_is_not_a_cycle() {
        let r = Fixture::default()
            .with("s", schema("s"))
            .with("l", alias("l", &["s"]))
            .with("r", alias("r", &["s"]))
            .with("top", alias("top", &["l", "r"]))
            .resolver();

        let schemas = r.resolve_all(&[Address::from("top")]).await.unwrap();
        assert_eq!(schemas.len(), 1);
    }

    #[tokio::test]
    async fn depth_limit_applies() {
        let r = Fixture::default()
            .with("s", schema("s"))
            .with("a1", alias("a1", &["a2"]))
            .with("a2", alias("a2", &["a3"]))
            .with("a3", alias("a3", &["a4"]))
            .with("a4", alias("a4", &["a5"]))
            .with("a5", alias("a5", &["s"]))
            .resolver();

        let err = r.resolve_all(&[Address::from("a1")]).await.unwrap_err();
        assert_eq!(err.code(), "resolution.depth_exceeded");
    }

    #[tokio::test]
    async fn documents_are_rejected_by_address() {
        let r = Fixture::default()
            .with("d", Document::new("0.1.0", vec![]))
            .with("s", schema("s"))
            .resolver();

        let err = r
            .resolve_all(&[Address::from("s"), Address::from("d")])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "resolution.wrong_kind");
        assert!(err.to_string().contains("'d'"));
    }

    #[tokio::test]
    async fn missing_address_fails_fast() {
        let r = Fixture::default().with("s", schema("s")).resolver();
        let err = r
            .resolve_all(&[Address::from("s"), Address::from("nope")])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "resolution.not_found");
    }
}
