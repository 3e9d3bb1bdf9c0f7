//! Type compilation.
//!
//! Turns a requested schema set into a [`CompiledSurface`]: one
//! [`ObjectType`] per distinct schema set reachable through `node`
//! definitions, the root included.
//!
//! Each call to [`TypeCompiler::compile`] runs its own pass with its own
//! cache, so nothing leaks between surfaces. Within a pass:
//! - a node type is keyed by its [`TypeIdentity`]; repeats reuse the
//!   already-built type
//! - a node type that is still being compiled (a recursive schema graph) is
//!   referenced by name and not compiled again

use std::collections::BTreeMap;

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, instrument};

use omg_core::config::MergePolicy;
use omg_core::model::{Address, ElementDef};
use omg_core::{OmgError, OmgResult};

use crate::merge::merge_schemas;
use crate::naming;
use crate::resolver::SchemaResolver;
use crate::types::{Direction, Field, FieldType, ObjectType, TypeIdentity, TypeRegistry};

/// The compiled field surface for one requested schema set.
#[derive(Debug, Clone)]
pub struct CompiledSurface {
    root: TypeIdentity,
    types: TypeRegistry,
}

impl CompiledSurface {
    pub fn root_identity(&self) -> &TypeIdentity {
        &self.root
    }

    pub fn root_type(&self) -> OmgResult<&ObjectType> {
        self.type_of(&self.root)
    }

    pub fn type_of(&self, identity: &TypeIdentity) -> OmgResult<&ObjectType> {
        self.types.get(identity).ok_or_else(|| {
            OmgError::invariant(format!(
                "no compiled type for schema set [{}]",
                identity
                    .addresses()
                    .iter()
                    .map(Address::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Render the query and mutation entry points plus every type.
    pub fn render(&self) -> OmgResult<String> {
        let root = self.root_type()?;
        let mut out = String::new();
        out.push_str(&format!(
            "type Query {{\n  get(key: String): {}\n}}\n\n",
            root.name
        ));
        out.push_str(&format!(
            "type Mutation {{\n  createSchema(schema: SchemaInput): CreateResponse\n  \
             createDocument(doc: {}): CreateResponse\n  \
             createAlias(alias: AliasInput): CreateResponse\n}}\n\n",
            root.name_for(Direction::Input)
        ));
        out.push_str(&self.types.render(Direction::Output));
        out.push_str(&self.types.render(Direction::Input));
        Ok(out)
    }
}

#[derive(Default)]
struct CompilePass {
    done: TypeRegistry,
    in_progress: BTreeMap<TypeIdentity, String>,
}

#[derive(Debug, Clone)]
pub struct TypeCompiler {
    resolver: SchemaResolver,
    policy: MergePolicy,
}

impl TypeCompiler {
    pub fn new(resolver: SchemaResolver, policy: MergePolicy) -> Self {
        Self { resolver, policy }
    }

    /// Compile the surface for `addresses`. An empty list is rejected.
    #[instrument(level = "debug", skip_all, fields(count = addresses.len()))]
    pub async fn compile(&self, addresses: &[Address]) -> OmgResult<CompiledSurface> {
        let root = TypeIdentity::new(addresses);
        if root.is_empty() {
            return Err(OmgError::invalid_argument("schema is required"));
        }

        let mut pass = CompilePass::default();
        self.compile_identity(&mut pass, root.clone()).await?;

        debug!(types = pass.done.len(), "compiled surface");
        Ok(CompiledSurface {
            root,
            types: pass.done,
        })
    }

    fn compile_identity<'a>(
        &'a self,
        pass: &'a mut CompilePass,
        identity: TypeIdentity,
    ) -> BoxFuture<'a, OmgResult<String>> {
        async move {
            if let Some(ty) = pass.done.get(&identity) {
                return Ok(ty.name.clone());
            }
            if let Some(name) = pass.in_progress.get(&identity) {
                return Ok(name.clone());
            }

            let set = self.resolver.resolve_set(identity.addresses()).await?;
            let name = naming::type_name(&identity, &set.root_names(), "");
            pass.in_progress.insert(identity.clone(), name.clone());

            let merged = merge_schemas(&set.schemas, self.policy)?;
            let mut fields = BTreeMap::new();
            for (key, entry) in merged.iter() {
                let ty = match &entry.def {
                    ElementDef::String { .. } => FieldType::String,
                    ElementDef::Number { .. } => FieldType::Number,
                    ElementDef::File { types, .. } => FieldType::File {
                        types: types.clone(),
                    },
                    ElementDef::Node { schemas, .. } => {
                        let child = TypeIdentity::new(schemas);
                        let type_name = self
                            .compile_identity(&mut *pass, child.clone())
                            .await
                            .map_err(|e| e.within(key))?;
                        FieldType::Node {
                            type_name,
                            identity: child,
                        }
                    }
                };
                fields.insert(
                    key.clone(),
                    Field {
                        key: key.clone(),
                        ty,
                        multiple: entry.def.multiple(),
                    },
                );
            }

            pass.in_progress.remove(&identity);
            debug!(name = %name, fields = fields.len(), "compiled type");
            pass.done.insert(ObjectType {
                name: name.clone(),
                identity,
                constituents: set.roots.into_iter().map(|r| r.name).collect(),
                fields,
            });
            Ok(name)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use omg_core::capability::Capabilities;
    use omg_core::model::{Resource, Schema};
    use omg_store::MemoryStore;

    use super::*;

    async fn put(store: &MemoryStore, r: impl Into<Resource>) -> Address {
        use omg_core::capability::ContentStore;
        store.store(&r.into()).await.unwrap()
    }

    fn compiler(store: Arc<MemoryStore>) -> TypeCompiler {
        let caps = Capabilities::from_shared(store);
        TypeCompiler::new(SchemaResolver::new(caps, 8), MergePolicy::Reject)
    }

    #[tokio::test]
    async fn shared_node_sets_compile_once() {
        let store = Arc::new(MemoryStore::new());
        let s2 = put(
            &store,
            Schema::new("0.1.0", "inner")
                .with_element("data", ElementDef::String { multiple: false }),
        )
        .await;
        let s3 = put(
            &store,
            Schema::new("0.1.0", "extra").with_element("n", ElementDef::Number { multiple: true }),
        )
        .await;
        let s1 = put(
            &store,
            Schema::new("0.1.0", "outer")
                .with_element(
                    "a",
                    ElementDef::Node {
                        multiple: false,
                        schemas: vec![s2.clone(), s3.clone()],
                    },
                )
                .with_element(
                    "b",
                    ElementDef::Node {
                        multiple: true,
                        schemas: vec![s3.clone(), s2.clone()],
                    },
                ),
        )
        .await;

        let surface = compiler(store).compile(&[s1]).await.unwrap();
        assert_eq!(surface.types().len(), 2);
        let root = surface.root_type().unwrap();
        let (FieldType::Node { type_name: a, .. }, FieldType::Node { type_name: b, .. }) =
            (&root.fields["a"].ty, &root.fields["b"].ty)
        else {
            panic!("expected node fields");
        };
        assert_eq!(a, b);
        assert!(root.fields["b"].multiple);
    }

    struct Fixed(Vec<(&'static str, Resource)>);

    #[async_trait::async_trait]
    impl omg_core::capability::Fetcher for Fixed {
        async fn fetch(&self, address: &Address) -> OmgResult<Resource> {
            self.0
                .iter()
                .find(|(a, _)| *a == address.as_str())
                .map(|(_, r)| r.clone())
                .ok_or_else(|| OmgError::not_found(address))
        }
    }

    #[tokio::test]
    async fn recursive_schemas_terminate() {
        // "tree" refers to itself, which only a non-content-addressed fetcher can express.
        let tree = Schema::new("0.1.0", "tree")
            .with_element("label", ElementDef::String { multiple: false })
            .with_element(
                "children",
                ElementDef::Node { multiple: true, schemas: vec!["tree".into()] },
            );
        let fetcher = Arc::new(Fixed(vec![("tree", tree.into())]));
        let caps = Capabilities::new(fetcher, Arc::new(MemoryStore::new()));
        let compiler = TypeCompiler::new(SchemaResolver::new(caps, 8), MergePolicy::Reject);

        let surface = compiler.compile(&["tree".into()]).await.unwrap();
        assert_eq!(surface.types().len(), 1);
        let root = surface.root_type().unwrap();
        let FieldType::Node { type_name, .. } = &root.fields["children"].ty else {
            panic!("expected node field");
        };
        assert_eq!(type_name, &root.name);
        assert!(surface.render().unwrap().contains("type Query"));
    }

    #[tokio::test]
    async fn empty_request_needs_a_schema() {
        let store = Arc::new(MemoryStore::new());
        let err = compiler(store).compile(&[]).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: schema is required");
    }
}
