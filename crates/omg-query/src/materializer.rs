//! Document materialization.
//!
//! Converts a nested input payload into the flat element-list [`Document`]
//! form. Nested `node` payloads become independent child documents: each is
//! materialized against its own schema set, persisted through the store
//! capability, and referenced from the parent by address.
//!
//! The whole payload tree is validated before anything is stored, so a
//! payload that fails validation causes zero writes. The root document is
//! returned, not stored; persisting it is the caller's job.
//!
//! Elements are emitted per key in sorted key order; values of a `multiple`
//! key keep their array order.

use futures::future::{try_join_all, BoxFuture, FutureExt};
use serde_json::Value;
use tracing::{debug, instrument};

use omg_core::capability::Capabilities;
use omg_core::model::{Address, Document, Element};
use omg_core::{OmgError, OmgResult};

use crate::types::TypeIdentity;
use crate::validator::{Shape, Validator};

pub struct Materializer<'s> {
    caps: &'s Capabilities,
    validator: &'s Validator,
    version: &'s str,
}

impl<'s> Materializer<'s> {
    pub fn new(caps: &'s Capabilities, validator: &'s Validator, version: &'s str) -> Self {
        Self {
            caps,
            validator,
            version,
        }
    }

    /// Materialize `payload` against the validator's root schema set.
    /// `schemas` becomes the root document's `schemas` list.
    #[instrument(level = "debug", skip_all)]
    pub async fn materialize(&self, payload: &Value, schemas: &[Address]) -> OmgResult<Document> {
        self.validator.validate_payload(payload)?;
        let schemas: Vec<Address> = schemas.iter().map(Address::normalized).collect();
        self.build(self.validator.root(), payload, schemas).await
    }

    fn build<'a>(
        &'a self,
        identity: &'a TypeIdentity,
        payload: &'a Value,
        schemas: Vec<Address>,
    ) -> BoxFuture<'a, OmgResult<Document>> {
        async move {
            let rules = self.validator.rules(identity)?;
            let obj = payload
                .as_object()
                .ok_or_else(|| OmgError::invariant("validated payload is not an object"))?;

            let mut doc = Document::new(self.version, schemas);
            for (key, rule) in &rules.keys {
                let items: Vec<&Value> = match obj.get(key) {
                    None | Some(Value::Null) => continue,
                    Some(Value::Array(items)) if rule.multiple => items.iter().collect(),
                    Some(v) => vec![v],
                };

                match &rule.shape {
                    Shape::Node(child) => {
                        let futs = items.iter().enumerate().map(|(i, item)| async move {
                            let nested = self
                                .build(child, item, child.addresses().to_vec())
                                .await?;
                            let address = self.caps.store(&nested.into()).await?;
                            debug!(key = %key, address = %address, "stored nested document");
                            Ok::<_, OmgError>(address)
                        }
                        .map(move |r| {
                            r.map_err(|e| {
                                if rule.multiple {
                                    e.within(&format!("[{i}]")).within(key)
                                } else {
                                    e.within(key)
                                }
                            })
                        }));
                        for address in try_join_all(futs).await? {
                            doc.push(Element::node(key.clone(), address));
                        }
                    }
                    _ => {
                        for item in items {
                            doc.push(scalar_element(key, item)?);
                        }
                    }
                }
            }
            Ok(doc)
        }
        .boxed()
    }
}

fn scalar_element(key: &str, value: &Value) -> OmgResult<Element> {
    match value {
        Value::String(s) => Ok(Element::string(key, s.clone())),
        Value::Number(n) => Ok(Element::number(key, n.clone())),
        Value::Object(obj) => {
            let field = |name: &str| {
                obj.get(name)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| OmgError::invariant("validated file value lost a field"))
            };
            Ok(Element::file(key, field("contentType")?, field("uri")?))
        }
        _ => Err(OmgError::invariant("validated value has an unexpected shape")),
    }
}
