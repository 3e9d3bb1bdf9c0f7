//! Reading typed values out of fetched documents.
//!
//! For each selected field the reader collects every element stored under
//! that key and enforces the compiled cardinality: a single-valued key needs
//! exactly one element, zero or several is an error (never "first wins").
//! `node` elements are fetched and read recursively; the fetches for one
//! multi-valued key run concurrently and come back in element order.

use futures::future::{try_join_all, BoxFuture, FutureExt};
use serde_json::{Map, Value};
use tracing::trace;

use omg_core::capability::Capabilities;
use omg_core::errors::ValidationErrorKind;
use omg_core::model::{Document, Element};
use omg_core::{OmgError, OmgResult};

use crate::compiler::CompiledSurface;
use crate::selection::Selection;
use crate::types::{FieldType, ObjectType};
use crate::validator::{check_cardinality, check_element, KeyRule, Shape};

pub struct DocumentReader<'s> {
    caps: &'s Capabilities,
    surface: &'s CompiledSurface,
}

impl<'s> DocumentReader<'s> {
    pub fn new(caps: &'s Capabilities, surface: &'s CompiledSurface) -> Self {
        Self { caps, surface }
    }

    /// Read `selection` from `doc` as an instance of `ty`.
    pub fn read<'a>(
        &'a self,
        ty: &'a ObjectType,
        doc: Document,
        selection: &'a Selection,
    ) -> BoxFuture<'a, OmgResult<Value>> {
        async move {
            let mut out = Map::new();
            for (key, sub) in selection.fields() {
                let field = ty.field(key).ok_or_else(|| {
                    OmgError::invalid_argument(format!("type '{}' has no field '{key}'", ty.name))
                })?;
                let value = self
                    .read_field(field.multiple, &field.ty, &doc, key, sub)
                    .await
                    .map_err(|e| e.within(key))?;
                out.insert(key.clone(), value);
            }
            Ok(Value::Object(out))
        }
        .boxed()
    }

    async fn read_field(
        &self,
        multiple: bool,
        field_ty: &FieldType,
        doc: &Document,
        key: &str,
        sub: &Selection,
    ) -> OmgResult<Value> {
        let rule = KeyRule {
            shape: shape_of(field_ty),
            multiple,
        };
        let elements: Vec<&Element> = doc.elements_for(key).collect();
        check_cardinality("", &rule, elements.len())?;

        let values = match field_ty {
            FieldType::Node { identity, .. } => {
                if sub.is_empty() {
                    return Err(OmgError::invalid_argument(format!(
                        "node field '{key}' needs a sub-selection"
                    )));
                }
                let child_ty = self.surface.type_of(identity)?;
                let futs = elements.iter().enumerate().map(|(i, el)| {
                    let rule = &rule;
                    async move {
                        let at = |e: OmgError| index_within(e, multiple, i);
                        check_element(rule, el).map_err(at)?;
                        let Element::Node { uri, .. } = el else {
                            return Err(OmgError::invariant("node element expected"));
                        };
                        trace!(key, uri = %uri, "resolving node");
                        let child = self.caps.fetch_document(uri).await.map_err(at)?;
                        self.read(child_ty, child, sub).await.map_err(at)
                    }
                });
                try_join_all(futs).await?
            }
            _ => elements
                .iter()
                .enumerate()
                .map(|(i, el)| {
                    check_element(&rule, el)
                        .and_then(|_| scalar_value(el, sub))
                        .map_err(|e| index_within(e, multiple, i))
                })
                .collect::<OmgResult<Vec<_>>>()?,
        };

        if multiple {
            Ok(Value::Array(values))
        } else {
            values
                .into_iter()
                .next()
                .ok_or_else(|| OmgError::invariant("cardinality checked value is missing"))
        }
    }
}

fn index_within(e: OmgError, multiple: bool, i: usize) -> OmgError {
    if multiple {
        e.within(&format!("[{i}]"))
    } else {
        e
    }
}

fn shape_of(ty: &FieldType) -> Shape {
    match ty {
        FieldType::String => Shape::Text,
        FieldType::Number => Shape::Numeric,
        FieldType::File { types } => Shape::File {
            allowed: types.clone(),
        },
        FieldType::Node { identity, .. } => Shape::Node(identity.clone()),
    }
}

fn scalar_value(el: &Element, sub: &Selection) -> OmgResult<Value> {
    match el {
        Element::String { value, .. } => Ok(Value::String(value.clone())),
        Element::Number { value, .. } => Ok(Value::Number(value.clone())),
        Element::File {
            content_type, uri, ..
        } => {
            let mut rec = Map::new();
            let all = sub.is_empty();
            for (name, _) in sub.fields() {
                if name != "contentType" && name != "uri" {
                    return Err(OmgError::validation(name.clone(), ValidationErrorKind::UnknownKey));
                }
            }
            if all || sub.get("contentType").is_some() {
                rec.insert("contentType".into(), Value::String(content_type.clone()));
            }
            if all || sub.get("uri").is_some() {
                rec.insert("uri".into(), Value::String(uri.as_str().to_string()));
            }
            Ok(Value::Object(rec))
        }
        Element::Node { .. } => Err(OmgError::invariant("node element read as scalar")),
    }
}
