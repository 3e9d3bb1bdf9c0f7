//! Untyped traversal over documents linked by `node` elements.
//!
//! [`GraphNode`] is the schema-free way to read a document: look up elements
//! by key, following `node` references through the fetch capability. No
//! cardinality or kind rules are applied; the typed surface in `omg-query`
//! does that.

use futures::future::try_join_all;
use serde_json::Number;

use crate::capability::Capabilities;
use crate::errors::{OmgResult, ValidationErrorKind};
use crate::model::{Address, Document, Element, ElementKind};
use crate::OmgError;

/// A fetched document plus the capabilities needed to follow its links.
#[derive(Debug, Clone)]
pub struct GraphNode {
    address: Address,
    document: Document,
    caps: Capabilities,
}

/// One element value as seen by a traversal.
#[derive(Debug, Clone)]
pub enum GraphValue {
    String(String),
    Number(Number),
    File { content_type: String, uri: Address },
    Node(GraphNode),
}

impl GraphNode {
    /// Fetch the document at `address`.
    pub async fn load(caps: &Capabilities, address: &Address) -> OmgResult<Self> {
        let document = caps.fetch_document(address).await?;
        Ok(Self {
            address: address.normalized(),
            document,
            caps: caps.clone(),
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// All values under `key` in document order. Node references are
    /// fetched concurrently.
    pub async fn find(&self, key: &str) -> OmgResult<Vec<GraphValue>> {
        let futs = self
            .document
            .elements_for(key)
            .map(|el| self.resolve(el));
        try_join_all(futs).await
    }

    /// The first value under `key`, if any.
    pub async fn first(&self, key: &str) -> OmgResult<Option<GraphValue>> {
        match self.document.elements_for(key).next() {
            Some(el) => self.resolve(el).await.map(Some),
            None => Ok(None),
        }
    }

    /// The last value under `key`, if any.
    pub async fn last(&self, key: &str) -> OmgResult<Option<GraphValue>> {
        match self.document.elements_for(key).last() {
            Some(el) => self.resolve(el).await.map(Some),
            None => Ok(None),
        }
    }

    async fn resolve(&self, el: &Element) -> OmgResult<GraphValue> {
        Ok(match el {
            Element::String { value, .. } => GraphValue::String(value.clone()),
            Element::Number { value, .. } => GraphValue::Number(value.clone()),
            Element::File {
                content_type, uri, ..
            } => GraphValue::File {
                content_type: content_type.clone(),
                uri: uri.clone(),
            },
            Element::Node { key, uri } => GraphValue::Node(
                GraphNode::load(&self.caps, uri)
                    .await
                    .map_err(|e| e.within(key))?,
            ),
        })
    }
}

impl GraphValue {
    pub fn kind(&self) -> ElementKind {
        match self {
            GraphValue::String(_) => ElementKind::String,
            GraphValue::Number(_) => ElementKind::Number,
            GraphValue::File { .. } => ElementKind::File,
            GraphValue::Node(_) => ElementKind::Node,
        }
    }

    pub fn as_string(&self) -> OmgResult<&str> {
        match self {
            GraphValue::String(s) => Ok(s),
            other => Err(mismatch(ElementKind::String, other.kind())),
        }
    }

    pub fn as_number(&self) -> OmgResult<&Number> {
        match self {
            GraphValue::Number(n) => Ok(n),
            other => Err(mismatch(ElementKind::Number, other.kind())),
        }
    }

    /// `(content_type, uri)` of a file value.
    pub fn as_file(&self) -> OmgResult<(&str, &Address)> {
        match self {
            GraphValue::File { content_type, uri } => Ok((content_type, uri)),
            other => Err(mismatch(ElementKind::File, other.kind())),
        }
    }

    pub fn as_node(&self) -> OmgResult<&GraphNode> {
        match self {
            GraphValue::Node(n) => Ok(n),
            other => Err(mismatch(ElementKind::Node, other.kind())),
        }
    }
}

fn mismatch(expected: ElementKind, actual: ElementKind) -> OmgError {
    OmgError::validation("", ValidationErrorKind::KindMismatch { expected, actual })
}
