//! Document elements.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::Address;

/// Kind tag shared by elements and element definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    String,
    Number,
    File,
    Node,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::File => "file",
            Self::Node => "node",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed key/value (or key/reference) entry of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Element {
    String {
        key: String,
        value: String,
    },
    /// Kept as the JSON number it was written as, so `3` stays `3`.
    Number {
        key: String,
        value: Number,
    },
    File {
        key: String,
        #[serde(rename = "contentType")]
        content_type: String,
        uri: Address,
    },
    /// Reference to another document by content address.
    Node {
        key: String,
        uri: Address,
    },
}

impl Element {
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Element::String {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn number(key: impl Into<String>, value: impl Into<Number>) -> Self {
        Element::Number {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn file(
        key: impl Into<String>,
        content_type: impl Into<String>,
        uri: impl Into<Address>,
    ) -> Self {
        Element::File {
            key: key.into(),
            content_type: content_type.into(),
            uri: uri.into(),
        }
    }

    pub fn node(key: impl Into<String>, uri: impl Into<Address>) -> Self {
        Element::Node {
            key: key.into(),
            uri: uri.into(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Element::String { key, .. }
            | Element::Number { key, .. }
            | Element::File { key, .. }
            | Element::Node { key, .. } => key,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::String { .. } => ElementKind::String,
            Element::Number { .. } => ElementKind::Number,
            Element::File { .. } => ElementKind::File,
            Element::Node { .. } => ElementKind::Node,
        }
    }
}
