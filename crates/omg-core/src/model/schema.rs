//! Schema and alias resources.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Address, ElementKind};

/// Shape declaration for one key of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementDef {
    String {
        multiple: bool,
    },
    Number {
        multiple: bool,
    },
    File {
        multiple: bool,
        /// Allowed content types; empty means any.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        types: Vec<String>,
    },
    Node {
        multiple: bool,
        /// Schemas the referenced document must itself satisfy.
        schemas: Vec<Address>,
    },
}

impl ElementDef {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementDef::String { .. } => ElementKind::String,
            ElementDef::Number { .. } => ElementKind::Number,
            ElementDef::File { .. } => ElementKind::File,
            ElementDef::Node { .. } => ElementKind::Node,
        }
    }

    pub fn multiple(&self) -> bool {
        match self {
            ElementDef::String { multiple }
            | ElementDef::Number { multiple }
            | ElementDef::File { multiple, .. }
            | ElementDef::Node { multiple, .. } => *multiple,
        }
    }
}

/// Typed shape declaration for documents.
///
/// `elements` is a `BTreeMap` so serialization is key-sorted, which keeps the
/// content address of a schema independent of declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub elements: BTreeMap<String, ElementDef>,
}

impl Schema {
    pub fn new(version: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            name: name.into(),
            elements: BTreeMap::new(),
        }
    }

    pub fn with_element(mut self, key: impl Into<String>, def: ElementDef) -> Self {
        self.elements.insert(key.into(), def);
        self
    }
}

/// Named pointer to a set of schema-or-alias addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub version: String,
    pub name: String,
    #[serde(default)]
    pub schemas: Vec<Address>,
}

impl Alias {
    pub fn new(version: impl Into<String>, name: impl Into<String>, schemas: Vec<Address>) -> Self {
        Self {
            version: version.into(),
            name: name.into(),
            schemas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_types_are_omitted_when_empty() {
        let def = ElementDef::File {
            multiple: true,
            types: vec![],
        };
        assert_eq!(
            serde_json::to_value(&def).unwrap(),
            json!({"kind": "file", "multiple": true})
        );
    }

    #[test]
    fn schema_elements_serialize_sorted() {
        let s = Schema::new("0.1.0", "s")
            .with_element("zeta", ElementDef::String { multiple: false })
            .with_element("alpha", ElementDef::Number { multiple: true });
        let text = serde_json::to_string(&s).unwrap();
        assert!(text.find("alpha").unwrap() < text.find("zeta").unwrap());
    }
}
