use serde::{Deserialize, Serialize};

use super::{Address, Element};

/// A metadata document: a flat, ordered list of elements.
///
/// Elements for one key may repeat; whether that is legal is decided by the
/// schema a reader applies, not by the document. The `schemas` list is the
/// producer's claim and is advisory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: String,
    #[serde(default)]
    pub schemas: Vec<Address>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Document {
    pub fn new(version: impl Into<String>, schemas: Vec<Address>) -> Self {
        Self {
            version: version.into(),
            schemas,
            elements: Vec::new(),
        }
    }

    pub fn push(&mut self, el: Element) {
        self.elements.push(el);
    }

    /// All elements stored under `key`, in document order.
    pub fn elements_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |e| e.key() == key)
    }
}
