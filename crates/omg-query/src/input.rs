//! Mutation inputs and responses.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use omg_core::model::{validate, Address, Alias, ElementDef, Schema};
use omg_core::{OmgError, OmgResult};

/// A `string` or `number` key declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: String,
    #[serde(default)]
    pub multiple: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileKeyInput {
    pub key: String,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeKeyInput {
    pub key: String,
    #[serde(default)]
    pub multiple: bool,
    pub schemas: Vec<Address>,
}

/// `createSchema` input: per-kind key lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInput {
    pub name: String,
    #[serde(default)]
    pub strings: Vec<KeyInput>,
    #[serde(default)]
    pub numbers: Vec<KeyInput>,
    #[serde(default)]
    pub files: Vec<FileKeyInput>,
    #[serde(default)]
    pub nodes: Vec<NodeKeyInput>,
}

impl SchemaInput {
    /// Build the canonical schema. Keys must be unique across all lists.
    pub fn into_schema(self, version: &str) -> OmgResult<Schema> {
        let mut seen = BTreeSet::new();
        let mut check = |key: &str| -> OmgResult<()> {
            if !seen.insert(key.to_string()) {
                return Err(OmgError::invalid_argument(format!(
                    "key '{key}' is declared more than once"
                )));
            }
            Ok(())
        };

        let mut schema = Schema::new(version, self.name);
        for s in self.strings {
            check(&s.key)?;
            schema.elements.insert(s.key, ElementDef::String { multiple: s.multiple });
        }
        for n in self.numbers {
            check(&n.key)?;
            schema.elements.insert(n.key, ElementDef::Number { multiple: n.multiple });
        }
        for f in self.files {
            check(&f.key)?;
            schema.elements.insert(
                f.key,
                ElementDef::File {
                    multiple: f.multiple,
                    types: f.types,
                },
            );
        }
        for n in self.nodes {
            check(&n.key)?;
            schema.elements.insert(
                n.key,
                ElementDef::Node {
                    multiple: n.multiple,
                    schemas: n.schemas.iter().map(Address::normalized).collect(),
                },
            );
        }

        validate::schema_basic(&schema)?;
        Ok(schema)
    }
}

/// `createAlias` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasInput {
    pub name: String,
    pub schemas: Vec<Address>,
}

impl AliasInput {
    /// Shape checks only; the targets are not fetched.
    pub fn into_alias(self, version: &str) -> OmgResult<Alias> {
        let alias = Alias::new(
            version,
            self.name,
            self.schemas.iter().map(Address::normalized).collect(),
        );
        validate::alias_basic(&alias)?;
        Ok(alias)
    }
}

/// Result of every `create*` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResponse {
    pub key: Address,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_schema_from_lists() {
        let input: SchemaInput = serde_json::from_value(json!({
            "name": "article",
            "strings": [{"key": "title", "multiple": false}],
            "numbers": [{"key": "views"}],
            "files": [{"key": "photos", "multiple": true, "types": ["image/png"]}],
            "nodes": [{"key": "author", "multiple": false, "schemas": ["ipfs://person"]}]
        }))
        .unwrap();
        let schema = input.into_schema("0.1.0").unwrap();
        assert_eq!(schema.elements.len(), 4);
        assert_eq!(
            schema.elements["author"],
            ElementDef::Node {
                multiple: false,
                schemas: vec![Address::from("person")]
            }
        );
    }

    #[test]
    fn duplicate_keys_across_lists_rejected() {
        let input = SchemaInput {
            name: "s".into(),
            strings: vec![KeyInput { key: "x".into(), multiple: false }],
            numbers: vec![KeyInput { key: "x".into(), multiple: true }],
            ..Default::default()
        };
        let err = input.into_schema("0.1.0").unwrap_err();
        assert!(err.to_string().contains("'x' is declared more than once"));
    }

    #[test]
    fn empty_node_schema_list_rejected() {
        let input = SchemaInput {
            name: "s".into(),
            nodes: vec![NodeKeyInput { key: "n".into(), multiple: false, schemas: vec![] }],
            ..Default::default()
        };
        assert!(input.into_schema("0.1.0").is_err());
    }

    #[test]
    fn alias_targets_are_not_checked() {
        let alias = AliasInput {
            name: "bundle".into(),
            schemas: vec!["ipfs://does-not-exist".into()],
        }
        .into_alias("0.1.0")
        .unwrap();
        assert_eq!(alias.schemas, vec![Address::from("does-not-exist")]);
    }
}
