//! Compiled type model.
//!
//! Schemas are data, so the typed surface is built at run time as plain
//! values: an [`ObjectType`] per distinct schema set, fields as a tagged
//! [`FieldType`], all held in a [`TypeRegistry`] keyed by [`TypeIdentity`].
//!
//! Output and input surfaces share the same registry; [`Direction`] only
//! changes how names are rendered (`File` vs `FileInput`, `Node…` vs
//! `Node…CreateInput`).

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use omg_core::determinism::stable_sort::normalize_address_set;
use omg_core::model::Address;

use crate::naming;

/// Identity of a node type: its normalized (scheme-stripped, sorted,
/// deduplicated) schema address set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TypeIdentity(Vec<Address>);

impl TypeIdentity {
    pub fn new(addresses: &[Address]) -> Self {
        let stripped: Vec<Address> = addresses.iter().map(Address::normalized).collect();
        Self(normalize_address_set(&stripped))
    }

    pub fn addresses(&self) -> &[Address] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Output,
    Input,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    /// `{contentType, uri}` record; `types` restricts content types when non-empty.
    File { types: Vec<String> },
    Node {
        type_name: String,
        identity: TypeIdentity,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub key: String,
    #[serde(flatten)]
    pub ty: FieldType,
    pub multiple: bool,
}

impl Field {
    /// Rendered type, e.g. `String`, `[File]`, `[NodeFoo1a2b3c4dCreateInput]`.
    pub fn type_label(&self, direction: Direction) -> String {
        let base = match (&self.ty, direction) {
            (FieldType::String, _) => "String".to_string(),
            (FieldType::Number, _) => "Float".to_string(),
            (FieldType::File { .. }, Direction::Output) => naming::FILE_TYPE.to_string(),
            (FieldType::File { .. }, Direction::Input) => naming::FILE_INPUT_TYPE.to_string(),
            (FieldType::Node { type_name, .. }, Direction::Output) => type_name.clone(),
            (FieldType::Node { type_name, .. }, Direction::Input) => naming::input_name(type_name),
        };
        if self.multiple {
            format!("[{base}]")
        } else {
            base
        }
    }
}

/// One compiled object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectType {
    pub name: String,
    pub identity: TypeIdentity,
    /// Names of the constituent schemas/aliases, in identity order.
    pub constituents: Vec<String>,
    pub fields: BTreeMap<String, Field>,
}

impl ObjectType {
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    pub fn name_for(&self, direction: Direction) -> String {
        match direction {
            Direction::Output => self.name.clone(),
            Direction::Input => naming::input_name(&self.name),
        }
    }
}

/// All object types of one compiled surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    by_identity: BTreeMap<TypeIdentity, ObjectType>,
}

impl TypeRegistry {
    pub fn get(&self, identity: &TypeIdentity) -> Option<&ObjectType> {
        self.by_identity.get(identity)
    }

    pub fn insert(&mut self, ty: ObjectType) {
        self.by_identity.insert(ty.identity.clone(), ty);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectType> {
        self.by_identity.values()
    }

    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }

    /// Render every type for `direction` in a GraphQL-like notation, sorted
    /// by type name.
    pub fn render(&self, direction: Direction) -> String {
        let keyword = match direction {
            Direction::Output => "type",
            Direction::Input => "input",
        };
        let mut types: Vec<&ObjectType> = self.iter().collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));

        let mut out = String::new();
        let uses_file = types
            .iter()
            .flat_map(|t| t.fields.values())
            .any(|f| matches!(f.ty, FieldType::File { .. }));
        if uses_file {
            let file = match direction {
                Direction::Output => naming::FILE_TYPE,
                Direction::Input => naming::FILE_INPUT_TYPE,
            };
            let _ = writeln!(
                out,
                "{keyword} {file} {{\n  contentType: String\n  uri: String\n}}\n"
            );
        }
        for ty in types {
            let _ = writeln!(out, "{keyword} {} {{", ty.name_for(direction));
            for field in ty.fields.values() {
                let _ = writeln!(out, "  {}: {}", field.key, field.type_label(direction));
            }
            let _ = writeln!(out, "}}\n");
        }
        out
    }
}
