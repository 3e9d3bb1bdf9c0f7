//! Merging the element maps of a resolved schema set.
//!
//! Definitions are compared in canonical form (node schema lists and file
//! content types as sorted sets), so two schemas declaring the same key the
//! same way never conflict. Differing redefinitions are handled per
//! [`MergePolicy`].

use std::collections::BTreeMap;

use tracing::warn;

use omg_core::config::MergePolicy;
use omg_core::determinism::stable_sort::normalize_address_set;
use omg_core::model::{Address, ElementDef};
use omg_core::{OmgError, OmgResult};

use crate::resolver::ResolvedSchema;

/// One merged key: its definition and the schema it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedEntry {
    pub def: ElementDef,
    pub source: Address,
}

/// Merged element map, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedSchema {
    entries: BTreeMap<String, MergedEntry>,
}

impl MergedSchema {
    pub fn get(&self, key: &str) -> Option<&MergedEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MergedEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical form of a definition used for comparison and compilation.
pub fn canonical_def(def: &ElementDef) -> ElementDef {
    match def {
        ElementDef::File { multiple, types } => {
            let mut types = types.clone();
            types.sort();
            types.dedup();
            ElementDef::File {
                multiple: *multiple,
                types,
            }
        }
        ElementDef::Node { multiple, schemas } => {
            let schemas: Vec<Address> = schemas.iter().map(Address::normalized).collect();
            ElementDef::Node {
                multiple: *multiple,
                schemas: normalize_address_set(&schemas),
            }
        }
        other => other.clone(),
    }
}

/// Merge schemas in the given order.
pub fn merge_schemas(schemas: &[ResolvedSchema], policy: MergePolicy) -> OmgResult<MergedSchema> {
    let mut entries: BTreeMap<String, MergedEntry> = BTreeMap::new();

    for resolved in schemas {
        for (key, def) in &resolved.schema.elements {
            let def = canonical_def(def);
            match entries.get(key) {
                Some(existing) if existing.def == def => {}
                Some(existing) => match policy {
                    MergePolicy::Reject => {
                        return Err(OmgError::conflict(
                            key.clone(),
                            format!(
                                "'{}' defines it as {}, '{}' as {}",
                                existing.source,
                                describe(&existing.def),
                                resolved.address,
                                describe(&def)
                            ),
                        ));
                    }
                    MergePolicy::LastWins => {
                        warn!(
                            key = %key,
                            from = %existing.source,
                            to = %resolved.address,
                            "definition replaced"
                        );
                        entries.insert(
                            key.clone(),
                            MergedEntry {
                                def,
                                source: resolved.address.clone(),
                            },
                        );
                    }
                },
                None => {
                    entries.insert(
                        key.clone(),
                        MergedEntry {
                            def,
                            source: resolved.address.clone(),
                        },
                    );
                }
            }
        }
    }

    Ok(MergedSchema { entries })
}

fn describe(def: &ElementDef) -> String {
    let card = if def.multiple() { "multiple" } else { "single" };
    match def {
        ElementDef::Node { schemas, .. } => format!(
            "{card} node of [{}]",
            schemas
                .iter()
                .map(Address::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        other => format!("{card} {}", other.kind()),
    }
}
