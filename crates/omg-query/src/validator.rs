//! Document validation.
//!
//! A [`Validator`] holds one [`RuleSet`] per schema set reachable from its
//! root: per key, the expected [`Shape`] and whether it is `multiple`.
//! `node` shapes point at another rule set by identity, so recursive schema
//! graphs are representable.
//!
//! Two inputs are checked:
//! - raw payloads (nested JSON, the create-document input), recursively
//! - flat [`Document`]s, without following `node` references
//!
//! No type coercion is performed. Validation stops at the first mismatch.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use omg_core::config::MergePolicy;
use omg_core::errors::ValidationErrorKind;
use omg_core::model::{Address, Document, Element, ElementDef, ElementKind};
use omg_core::{OmgError, OmgResult};

use crate::compiler::CompiledSurface;
use crate::merge::{merge_schemas, MergedSchema};
use crate::resolver::SchemaResolver;
use crate::types::{FieldType, TypeIdentity};

/// Expected value shape for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Text,
    Numeric,
    /// `{contentType, uri}`; `allowed` restricts content types when non-empty.
    File { allowed: Vec<String> },
    Node(TypeIdentity),
}

impl Shape {
    fn kind(&self) -> ElementKind {
        match self {
            Shape::Text => ElementKind::String,
            Shape::Numeric => ElementKind::Number,
            Shape::File { .. } => ElementKind::File,
            Shape::Node(_) => ElementKind::Node,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Shape::Text => "string",
            Shape::Numeric => "number",
            Shape::File { .. } => "file object {contentType, uri}",
            Shape::Node(_) => "node object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRule {
    pub shape: Shape,
    pub multiple: bool,
}

impl KeyRule {
    fn expected(&self) -> String {
        if self.multiple {
            format!("array of {}", self.shape.describe())
        } else {
            self.shape.describe().to_string()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub keys: BTreeMap<String, KeyRule>,
}

impl RuleSet {
    fn from_merged(merged: &MergedSchema) -> Self {
        let keys = merged
            .iter()
            .map(|(key, entry)| {
                let shape = match &entry.def {
                    ElementDef::String { .. } => Shape::Text,
                    ElementDef::Number { .. } => Shape::Numeric,
                    ElementDef::File { types, .. } => Shape::File {
                        allowed: types.clone(),
                    },
                    ElementDef::Node { schemas, .. } => Shape::Node(TypeIdentity::new(schemas)),
                };
                (
                    key.clone(),
                    KeyRule {
                        shape,
                        multiple: entry.def.multiple(),
                    },
                )
            })
            .collect();
        Self { keys }
    }
}

/// Structural validator for one schema set.
#[derive(Debug, Clone)]
pub struct Validator {
    root: TypeIdentity,
    sets: Arc<BTreeMap<TypeIdentity, RuleSet>>,
}

impl Validator {
    /// Build a validator by resolving and merging `addresses` and every
    /// schema set reachable through `node` definitions.
    #[instrument(level = "debug", skip_all, fields(count = addresses.len()))]
    pub async fn build(
        resolver: &SchemaResolver,
        policy: MergePolicy,
        addresses: &[Address],
    ) -> OmgResult<Self> {
        let root = TypeIdentity::new(addresses);
        if root.is_empty() {
            return Err(OmgError::invalid_argument("schema is required"));
        }

        let mut sets = BTreeMap::new();
        let mut queue = VecDeque::from([root.clone()]);
        while let Some(identity) = queue.pop_front() {
            if sets.contains_key(&identity) {
                continue;
            }
            let resolved = resolver.resolve_all(identity.addresses()).await?;
            let rules = RuleSet::from_merged(&merge_schemas(&resolved, policy)?);
            for rule in rules.keys.values() {
                if let Shape::Node(child) = &rule.shape {
                    if !sets.contains_key(child) {
                        queue.push_back(child.clone());
                    }
                }
            }
            sets.insert(identity, rules);
        }

        debug!(rule_sets = sets.len(), "built validator");
        Ok(Self {
            root,
            sets: Arc::new(sets),
        })
    }

    /// Derive a validator from an already compiled surface without fetching.
    pub fn from_compiled(surface: &CompiledSurface) -> Self {
        let sets = surface
            .types()
            .iter()
            .map(|ty| {
                let keys = ty
                    .fields
                    .values()
                    .map(|f| {
                        let shape = match &f.ty {
                            FieldType::String => Shape::Text,
                            FieldType::Number => Shape::Numeric,
                            FieldType::File { types } => Shape::File {
                                allowed: types.clone(),
                            },
                            FieldType::Node { identity, .. } => Shape::Node(identity.clone()),
                        };
                        (
                            f.key.clone(),
                            KeyRule {
                                shape,
                                multiple: f.multiple,
                            },
                        )
                    })
                    .collect();
                (ty.identity.clone(), RuleSet { keys })
            })
            .collect();
        Self {
            root: surface.root_identity().clone(),
            sets: Arc::new(sets),
        }
    }

    pub fn root(&self) -> &TypeIdentity {
        &self.root
    }

    pub fn rules(&self, identity: &TypeIdentity) -> OmgResult<&RuleSet> {
        self.sets
            .get(identity)
            .ok_or_else(|| {
                OmgError::invariant("validator has no rules for a referenced schema set")
            })
    }

    /// Check a nested payload against the root rule set.
    pub fn validate_payload(&self, payload: &Value) -> OmgResult<()> {
        self.check_object(&self.root, payload)
    }

    /// Check a flat document against the root rule set: every key defined,
    /// cardinality respected, element kinds and file content types matching.
    /// Referenced documents are not fetched.
    pub fn validate_document(&self, doc: &Document) -> OmgResult<()> {
        let rules = self.rules(&self.root)?;

        for el in &doc.elements {
            if !rules.keys.contains_key(el.key()) {
                return Err(OmgError::validation(el.key(), ValidationErrorKind::UnknownKey));
            }
        }

        for (key, rule) in &rules.keys {
            let present: Vec<&Element> = doc.elements_for(key).collect();
            check_cardinality(key, rule, present.len())?;
            for (i, el) in present.iter().enumerate() {
                check_element(rule, el).map_err(|e| {
                    if rule.multiple {
                        e.within(&format!("[{i}]")).within(key)
                    } else {
                        e.within(key)
                    }
                })?;
            }
        }
        Ok(())
    }

    fn check_object(&self, identity: &TypeIdentity, value: &Value) -> OmgResult<()> {
        let obj = value.as_object().ok_or_else(|| shape_mismatch("object", value))?;
        let rules = self.rules(identity)?;

        for key in obj.keys() {
            if !rules.keys.contains_key(key) {
                return Err(OmgError::validation(key.clone(), ValidationErrorKind::UnknownKey));
            }
        }

        for (key, rule) in &rules.keys {
            let value = match obj.get(key) {
                None | Some(Value::Null) => {
                    if rule.multiple {
                        continue;
                    }
                    return Err(OmgError::validation(
                        key.clone(),
                        ValidationErrorKind::Missing {
                            expected: rule.expected(),
                        },
                    ));
                }
                Some(v) => v,
            };

            if rule.multiple {
                let items = value
                    .as_array()
                    .ok_or_else(|| shape_mismatch(&rule.expected(), value).within(key))?;
                for (i, item) in items.iter().enumerate() {
                    self.check_value(&rule.shape, item)
                        .map_err(|e| e.within(&format!("[{i}]")).within(key))?;
                }
            } else {
                self.check_value(&rule.shape, value)
                    .map_err(|e| e.within(key))?;
            }
        }
        Ok(())
    }

    fn check_value(&self, shape: &Shape, value: &Value) -> OmgResult<()> {
        match shape {
            Shape::Text => match value {
                Value::String(_) => Ok(()),
                other => Err(shape_mismatch(shape.describe(), other)),
            },
            Shape::Numeric => match value {
                Value::Number(_) => Ok(()),
                other => Err(shape_mismatch(shape.describe(), other)),
            },
            Shape::File { allowed } => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| shape_mismatch(shape.describe(), value))?;
                let content_type = file_string(obj, "contentType")?;
                file_string(obj, "uri")?;
                if let Some(extra) = obj.keys().find(|k| *k != "contentType" && *k != "uri") {
                    return Err(OmgError::validation(
                        extra.clone(),
                        ValidationErrorKind::UnknownKey,
                    ));
                }
                check_content_type(allowed, content_type)
            }
            Shape::Node(child) => self.check_object(child, value),
        }
    }
}

/// Cardinality check shared with the reader.
pub(crate) fn check_cardinality(key: &str, rule: &KeyRule, count: usize) -> OmgResult<()> {
    if rule.multiple {
        return Ok(());
    }
    match count {
        1 => Ok(()),
        0 => Err(OmgError::validation(
            key,
            ValidationErrorKind::Missing {
                expected: rule.shape.describe().to_string(),
            },
        )),
        n => Err(OmgError::validation(key, ValidationErrorKind::Duplicate { count: n })),
    }
}

/// Check that one document element fits `rule`. Shared with the reader.
pub(crate) fn check_element(rule: &KeyRule, el: &Element) -> OmgResult<()> {
    let expected = rule.shape.kind();
    if el.kind() != expected {
        return Err(OmgError::validation(
            "",
            ValidationErrorKind::KindMismatch {
                expected,
                actual: el.kind(),
            },
        ));
    }
    if let (Element::File { content_type, .. }, Shape::File { allowed }) = (el, &rule.shape) {
        return check_content_type(allowed, content_type);
    }
    Ok(())
}

fn check_content_type(allowed: &[String], content_type: &str) -> OmgResult<()> {
    if allowed.is_empty() || allowed.iter().any(|t| t == content_type) {
        return Ok(());
    }
    Err(OmgError::validation(
        "contentType",
        ValidationErrorKind::ContentTypeNotAllowed {
            content_type: content_type.to_string(),
            allowed: allowed.to_vec(),
        },
    ))
}

fn file_string<'v>(obj: &'v Map<String, Value>, field: &str) -> OmgResult<&'v str> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s),
        None | Some(Value::Null) => Err(OmgError::validation(
            field,
            ValidationErrorKind::Missing {
                expected: "string".to_string(),
            },
        )),
        Some(other) => Err(shape_mismatch("string", other).within(field)),
    }
}

fn shape_mismatch(expected: &str, actual: &Value) -> OmgError {
    OmgError::validation(
        "",
        ValidationErrorKind::ShapeMismatch {
            expected: expected.to_string(),
            actual: json_type(actual).to_string(),
        },
    )
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use omg_core::errors::ValidationError;
    use serde_json::json;

    fn id(a: &str) -> TypeIdentity {
        TypeIdentity::new(&[Address::from(a)])
    }

    fn rule(shape: Shape, multiple: bool) -> KeyRule {
        KeyRule { shape, multiple }
    }

    /// outer: { title: string, photos: [file(image/png)], inner: node(inner) }
    /// inner: { data: string, tags: [string] }
    fn validator() -> Validator {
        let mut outer = RuleSet::default();
        outer.keys.insert("title".into(), rule(Shape::Text, false));
        outer.keys.insert(
            "photos".into(),
            rule(Shape::File { allowed: vec!["image/png".into()] }, true),
        );
        outer.keys.insert("inner".into(), rule(Shape::Node(id("inner")), false));
        let mut inner = RuleSet::default();
        inner.keys.insert("data".into(), rule(Shape::Text, false));
        inner.keys.insert("tags".into(), rule(Shape::Text, true));

        let mut sets = BTreeMap::new();
        sets.insert(id("outer"), outer);
        sets.insert(id("inner"), inner);
        Validator {
            root: id("outer"),
            sets: Arc::new(sets),
        }
    }

    #[test]
    fn accepts_conforming_payload() {
        let payload = json!({
            "title": "hello",
            "photos": [{"contentType": "image/png", "uri": "a"}],
            "inner": {"data": "x"}
        });
        validator().validate_payload(&payload).unwrap();
    }

    #[test]
    fn missing_required_key() {
        let err = validator()
            .validate_payload(&json!({"inner": {"data": "x"}}))
            .unwrap_err();
        assert_matches!(
            err,
            OmgError::Validation(ValidationError {
                ref path,
                kind: ValidationErrorKind::Missing { .. },
            })
                if path == "title"
        );
    }

    #[test]
    fn no_coercion_of_numbers_into_strings() {
        let err = validator()
            .validate_payload(&json!({"title": 5, "inner": {"data": "x"}}))
            .unwrap_err();
        assert_eq!(err.code(), "validation.shape");
        assert!(err.to_string().contains("expected string, got number"));
    }

    #[test]
    fn nested_errors_carry_paths() {
        let err = validator()
            .validate_payload(&json!({"title": "t", "inner": {"data": "x", "tags": ["a", 1]}}))
            .unwrap_err();
        assert_eq!(err.path(), Some("inner.tags[1]"));

        let err = validator()
            .validate_payload(&json!({"title": "t", "inner": {"data": "x", "bogus": 1}}))
            .unwrap_err();
        assert_eq!(err.code(), "validation.unknown_key");
        assert_eq!(err.path(), Some("inner.bogus"));
    }

    #[test]
    fn content_types_are_enforced() {
        let err = validator()
            .validate_payload(&json!({
                "title": "t",
                "inner": {"data": "x"},
                "photos": [{"contentType": "image/gif", "uri": "b"}]
            }))
            .unwrap_err();
        assert_eq!(err.code(), "validation.content_type");
        assert_eq!(err.path(), Some("photos[0].contentType"));
    }

    #[test]
    fn document_duplicate_single_key_rejected() {
        let mut doc = Document::new("0.1.0", vec![]);
        doc.push(Element::string("title", "a"));
        doc.push(Element::string("title", "b"));
        doc.push(Element::node("inner", "x"));
        let err = validator().validate_document(&doc).unwrap_err();
        assert_matches!(
            err,
            OmgError::Validation(ValidationError {
                kind: ValidationErrorKind::Duplicate { count: 2 },
                ..
            })
        );
    }

    #[test]
    fn document_kind_mismatch_rejected() {
        let mut doc = Document::new("0.1.0", vec![]);
        doc.push(Element::number("title", 1));
        doc.push(Element::node("inner", "x"));
        let err = validator().validate_document(&doc).unwrap_err();
        assert_eq!(err.code(), "validation.kind");
        assert_eq!(err.path(), Some("title"));
    }

    #[test]
    fn document_unknown_key_rejected() {
        let mut doc = Document::new("0.1.0", vec![]);
        doc.push(Element::string("title", "a"));
        doc.push(Element::node("inner", "x"));
        doc.push(Element::string("extra", "?"));
        let err = validator().validate_document(&doc).unwrap_err();
        assert_eq!(err.code(), "validation.unknown_key");
    }
}
