//! Field selections.
//!
//! A [`Selection`] says which fields of a compiled type a read should
//! resolve; only selected `node` fields are fetched. The text form is a
//! brace-nested field list:
//!
//! ```text
//! title photos { uri } inner { data }
//! ```
//!
//! Sub-selections on `file` fields pick record attributes (`contentType`,
//! `uri`); an empty one returns both. Commas are treated as whitespace and
//! an outer pair of braces is allowed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use omg_core::{OmgError, OmgResult};

use crate::compiler::CompiledSurface;
use crate::types::{FieldType, TypeIdentity};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    fields: BTreeMap<String, Selection>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf field.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), Selection::default());
        self
    }

    /// Add a field with a sub-selection.
    pub fn nested(mut self, name: impl Into<String>, sub: Selection) -> Self {
        self.fields.insert(name.into(), sub);
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Selection)> {
        self.fields.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Selection> {
        self.fields.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse the text form.
    pub fn parse(src: &str) -> OmgResult<Self> {
        let tokens = tokenize(src)?;
        let mut pos = 0;

        let wrapped = matches!(tokens.first(), Some(Token::Open));
        if wrapped {
            pos += 1;
        }
        let sel = parse_fields(&tokens, &mut pos)?;
        if wrapped {
            match tokens.get(pos) {
                Some(Token::Close) => pos += 1,
                _ => return Err(OmgError::invalid_argument("selection: missing closing '}'")),
            }
        }
        if pos != tokens.len() {
            return Err(OmgError::invalid_argument("selection: unexpected '}'"));
        }
        Ok(sel)
    }

    /// Select every field of the surface's root type, following node types
    /// down to `max_depth` levels. Node fields below that depth are left out.
    pub fn all(surface: &CompiledSurface, max_depth: usize) -> OmgResult<Self> {
        expand(surface, surface.root_identity(), 0, max_depth)
    }
}

fn expand(
    surface: &CompiledSurface,
    identity: &TypeIdentity,
    depth: usize,
    max_depth: usize,
) -> OmgResult<Selection> {
    let ty = surface.type_of(identity)?;
    let mut sel = Selection::new();
    for field in ty.fields.values() {
        match &field.ty {
            FieldType::Node { identity, .. } => {
                if depth + 1 >= max_depth {
                    continue;
                }
                let sub = expand(surface, identity, depth + 1, max_depth)?;
                if !sub.is_empty() {
                    sel = sel.nested(field.key.clone(), sub);
                }
            }
            _ => sel = sel.field(field.key.clone()),
        }
    }
    Ok(sel)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Name(String),
    Open,
    Close,
}

fn tokenize(src: &str) -> OmgResult<Vec<Token>> {
    let mut out = Vec::new();
    let mut chars = src.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '{' => out.push(Token::Open),
            '}' => out.push(Token::Close),
            c if c.is_whitespace() || c == ',' => {}
            c if is_name_char(c) => {
                let mut name = String::from(c);
                while let Some(&(_, n)) = chars.peek() {
                    if !is_name_char(n) {
                        break;
                    }
                    name.push(n);
                    chars.next();
                }
                out.push(Token::Name(name));
            }
            other => {
                return Err(OmgError::invalid_argument(format!(
                    "selection: unexpected character '{other}' at {i}"
                )))
            }
        }
    }
    Ok(out)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

fn parse_fields(tokens: &[Token], pos: &mut usize) -> OmgResult<Selection> {
    let mut sel = Selection::new();
    while let Some(Token::Name(name)) = tokens.get(*pos) {
        *pos += 1;
        if let Some(Token::Open) = tokens.get(*pos) {
            *pos += 1;
            let sub = parse_fields(tokens, pos)?;
            match tokens.get(*pos) {
                Some(Token::Close) => *pos += 1,
                _ => {
                    return Err(OmgError::invalid_argument(format!(
                        "selection: missing closing '}}' after '{name}'"
                    )))
                }
            }
            if sub.is_empty() {
                return Err(OmgError::invalid_argument(format!(
                    "selection: empty braces after '{name}'"
                )));
            }
            sel = sel.nested(name.clone(), sub);
        } else {
            sel = sel.field(name.clone());
        }
    }
    Ok(sel)
}
