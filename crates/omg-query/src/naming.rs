//! Generated type names.
//!
//! A node type is named after the set of schemas it merges:
//! `Node` + each constituent's capitalised name (in sorted-address order)
//! + the first 8 hex characters of a digest of the sorted address set
//! + an optional postfix. The digest keeps names unique when two sets share
//! display names; sorting keeps them stable across input orders.

use omg_core::determinism::hashing::hash_address_set_hex;

use crate::types::TypeIdentity;

pub const NODE_PREFIX: &str = "Node";
pub const INPUT_POSTFIX: &str = "CreateInput";
pub const FILE_TYPE: &str = "File";
pub const FILE_INPUT_TYPE: &str = "FileInput";

const DIGEST_CHARS: usize = 8;

/// Build the type name for `identity`.
///
/// `names` must be the constituent names in the identity's address order.
pub fn type_name(identity: &TypeIdentity, names: &[&str], postfix: &str) -> String {
    let mut out = String::from(NODE_PREFIX);
    for name in names {
        out.push_str(&capitalize(&sanitize(name)));
    }
    let digest = hash_address_set_hex(identity.addresses());
    out.push_str(&digest[..DIGEST_CHARS]);
    out.push_str(postfix);
    out
}

/// Name of the input type paired with an output type.
pub fn input_name(output_name: &str) -> String {
    format!("{output_name}{INPUT_POSTFIX}")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Keep characters valid in a query-language identifier.
fn sanitize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use omg_core::model::Address;

    #[test]
    fn names_are_capitalised_and_suffixed() {
        let id = TypeIdentity::new(&[Address::from("b"), Address::from("a")]);
        let name = type_name(&id, &["article", "photo set"], "");
        assert!(name.starts_with("NodeArticlePhotoset"));
        assert_eq!(name.len(), "NodeArticlePhotoset".len() + 8);
        assert!(type_name(&id, &["article"], INPUT_POSTFIX).ends_with("CreateInput"));
    }

    #[test]
    fn digest_distinguishes_sets_with_equal_names() {
        let a = TypeIdentity::new(&[Address::from("a")]);
        let b = TypeIdentity::new(&[Address::from("b")]);
        assert_ne!(type_name(&a, &["x"], ""), type_name(&b, &["x"], ""));
    }
}
