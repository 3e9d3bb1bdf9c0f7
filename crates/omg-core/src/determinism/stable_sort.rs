//! Stable ordering utilities.
//!
//! Node type identity depends on a *set* of schema addresses, while callers
//! hand those addresses over as ordered lists. These helpers make the
//! normalization explicit.

use crate::model::Address;

/// Sort and deduplicate an address list into its canonical set form.
pub fn normalize_address_set(addresses: &[Address]) -> Vec<Address> {
    let mut out = addresses.to_vec();
    out.sort();
    out.dedup();
    out
}

/// Remove duplicates while keeping first-occurrence order.
pub fn dedup_preserving_order<T, K, F>(items: Vec<T>, mut key_fn: F) -> Vec<T>
where
    F: FnMut(&T) -> K,
    K: Ord,
{
    let mut seen = std::collections::BTreeSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key_fn(item)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_sorts_and_dedups() {
        let v = vec![Address::from("b"), Address::from("a"), Address::from("b")];
        assert_eq!(
            normalize_address_set(&v),
            vec![Address::from("a"), Address::from("b")]
        );
    }

    #[test]
    fn dedup_keeps_first() {
        let v = vec![("a", 1), ("b", 2), ("a", 3)];
        assert_eq!(dedup_preserving_order(v, |x| x.0), vec![("a", 1), ("b", 2)]);
    }
}
