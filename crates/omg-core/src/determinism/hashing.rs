//! Deterministic hashing utilities.
//!
//! All hashes are:
//! - deterministic
//! - computed over canonical bytes
//! - domain-separated when they name something other than content
//!
//! Supported algorithms:
//! - sha256

use sha2::{Digest, Sha256};

use crate::config::HashAlgorithm;
use crate::determinism::canonical_json;
use crate::errors::OmgResult;
use crate::model::{Address, Resource};

/// Hash algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlg {
    Sha256,
}

impl From<HashAlgorithm> for HashAlg {
    fn from(a: HashAlgorithm) -> Self {
        match a {
            HashAlgorithm::Sha256 => HashAlg::Sha256,
        }
    }
}

/// Hash raw bytes using the selected algorithm.
pub fn hash_bytes(alg: HashAlg, bytes: &[u8]) -> Vec<u8> {
    match alg {
        HashAlg::Sha256 => {
            let mut h = Sha256::new();
            h.update(bytes);
            h.finalize().to_vec()
        }
    }
}

/// Hash raw bytes and return a lowercase hex string.
pub fn hash_bytes_hex(bytes: &[u8]) -> String {
    hex::encode(hash_bytes(HashAlg::Sha256, bytes))
}

/// Domain-separated hash, lowercase hex.
pub fn hash_with_domain_hex(domain: &str, payload: &[u8]) -> String {
    let mut buf = Vec::with_capacity(domain.len() + payload.len());
    buf.extend_from_slice(domain.as_bytes());
    buf.extend_from_slice(payload);
    hash_bytes_hex(&buf)
}

/// Address of already-canonical bytes.
pub fn address_of_bytes(alg: HashAlg, bytes: &[u8]) -> Address {
    Address::new(hex::encode(hash_bytes(alg, bytes)))
}

/// Content address of a resource: hex digest of its canonical bytes.
pub fn content_address(alg: HashAlg, resource: &Resource) -> OmgResult<Address> {
    let bytes = canonical_json::resource_bytes(resource)?;
    Ok(address_of_bytes(alg, &bytes))
}

/// Digest of an address set. Callers pass the set already normalized
/// (sorted, deduplicated) so equal sets give equal digests.
pub fn hash_address_set_hex(addresses: &[Address]) -> String {
    let joined = addresses
        .iter()
        .map(Address::as_str)
        .collect::<Vec<_>>()
        .join("\n");
    hash_with_domain_hex(crate::domain::TYPE_NAME, joined.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementDef, Schema};

    #[test]
    fn hash_bytes_stable() {
        assert_eq!(hash_bytes_hex(b"abc"), hash_bytes_hex(b"abc"));
        assert_eq!(
            hash_bytes_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn content_address_ignores_declaration_order() {
        let a = Schema::new("0.1.0", "s")
            .with_element("b", ElementDef::String { multiple: false })
            .with_element("a", ElementDef::Number { multiple: true });
        let b = Schema::new("0.1.0", "s")
            .with_element("a", ElementDef::Number { multiple: true })
            .with_element("b", ElementDef::String { multiple: false });
        assert_eq!(
            content_address(HashAlg::Sha256, &a.into()).unwrap(),
            content_address(HashAlg::Sha256, &b.into()).unwrap()
        );
    }

    #[test]
    fn domain_separation_changes_digest() {
        assert_ne!(hash_with_domain_hex("x", b"abc"), hash_bytes_hex(b"abc"));
    }
}
