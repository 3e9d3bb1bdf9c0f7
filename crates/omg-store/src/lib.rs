//! omg-store
//!
//! Reference implementations of the fetch/store capabilities:
//! - [`MemoryStore`]: process-local, for tests and embedding
//! - [`FsStore`]: one file per resource under a root directory (feature `fs`)
//!
//! Both derive addresses the same way: the configured hash of the resource's
//! canonical JSON bytes, lowercase hex. Storing the same resource twice is a
//! no-op that returns the same address.

pub mod config;
#[cfg(feature = "fs")]
pub mod fs;
pub mod memory;

pub use config::StoreConfig;
#[cfg(feature = "fs")]
pub use fs::FsStore;
pub use memory::MemoryStore;

use omg_core::determinism::canonical_json::resource_bytes;
use omg_core::determinism::hashing::{address_of_bytes, HashAlg};
use omg_core::model::{Address, Resource};
use omg_core::OmgResult;

/// Canonical bytes of `resource` and the address they hash to.
pub(crate) fn encode(resource: &Resource, config: &StoreConfig) -> OmgResult<(Address, Vec<u8>)> {
    let bytes = resource_bytes(resource)?;
    let address = address_of_bytes(HashAlg::from(config.algorithm), &bytes);
    Ok((address, bytes))
}
