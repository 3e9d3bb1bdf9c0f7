//! Store configuration.

use serde::{Deserialize, Serialize};

use omg_core::config::{CoreConfig, HashAlgorithm};
use omg_core::parse::DEFAULT_MAX_RESOURCE_BYTES;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Address function.
    pub algorithm: HashAlgorithm,
    /// Resources larger than this are refused on read.
    pub max_resource_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
            max_resource_bytes: DEFAULT_MAX_RESOURCE_BYTES,
        }
    }
}

impl From<&CoreConfig> for StoreConfig {
    fn from(cfg: &CoreConfig) -> Self {
        Self {
            algorithm: cfg.hashing.algorithm,
            max_resource_bytes: cfg.limits.max_resource_bytes,
        }
    }
}
