//! In-memory content-addressed store for development and testing.
//!
//! Resources are kept as canonical bytes and parsed on every fetch, so a
//! fetch returns exactly what a persistent store would.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

use omg_core::capability::{ContentStore, Fetcher};
use omg_core::model::{Address, Resource};
use omg_core::parse::parse_resource;
use omg_core::{OmgError, OmgResult};

use crate::{encode, StoreConfig};

pub struct MemoryStore {
    objects: Arc<DashMap<Address, Vec<u8>>>,
    writes: AtomicUsize,
    config: StoreConfig,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            objects: Arc::new(DashMap::new()),
            writes: AtomicUsize::new(0),
            config,
        }
    }

    /// Number of distinct resources held.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of `store` calls served, including repeats.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.objects.contains_key(&address.normalized())
    }

    /// Canonical bytes stored under `address`.
    pub fn raw(&self, address: &Address) -> Option<Vec<u8>> {
        self.objects.get(&address.normalized()).map(|b| b.clone())
    }

    pub fn clear(&self) {
        self.objects.clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for MemoryStore {
    async fn fetch(&self, address: &Address) -> OmgResult<Resource> {
        let address = address.normalized();
        let bytes = self
            .objects
            .get(&address)
            .map(|b| b.clone())
            .ok_or_else(|| OmgError::not_found(&address))?;
        parse_resource(&bytes, self.config.max_resource_bytes)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn store(&self, resource: &Resource) -> OmgResult<Address> {
        let (address, bytes) = encode(resource, &self.config)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.objects.entry(address.clone()).or_insert(bytes);
        trace!(address = %address, "memory store put");
        Ok(address)
    }
}
