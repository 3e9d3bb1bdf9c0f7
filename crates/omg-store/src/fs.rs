//! Filesystem content-addressed store.
//!
//! Layout:
//!
//! ```text
//! <root>/objects/<first two hex chars>/<remaining hex chars>.json
//! ```
//!
//! Files hold canonical JSON bytes. Each write goes to its own temporary
//! sibling and is renamed into place, so a reader never sees a partial
//! object. Concurrent writers of one object may race; since the bytes are
//! identical, whichever rename lands is the object.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{debug, trace};

use omg_core::capability::{ContentStore, Fetcher};
use omg_core::errors::CapabilityOp;
use omg_core::model::{Address, Resource};
use omg_core::parse::parse_resource;
use omg_core::{OmgError, OmgResult};

use crate::{encode, StoreConfig};

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

fn tmp_path(path: &Path) -> PathBuf {
    let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_extension(format!("{}.{seq}.tmp", std::process::id()))
}

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    config: StoreConfig,
}

impl FsStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>, config: StoreConfig) -> OmgResult<Self> {
        let root = root.into();
        let objects = root.join("objects");
        tokio::fs::create_dir_all(&objects)
            .await
            .map_err(|e| {
                OmgError::capability(CapabilityOp::Store, objects.display().to_string(), e)
            })?;
        debug!(root = %root.display(), "opened fs store");
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the object file for `address`.
    pub fn object_path(&self, address: &Address) -> OmgResult<PathBuf> {
        let a = address.as_str();
        if a.len() < 3 || !a.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(OmgError::invalid_argument(format!(
                "not a store address: '{a}'"
            )));
        }
        let (dir, rest) = a.split_at(2);
        Ok(self.root.join("objects").join(dir).join(format!("{rest}.json")))
    }

    /// Canonical bytes stored under `address`.
    pub async fn raw(&self, address: &Address) -> OmgResult<Vec<u8>> {
        let address = address.normalized();
        let path = self.object_path(&address)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(OmgError::not_found(&address)),
            Err(e) => Err(OmgError::capability(CapabilityOp::Fetch, address.as_str(), e)),
        }
    }
}

#[async_trait]
impl Fetcher for FsStore {
    async fn fetch(&self, address: &Address) -> OmgResult<Resource> {
        let bytes = self.raw(address).await?;
        parse_resource(&bytes, self.config.max_resource_bytes)
    }
}

#[async_trait]
impl ContentStore for FsStore {
    async fn store(&self, resource: &Resource) -> OmgResult<Address> {
        let (address, bytes) = encode(resource, &self.config)?;
        let path = self.object_path(&address)?;
        let io_err =
            |e: std::io::Error| OmgError::capability(CapabilityOp::Store, address.as_str(), e);

        if tokio::fs::try_exists(&path).await.map_err(io_err)? {
            trace!(address = %address, "object already present");
            return Ok(address);
        }
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
        }
        let tmp = tmp_path(&path);
        tokio::fs::write(&tmp, &bytes).await.map_err(io_err)?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Err(io_err(e));
            }
            trace!(address = %address, "object written concurrently");
            return Ok(address);
        }

        debug!(address = %address, bytes = bytes.len(), "stored object");
        Ok(address)
    }
}
