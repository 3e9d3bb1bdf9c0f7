use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;

use omg_core::model::Address;

/// Read a JSON file, or stdin when `path` is `-`.
pub fn read_json_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let raw = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("reading stdin")?
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    serde_json::from_str(&raw).map_err(|e| anyhow!("invalid json in {}: {e}", path.display()))
}

pub fn addresses(raw: &[String]) -> Vec<Address> {
    raw.iter().map(|s| Address::from(s.as_str()).normalized()).collect()
}
