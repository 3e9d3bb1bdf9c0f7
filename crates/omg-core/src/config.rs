//! Configuration structures for omg-core and the crates built on it.
//!
//! This module defines explicit, serializable configuration objects used by
//! higher-level components (query surface, stores, CLI) to control merge
//! policy, limits, hashing and the format version stamped on new resources.
//!
//! The core crate itself does not read environment variables. All configuration
//! must be provided explicitly by the caller.

use serde::{Deserialize, Serialize};

use crate::errors::{OmgError, OmgResult};
use crate::version::FormatVersion;

/// Global configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoreConfig {
    pub limits: LimitsConfig,
    pub merge: MergeConfig,
    pub format: FormatConfig,
    pub hashing: HashingConfig,
}

/// Resource and complexity limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LimitsConfig {
    /// Maximum alias nesting followed by the schema resolver.
    pub max_alias_depth: usize,
    /// Maximum depth of a default selection expanded over node types.
    pub max_node_depth: usize,
    /// Maximum size of one stored resource when parsed.
    pub max_resource_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_alias_depth: 32,
            max_node_depth: 16,
            max_resource_bytes: 2 * 1024 * 1024,
        }
    }
}

/// What to do when two merged schemas define the same key differently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Fail compilation with a conflict error.
    #[default]
    Reject,
    /// Keep the definition seen last in resolver order.
    LastWins,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::LastWins => "last-wins",
        }
    }

    pub fn parse(s: &str) -> OmgResult<Self> {
        match s {
            "reject" => Ok(Self::Reject),
            "last-wins" => Ok(Self::LastWins),
            _ => Err(OmgError::invalid_argument(format!(
                "unsupported merge policy: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub policy: MergePolicy,
}

/// Format-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Version string stamped on schemas, aliases and documents created here.
    pub version: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            version: crate::FORMAT_VERSION.to_string(),
        }
    }
}

/// Hashing-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    pub algorithm: HashAlgorithm,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
        }
    }
}

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha256,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CoreConfig) -> OmgResult<()> {
    if cfg.limits.max_alias_depth == 0 {
        return Err(OmgError::invalid_argument(
            "max_alias_depth must be greater than zero",
        ));
    }

    if cfg.limits.max_node_depth == 0 {
        return Err(OmgError::invalid_argument(
            "max_node_depth must be greater than zero",
        ));
    }

    if cfg.limits.max_resource_bytes == 0 {
        return Err(OmgError::invalid_argument(
            "max_resource_bytes must be greater than zero",
        ));
    }

    FormatVersion::parse(&cfg.format.version)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = CoreConfig::default();
        validate_config(&cfg).unwrap();
        assert_eq!(cfg.merge.policy, MergePolicy::Reject);
    }

    #[test]
    fn zero_depth_detected() {
        let mut cfg = CoreConfig::default();
        cfg.limits.max_alias_depth = 0;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn unknown_version_detected() {
        let mut cfg = CoreConfig::default();
        cfg.format.version = "9.9.9".to_string();
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn merge_policy_parses() {
        assert_eq!(MergePolicy::parse("last-wins").unwrap(), MergePolicy::LastWins);
        assert!(MergePolicy::parse("first-wins").is_err());
    }
}
