//! Version helpers.
//!
//! This module centralizes version parsing for OpenMetaGraph resources.
//! Reading is lenient (any version string is carried through); creating is
//! strict and only stamps known versions.

use crate::errors::{OmgError, OmgResult};

/// Known resource format versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    V0_1,
}

impl FormatVersion {
    /// Parse a format version string (e.g. "0.1.0").
    pub fn parse(s: &str) -> OmgResult<Self> {
        match s {
            "0.1.0" => Ok(Self::V0_1),
            _ => Err(OmgError::invalid_argument(format!(
                "unsupported format version: {s}"
            ))),
        }
    }

    /// Return the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V0_1 => "0.1.0",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_version() {
        assert_eq!(FormatVersion::parse("0.1.0").unwrap(), FormatVersion::V0_1);
        assert_eq!(FormatVersion::V0_1.as_str(), crate::FORMAT_VERSION);
    }

    #[test]
    fn parse_unknown_version() {
        let e = FormatVersion::parse("v9").unwrap_err();
        assert!(format!("{e:?}").contains("unsupported format version"));
    }
}
