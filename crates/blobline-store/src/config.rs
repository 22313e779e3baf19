use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Configuration for [`LooseObjectStore`](crate::LooseObjectStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the fan-out object directories.
    pub root: PathBuf,
    /// zstd level used when writing objects.
    pub compression_level: i32,
    /// Re-hash objects on full reads and fail on mismatch.
    pub verify_on_read: bool,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("objects"),
            compression_level: 3,
            verify_on_read: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.root, PathBuf::from("objects"));
        assert_eq!(c.compression_level, 3);
        assert!(c.verify_on_read);
    }

    #[test]
    fn toml_overrides_some_fields() {
        let c = StoreConfig::from_toml_str("root = \"/srv/objects\"\ncompression_level = 9\n")
            .unwrap();
        assert_eq!(c.root, PathBuf::from("/srv/objects"));
        assert_eq!(c.compression_level, 9);
        assert!(c.verify_on_read);
    }

    #[test]
    fn toml_type_error_is_config_error() {
        let err = StoreConfig::from_toml_str("compression_level = \"high\"").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
