use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BlobError, BlobResult};

/// Largest accepted read chunk.
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Settings for [`StreamingTranscoder`](crate::StreamingTranscoder).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// Bytes requested from the source stream per read.
    pub chunk_size: usize,
    /// Refuse blobs whose declared size exceeds this many bytes.
    pub max_size: Option<u64>,
}

impl TranscodeConfig {
    pub fn validate(&self) -> BlobResult<()> {
        if self.chunk_size == 0 {
            return Err(BlobError::Config("chunk_size must be non-zero".into()));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(BlobError::Config(format!(
                "chunk_size {} exceeds maximum {MAX_CHUNK_SIZE}",
                self.chunk_size
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> BlobResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| BlobError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> BlobResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| BlobError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 48 * 1024,
            max_size: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = TranscodeConfig::default();
        assert_eq!(c.chunk_size, 48 * 1024);
        assert!(c.max_size.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_zero_and_oversized_chunks() {
        let zero = TranscodeConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(BlobError::Config(_))));

        let huge = TranscodeConfig {
            chunk_size: MAX_CHUNK_SIZE + 1,
            ..Default::default()
        };
        assert!(matches!(huge.validate(), Err(BlobError::Config(_))));
    }

    #[test]
    fn from_toml() {
        let c = TranscodeConfig::from_toml_str("chunk_size = 4096\nmax_size = 1048576\n").unwrap();
        assert_eq!(c.chunk_size, 4096);
        assert_eq!(c.max_size, Some(1024 * 1024));

        let partial = TranscodeConfig::from_toml_str("max_size = 10").unwrap();
        assert_eq!(partial.chunk_size, TranscodeConfig::default().chunk_size);
    }

    #[test]
    fn from_toml_validates() {
        assert!(matches!(
            TranscodeConfig::from_toml_str("chunk_size = 0"),
            Err(BlobError::Config(_))
        ));
    }

    #[test]
    fn from_toml_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcode.toml");
        std::fs::write(&path, "chunk_size = 3").unwrap();
        assert_eq!(TranscodeConfig::from_toml_file(&path).unwrap().chunk_size, 3);
        assert!(TranscodeConfig::from_toml_file(&dir.path().join("missing.toml")).is_err());
    }
}
