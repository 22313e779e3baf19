use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::BlobResult;
use crate::handle::BlobHandle;
use crate::transcode::StreamingTranscoder;

/// Content encoding tag carried in [`BlobContent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    Base64,
}

/// A blob's identity and full content, shaped for an API response.
///
/// ```json
/// { "sha": "…", "name": "README.md", "size": 2, "encoding": "base64", "content": "aGk=" }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobContent {
    /// Hex object ID.
    pub sha: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub size: u64,
    pub encoding: ContentEncoding,
    pub content: String,
}

impl BlobContent {
    /// Transcode the blob behind `handle` into a response payload.
    pub fn from_handle(handle: &BlobHandle, transcoder: &StreamingTranscoder) -> BlobResult<Self> {
        let content = transcoder.encode_base64(handle)?;
        Ok(Self {
            sha: handle.id().to_hex(),
            name: handle.name().to_string(),
            size: handle.size(),
            encoding: ContentEncoding::Base64,
            content,
        })
    }

    /// Decode `content` back into raw bytes.
    pub fn decode(&self) -> BlobResult<Vec<u8>> {
        match self.encoding {
            ContentEncoding::Base64 => Ok(STANDARD.decode(&self.content)?),
        }
    }
}
