use std::io;

use blobline_store::{ObjectKind, StoreError};
use blobline_types::ObjectId;

/// Errors from blob resolution and transcoding.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// The store could not open a stream for the blob. Carries the store's
    /// error as-is.
    #[error(transparent)]
    Open(StoreError),

    /// Reading the raw stream failed mid-transfer.
    #[error("failed to read blob content: {0}")]
    Read(#[source] io::Error),

    /// The base64 encoder rejected a write.
    #[error("failed to encode blob content: {0}")]
    Encode(#[source] io::Error),

    /// The caller cancelled the operation.
    #[error("blob transcoding cancelled")]
    Cancelled,

    /// The blob's declared size exceeds the configured limit.
    #[error("blob {id} is {size} bytes, limit is {limit}")]
    TooLarge { id: ObjectId, size: u64, limit: u64 },

    /// No object with this ID exists in the store.
    #[error("blob not found: {0}")]
    NotFound(ObjectId),

    /// The object exists but is not a blob.
    #[error("object {id} is a {kind}, not a blob")]
    NotABlob { id: ObjectId, kind: ObjectKind },

    /// Store failure while resolving an ID.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Encoded content in a payload is not valid base64.
    #[error("invalid base64 content: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Invalid transcoder configuration.
    #[error("invalid transcode config: {0}")]
    Config(String),

    /// The blocking transcode worker panicked or was aborted.
    #[error("transcode worker failed: {0}")]
    Join(String),
}

/// Result alias for blob operations.
pub type BlobResult<T> = Result<T, BlobError>;
