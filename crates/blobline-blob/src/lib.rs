//! Blob content access for Blobline.
//!
//! A [`BlobHandle`] names one blob in an object store and offers two ways to
//! get at its bytes:
//!
//! - [`BlobHandle::stream`] returns a lazily-read [`ObjectStream`] that the
//!   caller owns and may close at any point.
//! - [`StreamingTranscoder`] reads the stream once, front to back, and
//!   returns the full content as one standard padded base64 string, ready to
//!   embed in a [`BlobContent`] API payload.
//!
//! Every error is returned to the caller and the stream is released on every
//! path, including cancellation.
//!
//! [`ObjectStream`]: blobline_store::ObjectStream

pub mod cancel;
pub mod config;
pub mod content;
pub mod error;
pub mod handle;
pub mod transcode;

#[cfg(test)]
mod testing;

pub use cancel::{CancelOnDrop, CancelToken};
pub use config::TranscodeConfig;
pub use content::{BlobContent, ContentEncoding};
pub use error::{BlobError, BlobResult};
pub use handle::BlobHandle;
pub use transcode::{encode_base64, StreamingTranscoder};
