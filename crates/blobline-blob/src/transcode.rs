use std::io::{self, Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderStringWriter;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::config::TranscodeConfig;
use crate::error::{BlobError, BlobResult};
use crate::handle::BlobHandle;

/// Cap on the output capacity reserved up front from the declared size.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Encode a blob's whole content as standard padded base64 with the default
/// [`TranscodeConfig`].
pub fn encode_base64(handle: &BlobHandle) -> BlobResult<String> {
    StreamingTranscoder::default().encode_base64(handle)
}

/// Single-pass base64 transcoder for blob content.
///
/// Reads the blob stream one chunk at a time and feeds each chunk straight
/// into the encoder, so only the encoded output is ever held whole. The
/// transcoder keeps no state between calls; one instance can serve any
/// number of concurrent invocations.
///
/// Each invocation goes through:
///
/// ```text
/// Idle -> StreamOpened -> Copying -> EncoderFlushed -> Done
///                \___________\______________________-> Failed
/// ```
///
/// The stream is closed on every path out of `StreamOpened`. A failed
/// invocation returns only the error, never a partial string.
#[derive(Clone, Debug, Default)]
pub struct StreamingTranscoder {
    config: TranscodeConfig,
}

impl StreamingTranscoder {
    pub fn new(config: TranscodeConfig) -> BlobResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TranscodeConfig {
        &self.config
    }

    pub fn encode_base64(&self, handle: &BlobHandle) -> BlobResult<String> {
        self.encode_base64_with(handle, &CancelToken::new())
    }

    /// Like [`encode_base64`](Self::encode_base64), but stops between chunks
    /// once `cancel` fires and returns [`BlobError::Cancelled`].
    pub fn encode_base64_with(
        &self,
        handle: &BlobHandle,
        cancel: &CancelToken,
    ) -> BlobResult<String> {
        let size = handle.size();
        if let Some(limit) = self.config.max_size {
            if size > limit {
                return Err(BlobError::TooLarge {
                    id: handle.id(),
                    size,
                    limit,
                });
            }
        }
        if cancel.is_cancelled() {
            return Err(BlobError::Cancelled);
        }

        let mut stream = handle.stream().map_err(BlobError::Open)?;
        let result = self.encode_reader(&mut stream, size, cancel);
        stream.close();

        if let Ok(encoded) = &result {
            debug!(
                id = %handle.id().short_hex(),
                name = handle.name(),
                raw_bytes = stream.consumed(),
                encoded_bytes = encoded.len(),
                "blob transcoded to base64"
            );
        }
        result
    }

    /// Async entry point. The transcode runs on tokio's blocking pool; if the
    /// returned future is dropped first (for example by
    /// `tokio::time::timeout`), the worker is cancelled at its next chunk
    /// boundary and the stream is released.
    pub async fn encode_base64_async(&self, handle: BlobHandle) -> BlobResult<String> {
        let cancel = CancelToken::new();
        let _guard = cancel.drop_guard();
        let transcoder = self.clone();
        tokio::task::spawn_blocking(move || transcoder.encode_base64_with(&handle, &cancel))
            .await
            .map_err(|e| BlobError::Join(e.to_string()))?
    }

    fn encode_reader<R: Read>(
        &self,
        reader: &mut R,
        size_hint: u64,
        cancel: &CancelToken,
    ) -> BlobResult<String> {
        let capacity = base64::encoded_len(size_hint.min(MAX_PREALLOC) as usize, true).unwrap_or(0);
        let mut encoder =
            EncoderStringWriter::from_consumer(String::with_capacity(capacity), &STANDARD);
        let mut chunk = vec![0u8; self.config.chunk_size];

        loop {
            if cancel.is_cancelled() {
                return Err(BlobError::Cancelled);
            }
            let n = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(BlobError::Read(e)),
            };
            encoder.write_all(&chunk[..n]).map_err(BlobError::Encode)?;
        }

        // Emits the trailing partial group and its padding.
        Ok(encoder.into_inner())
    }
}
