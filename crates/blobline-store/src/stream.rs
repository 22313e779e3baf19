use std::fmt;
use std::io::{self, Read};

use blobline_types::ObjectId;
use tracing::trace;

/// A read-only, forward-only byte stream over one stored object.
///
/// Each stream is opened independently and positioned at offset 0. It owns
/// whatever the backend needed to produce bytes (a file descriptor, a
/// decompression context, or a shared in-memory buffer). [`close`] releases
/// those resources immediately and silently discards any unread bytes;
/// dropping the stream has the same effect.
///
/// [`close`]: ObjectStream::close
pub struct ObjectStream {
    id: ObjectId,
    inner: Option<Box<dyn Read + Send>>,
    consumed: u64,
}

impl ObjectStream {
    pub fn new(id: ObjectId, reader: impl Read + Send + 'static) -> Self {
        Self {
            id,
            inner: Some(Box::new(reader)),
            consumed: 0,
        }
    }

    /// ID of the object this stream reads.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Bytes handed out so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Release the underlying resources. Unread bytes are dropped without
    /// being read. Idempotent; reads after close report end of stream.
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            trace!(id = %self.id.short_hex(), consumed = self.consumed, "object stream closed");
        }
    }
}

impl Read for ObjectStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(0);
        };
        let n = inner.read(buf)?;
        self.consumed += n as u64;
        Ok(n)
    }
}

impl Drop for ObjectStream {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for ObjectStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStream")
            .field("id", &self.id)
            .field("consumed", &self.consumed)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Wraps a decoded payload and fails with `InvalidData` if it ends before or
/// runs past the size recorded in the object header.
pub(crate) struct SizeChecked<R> {
    inner: R,
    remaining: u64,
}

impl<R: Read> SizeChecked<R> {
    pub(crate) fn new(inner: R, declared: u64) -> Self {
        Self {
            inner,
            remaining: declared,
        }
    }
}

impl<R: Read> Read for SizeChecked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.remaining == 0 {
            // Probe one byte so trailing garbage is reported, not ignored.
            let mut probe = [0u8; 1];
            return match self.inner.read(&mut probe)? {
                0 => Ok(0),
                _ => Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "object payload longer than declared size",
                )),
            };
        }
        let max = buf.len().min(self.remaining.min(usize::MAX as u64) as usize);
        let n = self.inner.read(&mut buf[..max])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("object payload truncated, {} bytes missing", self.remaining),
            ));
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct DropFlag<R> {
        inner: R,
        dropped: Arc<AtomicBool>,
    }

    impl<R: Read> Read for DropFlag<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl<R> Drop for DropFlag<R> {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn reads_and_counts() {
        let mut stream = ObjectStream::new(ObjectId::null(), Cursor::new(b"hello".to_vec()));
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello");
        assert_eq!(stream.consumed(), 5);
    }

    #[test]
    fn close_releases_reader_and_discards_tail() {
        let dropped = Arc::new(AtomicBool::new(false));
        let reader = DropFlag {
            inner: Cursor::new(vec![7u8; 1024]),
            dropped: Arc::clone(&dropped),
        };
        let mut stream = ObjectStream::new(ObjectId::null(), reader);
        let mut buf = [0u8; 10];
        stream.read_exact(&mut buf).unwrap();

        stream.close();
        assert!(dropped.load(Ordering::SeqCst));
        assert!(stream.is_closed());
        assert_eq!(stream.read(&mut buf).unwrap(), 0);

        // Idempotent.
        stream.close();
        assert_eq!(stream.consumed(), 10);
    }

    #[test]
    fn drop_releases_reader() {
        let dropped = Arc::new(AtomicBool::new(false));
        let reader = DropFlag {
            inner: Cursor::new(vec![1u8; 16]),
            dropped: Arc::clone(&dropped),
        };
        drop(ObjectStream::new(ObjectId::null(), reader));
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[test]
    fn size_checked_accepts_exact_length() {
        let mut reader = SizeChecked::new(Cursor::new(b"abcdef".to_vec()), 6);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abcdef");
    }

    #[test]
    fn size_checked_rejects_short_payload() {
        let mut reader = SizeChecked::new(Cursor::new(b"abc".to_vec()), 6);
        let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn size_checked_rejects_long_payload() {
        let mut reader = SizeChecked::new(Cursor::new(b"abcdefgh".to_vec()), 6);
        let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
