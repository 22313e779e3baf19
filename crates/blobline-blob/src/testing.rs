//! Scriptable encoded objects for exercising failure paths.

use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use blobline_store::{EncodedObject, ObjectKind, ObjectStream, StoreError, StoreResult};
use blobline_types::ObjectId;

use crate::handle::BlobHandle;

/// An in-memory blob whose streams can break, stall or refuse to open, and
/// which counts how many of its streams are still alive.
#[derive(Debug)]
pub(crate) struct ScriptedObject {
    pub data: Arc<[u8]>,
    /// Reads fail once this many bytes have been delivered.
    pub fail_after: Option<usize>,
    pub fail_open: bool,
    /// Sleep before every read.
    pub delay: Option<Duration>,
    pub live_streams: Arc<AtomicUsize>,
    pub reads: Arc<AtomicUsize>,
}

impl ScriptedObject {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: Arc::from(data),
            fail_after: None,
            fail_open: false,
            delay: None,
            live_streams: Arc::new(AtomicUsize::new(0)),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn into_handle(self) -> BlobHandle {
        BlobHandle::new(Arc::new(self))
    }
}

impl EncodedObject for ScriptedObject {
    fn id(&self) -> ObjectId {
        ObjectId::digest(&self.data)
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Blob
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn open(&self) -> StoreResult<ObjectStream> {
        if self.fail_open {
            return Err(StoreError::CorruptObject {
                id: self.id(),
                reason: "scripted open failure".into(),
            });
        }
        self.live_streams.fetch_add(1, Ordering::SeqCst);
        let reader = ScriptedReader {
            data: Arc::clone(&self.data),
            pos: 0,
            fail_after: self.fail_after,
            delay: self.delay,
            live_streams: Arc::clone(&self.live_streams),
            reads: Arc::clone(&self.reads),
        };
        Ok(ObjectStream::new(self.id(), reader))
    }
}

struct ScriptedReader {
    data: Arc<[u8]>,
    pos: usize,
    fail_after: Option<usize>,
    delay: Option<Duration>,
    live_streams: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
}

impl Read for ScriptedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let mut end = self.data.len();
        if let Some(limit) = self.fail_after {
            if self.pos >= limit {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "broken stream"));
            }
            end = end.min(limit);
        }
        let n = buf.len().min(end - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Drop for ScriptedReader {
    fn drop(&mut self) {
        self.live_streams.fetch_sub(1, Ordering::SeqCst);
    }
}
