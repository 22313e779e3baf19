use std::fmt;
use std::sync::Arc;

use blobline_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::stream::ObjectStream;

/// A stored object as seen through its backend: metadata that is available
/// without reading the payload, plus the ability to open the payload as a
/// stream.
///
/// Holding an `EncodedObject` does not keep any file or decoder open. Every
/// call to [`open`](EncodedObject::open) acquires fresh resources that belong
/// to the returned stream.
pub trait EncodedObject: Send + Sync + fmt::Debug {
    fn id(&self) -> ObjectId;

    fn kind(&self) -> ObjectKind;

    /// Declared uncompressed payload length. Metadata only, never a read.
    fn size(&self) -> u64;

    /// Open a new independent stream over the payload at offset 0.
    fn open(&self) -> StoreResult<ObjectStream>;
}

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written; the same data always produces the
///   same ID, and equal IDs always stream identical bytes.
/// - Concurrent reads are always safe.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object fully into memory.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed ID. Idempotent.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Delete an object by ID. Returns `true` if the object existed.
    fn delete(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Resolve an ID to its encoded object without reading the payload.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn encoded(&self, id: &ObjectId) -> StoreResult<Option<Arc<dyn EncodedObject>>>;

    /// Open a stream over an object's payload.
    fn open(&self, id: &ObjectId) -> StoreResult<ObjectStream> {
        self.encoded(id)?
            .ok_or(StoreError::NotFound(*id))?
            .open()
    }

    /// Declared uncompressed size of an object, if it exists.
    fn size(&self, id: &ObjectId) -> StoreResult<Option<u64>> {
        Ok(self.encoded(id)?.map(|obj| obj.size()))
    }

    fn read_batch(&self, ids: &[ObjectId]) -> StoreResult<Vec<Option<StoredObject>>> {
        ids.iter().map(|id| self.read(id)).collect()
    }

    fn write_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<ObjectId>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }
}
