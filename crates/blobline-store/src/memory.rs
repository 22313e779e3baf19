use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use blobline_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::stream::ObjectStream;
use crate::traits::{EncodedObject, ObjectStore};

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Payloads are reference-counted
/// [`Bytes`], so reads, encoded objects and open streams all share the
/// stored buffer instead of copying it.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total payload bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(StoredObject::size)
            .sum()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let mut map = self.objects.write().expect("lock poisoned");
        map.entry(id).or_insert_with(|| object.clone());
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        let mut map = self.objects.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }

    fn encoded(&self, id: &ObjectId) -> StoreResult<Option<Arc<dyn EncodedObject>>> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(id).map(|obj| {
            Arc::new(MemoryObject {
                id: *id,
                kind: obj.kind,
                data: obj.data.clone(),
            }) as Arc<dyn EncodedObject>
        }))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}

/// Encoded view of an in-memory object. Deleting the object from the store
/// does not invalidate views already handed out.
#[derive(Debug)]
struct MemoryObject {
    id: ObjectId,
    kind: ObjectKind,
    data: Bytes,
}

impl EncodedObject for MemoryObject {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn kind(&self) -> ObjectKind {
        self.kind
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn open(&self) -> StoreResult<ObjectStream> {
        Ok(ObjectStream::new(self.id, Cursor::new(self.data.clone())))
    }
}
