use std::fmt;
use std::sync::Arc;

use blobline_store::{
    EncodedObject, EntryMode, ObjectKind, ObjectStore, ObjectStream, StoreResult, TreeEntry,
};
use blobline_types::ObjectId;

use crate::error::{BlobError, BlobResult};
use crate::transcode;

/// A blob in an object store, plus an optional label.
///
/// The handle holds only the ID, the label and the store's [`EncodedObject`]
/// for that ID. It never copies the payload and keeps nothing open; each
/// [`stream`](BlobHandle::stream) call opens fresh resources owned by the
/// returned stream. Cloning is cheap.
#[derive(Clone)]
pub struct BlobHandle {
    id: ObjectId,
    name: String,
    source: Arc<dyn EncodedObject>,
}

impl BlobHandle {
    /// Wrap an encoded object the store has already resolved.
    ///
    /// Use [`resolve`](BlobHandle::resolve) to go from an ID to a handle with
    /// the kind check applied.
    pub fn new(source: Arc<dyn EncodedObject>) -> Self {
        Self {
            id: source.id(),
            name: String::new(),
            source,
        }
    }

    /// Attach a label, usually the path the blob was found under.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Resolve `id` to a blob handle.
    pub fn resolve<S: ObjectStore + ?Sized>(store: &S, id: &ObjectId) -> BlobResult<Self> {
        let source = store.encoded(id)?.ok_or(BlobError::NotFound(*id))?;
        match source.kind() {
            ObjectKind::Blob => Ok(Self::new(source)),
            kind => Err(BlobError::NotABlob { id: *id, kind }),
        }
    }

    /// [`resolve`](BlobHandle::resolve) and label the handle.
    pub fn resolve_named<S: ObjectStore + ?Sized>(
        store: &S,
        id: &ObjectId,
        name: impl Into<String>,
    ) -> BlobResult<Self> {
        Ok(Self::resolve(store, id)?.with_name(name))
    }

    /// Resolve the blob a tree entry points at, labelled with the entry name.
    pub fn from_tree_entry<S: ObjectStore + ?Sized>(
        store: &S,
        entry: &TreeEntry,
    ) -> BlobResult<Self> {
        if entry.mode == EntryMode::Directory {
            return Err(BlobError::NotABlob {
                id: entry.object_id,
                kind: ObjectKind::Tree,
            });
        }
        Self::resolve_named(store, &entry.object_id, entry.name.as_str())
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The label, or `""` if none was set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared uncompressed size, as recorded by the store.
    pub fn size(&self) -> u64 {
        self.source.size()
    }

    /// Open a new stream over the blob content, positioned at offset 0.
    ///
    /// The caller owns the stream; closing or dropping it before the end
    /// discards the rest without reading it.
    pub fn stream(&self) -> StoreResult<ObjectStream> {
        self.source.open()
    }

    /// The whole content as standard padded base64, using default settings.
    pub fn encode_base64(&self) -> BlobResult<String> {
        transcode::encode_base64(self)
    }
}

impl fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("size", &self.size())
            .finish()
    }
}
