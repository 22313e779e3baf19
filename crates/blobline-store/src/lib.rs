//! Content-addressed object storage for Blobline.
//!
//! Objects (blobs and trees) are immutable and identified by the
//! domain-separated BLAKE3 hash of their kind and bytes.
//!
//! # Access modes
//!
//! - [`ObjectStore::read`] materializes a whole object in memory.
//! - [`ObjectStore::encoded`] resolves an ID to an [`EncodedObject`]: size and
//!   kind without touching the payload, plus [`EncodedObject::open`] for a
//!   lazily-read [`ObjectStream`].
//!
//! # Backends
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`LooseObjectStore`] -- one zstd-compressed file per object
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Concurrent reads are always safe.
//! 3. Every stream owns its resources and releases them on close or drop.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod config;
pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod stream;
pub mod traits;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, EntryMode, ObjectKind, StoredObject, Tree, TreeEntry};
pub use stream::ObjectStream;
pub use traits::{EncodedObject, ObjectStore};
