use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use blobline_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::stream::{ObjectStream, SizeChecked};
use crate::traits::{EncodedObject, ObjectStore};

/// Loose object header magic.
const MAGIC: &[u8; 4] = b"BLL1";

/// Magic + kind byte + little-endian u64 uncompressed size.
const HEADER_LEN: usize = 4 + 1 + 8;

/// Upper bound on the up-front allocation for full reads, so a corrupt size
/// field cannot trigger a huge allocation before any byte is decoded.
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

/// Filesystem store with one zstd-compressed file per object.
///
/// On-disk layout:
/// ```text
/// <root>/<first id byte as hex>/<remaining 31 bytes as hex>
///
/// [4 bytes: magic "BLL1"]
/// [1 byte:  object kind]
/// [8 bytes: uncompressed size (little-endian u64)]
/// [N bytes: zstd frame of the payload]
/// ```
///
/// Sizes and kinds come from the header, so resolving an object never
/// decompresses it. Streams decode lazily from the open file.
#[derive(Debug)]
pub struct LooseObjectStore {
    config: StoreConfig,
}

impl LooseObjectStore {
    /// Create the root directory if needed and return the store.
    pub fn init(config: StoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(&config.root)?;
        debug!(root = %config.root.display(), "loose object store ready");
        Ok(Self { config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path where the object with `id` lives (whether or not it exists).
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (dir, file) = id.fanout();
        self.config.root.join(dir).join(file)
    }

    /// Open the object file, mapping a missing file to `None`.
    fn open_file(&self, id: &ObjectId) -> StoreResult<Option<(File, PathBuf)>> {
        let path = self.object_path(id);
        match File::open(&path) {
            Ok(file) => Ok(Some((file, path))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn encode_header(kind: ObjectKind, size: u64) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[..4].copy_from_slice(MAGIC);
    header[4] = kind.type_byte();
    header[5..].copy_from_slice(&size.to_le_bytes());
    header
}

fn read_header(file: &mut File, id: &ObjectId) -> StoreResult<(ObjectKind, u64)> {
    let corrupt = |reason: String| StoreError::CorruptObject { id: *id, reason };

    let mut header = [0u8; HEADER_LEN];
    file.read_exact(&mut header).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => corrupt("truncated header".into()),
        _ => StoreError::Io(e),
    })?;
    if &header[..4] != MAGIC {
        return Err(corrupt(format!(
            "bad magic: {}",
            String::from_utf8_lossy(&header[..4])
        )));
    }
    let kind = ObjectKind::from_type_byte(header[4])
        .ok_or_else(|| corrupt(format!("unknown type byte: {}", header[4])))?;
    let mut size = [0u8; 8];
    size.copy_from_slice(&header[5..]);
    Ok((kind, u64::from_le_bytes(size)))
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let Some(encoded) = self.encoded(id)? else {
            return Ok(None);
        };
        let mut data = Vec::with_capacity(encoded.size().min(MAX_PREALLOC) as usize);
        encoded.open()?.read_to_end(&mut data)?;

        let obj = StoredObject::new(encoded.kind(), data);
        if self.config.verify_on_read {
            obj.verify(id)?;
        }
        Ok(Some(obj))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let path = self.object_path(&id);
        if path.is_file() {
            return Ok(id);
        }
        let dir = path
            .parent()
            .unwrap_or_else(|| Path::new(&self.config.root));
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&encode_header(object.kind, object.size()))?;
        let mut encoder = zstd::stream::write::Encoder::new(&mut tmp, self.config.compression_level)?;
        encoder.write_all(&object.data)?;
        encoder.finish()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(id = %id.short_hex(), kind = %object.kind, size = object.size(), "wrote loose object");
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        match fs::remove_file(self.object_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn encoded(&self, id: &ObjectId) -> StoreResult<Option<Arc<dyn EncodedObject>>> {
        let Some((mut file, path)) = self.open_file(id)? else {
            return Ok(None);
        };
        let (kind, size) = read_header(&mut file, id)?;
        Ok(Some(Arc::new(LooseObject {
            id: *id,
            kind,
            size,
            path,
        })))
    }
}

/// Encoded view of a loose object: its header fields and file path. The file
/// is only opened when a stream is requested.
#[derive(Debug)]
struct LooseObject {
    id: ObjectId,
    kind: ObjectKind,
    size: u64,
    path: PathBuf,
}

impl EncodedObject for LooseObject {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn kind(&self) -> ObjectKind {
        self.kind
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn open(&self) -> StoreResult<ObjectStream> {
        let mut file = File::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(self.id),
            _ => StoreError::Io(e),
        })?;
        let (kind, size) = read_header(&mut file, &self.id)?;
        if kind != self.kind || size != self.size {
            return Err(StoreError::CorruptObject {
                id: self.id,
                reason: "header changed since the object was resolved".into(),
            });
        }
        let decoder = zstd::stream::read::Decoder::with_buffer(BufReader::new(file))?;
        debug!(id = %self.id.short_hex(), size = self.size, "opened loose object stream");
        Ok(ObjectStream::new(self.id, SizeChecked::new(decoder, self.size)))
    }
}
