use std::io::{self, Read};

use blobline_types::ObjectId;

/// Domain-separated BLAKE3 content hasher.
///
/// The domain tag is prepended to every computation as `"<domain>:"`.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    pub const BLOB: Self = Self {
        domain: "blobline-blob-v1",
    };
    pub const TREE: Self = Self {
        domain: "blobline-tree-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash a complete buffer.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = self.start();
        hasher.update(data);
        hasher.finalize()
    }

    /// Start an incremental hash, for content that arrives as a stream.
    pub fn start(&self) -> DomainHasher {
        let mut inner = blake3::Hasher::new();
        inner.update(self.domain.as_bytes());
        inner.update(b":");
        DomainHasher { inner }
    }

    /// Hash everything `reader` yields, in 64 KiB steps.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<ObjectId> {
        let mut hasher = self.start();
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => hasher.update(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(hasher.finalize())
    }

    /// Verify that data produces the expected object ID.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// An in-progress domain-separated hash. See [`ContentHasher::start`].
pub struct DomainHasher {
    inner: blake3::Hasher,
}

impl DomainHasher {
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    pub fn finalize(&self) -> ObjectId {
        ObjectId::from_hash(*self.inner.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let id1 = ContentHasher::BLOB.hash(b"hello world");
        let id2 = ContentHasher::BLOB.hash(b"hello world");
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        assert_ne!(ContentHasher::BLOB.hash(data), ContentHasher::TREE.hash(data));
    }

    #[test]
    fn domain_hash_differs_from_plain_digest() {
        assert_ne!(ContentHasher::BLOB.hash(b"x"), ObjectId::digest(b"x"));
    }

    #[test]
    fn incremental_matches_one_shot() {
        let mut hasher = ContentHasher::BLOB.start();
        hasher.update(b"hello ");
        hasher.update(b"world");
        assert_eq!(hasher.finalize(), ContentHasher::BLOB.hash(b"hello world"));
    }

    #[test]
    fn hash_reader_matches_one_shot() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let streamed = ContentHasher::BLOB.hash_reader(&data[..]).unwrap();
        assert_eq!(streamed, ContentHasher::BLOB.hash(&data));
    }

    #[test]
    fn verify_detects_tampering() {
        let id = ContentHasher::BLOB.hash(b"original");
        assert!(ContentHasher::BLOB.verify(b"original", &id));
        assert!(!ContentHasher::BLOB.verify(b"tampered", &id));
    }

    #[test]
    fn custom_domain() {
        let hasher = ContentHasher::new("my-custom-domain-v1");
        assert_eq!(hasher.domain(), "my-custom-domain-v1");
        assert_ne!(hasher.hash(b"data"), ContentHasher::BLOB.hash(b"data"));
    }
}
