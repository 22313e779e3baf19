//! Hashing primitives for Blobline.
//!
//! Object identifiers are domain-separated BLAKE3 digests: the object kind
//! is mixed into the hash so that a blob and a tree with identical bytes
//! never share an ID.

pub mod hasher;

pub use hasher::{ContentHasher, DomainHasher};
