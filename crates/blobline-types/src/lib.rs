//! Foundation types for Blobline.
//!
//! Every other Blobline crate depends on `blobline-types` for the
//! content-addressed [`ObjectId`] that names stored objects.

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::ObjectId;
