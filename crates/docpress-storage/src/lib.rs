//! Docpress Storage Library
//!
//! This crate provides the object-storage collaborator used by the conversion pipeline:
//! the `Storage` trait plus S3 and local filesystem implementations.
//!
//! # Storage key format
//!
//! Every converted document is stored under `converted/{job_id}.pdf`. The job id is unique
//! per request, so keys never collide. Key generation lives in the `keys` module.
//!
//! Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use docpress_core::StorageBackend;
pub use factory::create_storage;
pub use keys::converted_pdf_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
