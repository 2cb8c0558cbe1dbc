//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The conversion pipeline only ever uploads a finished PDF and asks for a time-limited
/// link to it. Implementations are constructed once at startup and shared across requests,
/// so they must be safe for concurrent use.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload the file at `local_path` under `storage_key` and return the object's URL.
    ///
    /// The returned URL is not necessarily fetchable without credentials; use
    /// `get_presigned_url` to hand out access.
    async fn upload_file(
        &self,
        local_path: &Path,
        storage_key: &str,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Generate a presigned/temporary URL for direct access (GET)
    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
