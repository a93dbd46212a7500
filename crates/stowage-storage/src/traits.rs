//! Storage abstraction trait
//!
//! This module defines the Storage trait the HTTP layer talks to. Handlers
//! only ever see `Arc<dyn Storage>`.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;
use stowage_core::validation::KeyError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(#[from] KeyError),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Storage key already exists: {0}")]
    KeyExists(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Insufficient storage space: {0}")]
    InsufficientSpace(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked byte stream returned by [`Storage::get_stream`]
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Upload store abstraction
///
/// A flat mapping from storage key to immutable bytes. Every method validates
/// the key before touching the backend and fails with
/// [`StorageError::InvalidKey`] otherwise.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `key`.
    ///
    /// Readers observe either no entry or the complete content. Fails with
    /// [`StorageError::KeyExists`] if `key` is already taken; existing content
    /// is never overwritten.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Read the full content stored under `key`
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Read the content under `key` as a stream of chunks (for large files)
    async fn get_stream(&self, key: &str) -> StorageResult<ByteStream>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get the size in bytes of an entry, if it exists.
    async fn content_length(&self, key: &str) -> StorageResult<u64>;

    /// Remove temporary files left behind by interrupted writes. Only files
    /// untouched for at least `older_than` are removed, so writes still in
    /// progress in another process survive. Returns the number removed.
    async fn sweep_temp_files(&self, older_than: Duration) -> StorageResult<usize>;

    /// Verify the backend can currently accept writes
    async fn health_check(&self) -> StorageResult<()>;
}
