//! Storage abstraction traits
//!
//! The backup pipeline only needs to write one object once and later open it
//! for reading. Both capabilities live here so alternative providers can be
//! plugged in without touching the pipeline.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Finalizing upload failed: {0}")]
    FinalizeFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object name: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunks of an object being read back.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Write side of a single remote object.
///
/// Bytes passed to [`ObjectSink::write`] are appended in order. The object is
/// not guaranteed to exist, or to be readable, until [`ObjectSink::finish`]
/// returns `Ok`. Dropping a sink without finishing it abandons the upload.
#[async_trait]
pub trait ObjectSink: Send {
    async fn write(&mut self, chunk: &[u8]) -> StorageResult<()>;

    /// Flush buffered bytes and make the object durable.
    async fn finish(self: Box<Self>) -> StorageResult<()>;
}

/// A bucket of named objects.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Name of the bucket (or equivalent container) objects are stored in.
    fn bucket(&self) -> &str;

    /// Open a write sink for `name`, replacing any existing object once finished.
    async fn writer(&self, name: &str) -> StorageResult<Box<dyn ObjectSink>>;

    /// Open `name` for reading.
    ///
    /// Returns `StorageError::NotFound` when the object does not exist.
    async fn reader(&self, name: &str) -> StorageResult<ByteStream>;

    /// Read a whole object into memory.
    async fn read_bytes(&self, name: &str) -> StorageResult<Bytes> {
        let mut stream = self.reader(name).await?;
        let mut buf = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}
