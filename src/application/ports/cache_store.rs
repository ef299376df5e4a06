use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::{CacheEntryMetadata, CacheKey};

pub type ByteStream = BoxStream<'static, Result<Bytes, io::Error>>;

/// Content-addressed blob store holding transcoded tracks.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn exists(&self, key: &CacheKey) -> Result<bool, CacheStoreError>;

    async fn open_read(&self, key: &CacheKey) -> Result<ByteStream, CacheStoreError>;

    async fn open_write(
        &self,
        key: &CacheKey,
        content_type: &str,
        metadata: &CacheEntryMetadata,
    ) -> Result<Box<dyn CacheWriter>, CacheStoreError>;
}

/// Staged upload of a single entry. Nothing becomes visible before `finish`.
#[async_trait::async_trait]
pub trait CacheWriter: Send {
    async fn write(&mut self, chunk: Bytes) -> Result<(), CacheStoreError>;

    /// Commits the entry and returns the number of bytes persisted.
    async fn finish(&mut self) -> Result<u64, CacheStoreError>;

    async fn abort(&mut self);
}

#[derive(Debug, thiserror::Error)]
pub enum CacheStoreError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache entry not found: {0}")]
    NotFound(String),
    #[error("cache read failed: {0}")]
    ReadFailed(String),
    #[error("cache write failed: {0}")]
    WriteFailed(String),
    #[error("cache configuration invalid: {0}")]
    Misconfigured(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
