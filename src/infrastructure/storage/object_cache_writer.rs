use std::sync::Arc;

use bytes::Bytes;
use object_store::path::Path as StorePath;
use object_store::{MultipartUpload, ObjectStore, PutPayload};

use crate::application::ports::{CacheStoreError, CacheWriter};

const PART_SIZE: usize = 5 * 1024 * 1024;

/// Multipart upload of one cache entry.
///
/// Chunks are buffered into parts and nothing is visible under the entry's
/// key until `finish` completes the upload.
pub struct ObjectCacheWriter {
    store: Arc<dyn ObjectStore>,
    location: StorePath,
    upload: Option<Box<dyn MultipartUpload>>,
    pending: Vec<Bytes>,
    pending_len: usize,
    total_bytes: u64,
    sidecar: Option<(StorePath, Bytes)>,
}

impl ObjectCacheWriter {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        location: StorePath,
        upload: Box<dyn MultipartUpload>,
        sidecar: Option<(StorePath, Bytes)>,
    ) -> Self {
        Self {
            store,
            location,
            upload: Some(upload),
            pending: Vec::new(),
            pending_len: 0,
            total_bytes: 0,
            sidecar,
        }
    }

    async fn flush_part(&mut self) -> Result<(), CacheStoreError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let upload = self.upload.as_mut().ok_or_else(|| {
            CacheStoreError::WriteFailed(format!("upload for {} already closed", self.location))
        })?;
        let payload: PutPayload = std::mem::take(&mut self.pending).into_iter().collect();
        self.pending_len = 0;

        if let Err(e) = upload.put_part(payload).await {
            self.abort().await;
            return Err(CacheStoreError::WriteFailed(e.to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CacheWriter for ObjectCacheWriter {
    async fn write(&mut self, chunk: Bytes) -> Result<(), CacheStoreError> {
        if self.upload.is_none() {
            return Err(CacheStoreError::WriteFailed(format!(
                "upload for {} already closed",
                self.location
            )));
        }

        self.total_bytes += chunk.len() as u64;
        self.pending_len += chunk.len();
        self.pending.push(chunk);

        if self.pending_len >= PART_SIZE {
            self.flush_part().await?;
        }
        Ok(())
    }

    async fn finish(&mut self) -> Result<u64, CacheStoreError> {
        self.flush_part().await?;

        let mut upload = self.upload.take().ok_or_else(|| {
            CacheStoreError::WriteFailed(format!("upload for {} already closed", self.location))
        })?;

        if let Err(e) = upload.complete().await {
            let _ = upload.abort().await;
            return Err(CacheStoreError::WriteFailed(e.to_string()));
        }

        if let Some((path, body)) = self.sidecar.take() {
            if let Err(e) = self.store.put(&path, PutPayload::from(body)).await {
                tracing::warn!(path = %path, error = %e, "cache metadata sidecar not written");
            }
        }

        Ok(self.total_bytes)
    }

    async fn abort(&mut self) {
        self.pending.clear();
        self.pending_len = 0;
        if let Some(mut upload) = self.upload.take() {
            if let Err(e) = upload.abort().await {
                tracing::debug!(location = %self.location, error = %e, "cache upload abort failed");
            }
        }
    }
}
