use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use object_store::path::Path as StorePath;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStore, PutMultipartOptions};

use crate::application::ports::{ByteStream, CacheStore, CacheStoreError, CacheWriter};
use crate::domain::{CacheEntryMetadata, CacheKey};

use super::object_cache_writer::ObjectCacheWriter;

const SIDECAR_SUFFIX: &str = ".meta.json";

/// Where provenance metadata for an entry is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataPlacement {
    /// Written next to the entry as `<key>.meta.json` once the entry commits.
    Sidecar,
    /// Attached to the object itself as attributes.
    Attributes,
}

/// Cache backed by any [`ObjectStore`], keyed by `<prefix>/<key>`.
pub struct ObjectCacheStore {
    inner: Arc<dyn ObjectStore>,
    key_prefix: String,
    placement: MetadataPlacement,
}

impl ObjectCacheStore {
    pub fn new(
        inner: Arc<dyn ObjectStore>,
        key_prefix: impl Into<String>,
        placement: MetadataPlacement,
    ) -> Self {
        Self {
            inner,
            key_prefix: key_prefix.into(),
            placement,
        }
    }

    fn location(&self, key: &CacheKey) -> StorePath {
        StorePath::from(key.with_prefix(&self.key_prefix))
    }

    fn attributes(content_type: &str, metadata: &CacheEntryMetadata) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        );
        attributes.insert(
            Attribute::Metadata("source_url".into()),
            AttributeValue::from(metadata.source_url.clone()),
        );
        attributes.insert(
            Attribute::Metadata("created_at".into()),
            AttributeValue::from(metadata.created_at_rfc3339()),
        );
        attributes
    }
}

#[async_trait::async_trait]
impl CacheStore for ObjectCacheStore {
    async fn exists(&self, key: &CacheKey) -> Result<bool, CacheStoreError> {
        match self.inner.head(&self.location(key)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(CacheStoreError::Unavailable(e.to_string())),
        }
    }

    async fn open_read(&self, key: &CacheKey) -> Result<ByteStream, CacheStoreError> {
        let location = self.location(key);
        let result = self.inner.get(&location).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => CacheStoreError::NotFound(location.to_string()),
            other => CacheStoreError::ReadFailed(other.to_string()),
        })?;

        Ok(result
            .into_stream()
            .map(|chunk| chunk.map_err(io::Error::other))
            .boxed())
    }

    async fn open_write(
        &self,
        key: &CacheKey,
        content_type: &str,
        metadata: &CacheEntryMetadata,
    ) -> Result<Box<dyn CacheWriter>, CacheStoreError> {
        let location = self.location(key);

        let (opts, sidecar) = match self.placement {
            MetadataPlacement::Attributes => (
                PutMultipartOptions {
                    attributes: Self::attributes(content_type, metadata),
                    ..Default::default()
                },
                None,
            ),
            MetadataPlacement::Sidecar => {
                let body = serde_json::to_vec(metadata)
                    .map_err(|e| CacheStoreError::WriteFailed(e.to_string()))?;
                let sidecar = StorePath::from(format!("{}{}", location, SIDECAR_SUFFIX));
                (PutMultipartOptions::default(), Some((sidecar, Bytes::from(body))))
            }
        };

        let upload = self
            .inner
            .put_multipart_opts(&location, opts)
            .await
            .map_err(|e| CacheStoreError::WriteFailed(e.to_string()))?;

        Ok(Box::new(ObjectCacheWriter::new(
            Arc::clone(&self.inner),
            location,
            upload,
            sidecar,
        )))
    }
}
