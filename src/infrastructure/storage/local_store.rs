use std::path::PathBuf;
use std::sync::Arc;

use object_store::local::LocalFileSystem;

use crate::application::ports::CacheStoreError;

use super::object_cache::{MetadataPlacement, ObjectCacheStore};

impl ObjectCacheStore {
    /// Cache entries as files directly under `base_path`, each with a JSON sidecar.
    pub fn local(base_path: PathBuf) -> Result<Self, CacheStoreError> {
        std::fs::create_dir_all(&base_path).map_err(CacheStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(&base_path)
            .map_err(|e| CacheStoreError::Misconfigured(e.to_string()))?;

        tracing::info!(path = %base_path.display(), "using local cache store");
        Ok(Self::new(Arc::new(fs), "", MetadataPlacement::Sidecar))
    }
}
