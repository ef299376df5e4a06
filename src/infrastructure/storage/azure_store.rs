use std::sync::Arc;

use object_store::azure::MicrosoftAzureBuilder;

use crate::application::ports::CacheStoreError;

use super::object_cache::{MetadataPlacement, ObjectCacheStore};

impl ObjectCacheStore {
    /// Cache entries as block blobs carrying their provenance as metadata.
    pub fn azure(
        account: &str,
        access_key: &str,
        container: &str,
        key_prefix: &str,
    ) -> Result<Self, CacheStoreError> {
        let store = MicrosoftAzureBuilder::new()
            .with_account(account)
            .with_access_key(access_key)
            .with_container_name(container)
            .build()
            .map_err(|e| CacheStoreError::Misconfigured(e.to_string()))?;

        tracing::info!(account, container, key_prefix, "using azure cache store");
        Ok(Self::new(
            Arc::new(store),
            key_prefix,
            MetadataPlacement::Attributes,
        ))
    }
}
