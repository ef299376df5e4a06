use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{CacheStore, CacheStoreError};
use crate::presentation::config::{CacheProviderSetting, CacheSettings};

use super::object_cache::ObjectCacheStore;

pub struct CacheStoreFactory;

impl CacheStoreFactory {
    pub fn create(settings: &CacheSettings) -> Result<Arc<dyn CacheStore>, CacheStoreError> {
        match settings.provider {
            CacheProviderSetting::Local => {
                let path = PathBuf::from(&settings.local_path);
                let store = ObjectCacheStore::local(path)?;
                Ok(Arc::new(store))
            }
            CacheProviderSetting::Azure => {
                let account = settings.azure_account.as_deref().ok_or_else(|| {
                    CacheStoreError::Misconfigured("azure_account required".into())
                })?;
                let key = settings.azure_access_key.as_deref().ok_or_else(|| {
                    CacheStoreError::Misconfigured("azure_access_key required".into())
                })?;
                let container = settings.azure_container.as_deref().ok_or_else(|| {
                    CacheStoreError::Misconfigured("azure_container required".into())
                })?;
                let store = ObjectCacheStore::azure(account, key, container, &settings.key_prefix)?;
                Ok(Arc::new(store))
            }
        }
    }
}
