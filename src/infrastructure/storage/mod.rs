mod azure_store;
mod local_store;
mod object_cache;
mod object_cache_writer;
mod store_factory;

pub use object_cache::{MetadataPlacement, ObjectCacheStore};
pub use object_cache_writer::ObjectCacheWriter;
pub use store_factory::CacheStoreFactory;
