mod cache_entry;
mod cache_key;
mod cache_status;
mod pipeline_state;
mod target_format;
mod track_info;
mod track_reference;

pub use cache_entry::CacheEntryMetadata;
pub use cache_key::CacheKey;
pub use cache_status::CacheStatus;
pub use pipeline_state::PipelineState;
pub use target_format::TargetFormat;
pub use track_info::{TrackInfo, format_timestamp};
pub use track_reference::{TrackReference, TrackReferenceError};
