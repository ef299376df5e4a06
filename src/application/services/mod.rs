mod cached_transfer;
mod fan_out;
mod info_service;
mod pipeline_error;
mod pipeline_request;
mod stream_service;
mod stream_shape;

pub use cached_transfer::serve_cached;
pub use fan_out::{CacheChunk, Delivery, FanOut};
pub use info_service::InfoService;
pub use pipeline_error::PipelineError;
pub use pipeline_request::{PipelineGuard, PipelineOutcome, PipelineRequest};
pub use stream_service::{PipelineOptions, StreamService, TrackStream};
pub use stream_shape::{ResolvedAudio, resolve_readable};
