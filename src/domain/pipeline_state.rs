use std::fmt;

/// Lifecycle of a single stream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Received,
    Validated,
    CacheChecking,
    ServingCached,
    Extracting,
    Transcoding,
    Streaming,
    Finalized,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Received => "RECEIVED",
            PipelineState::Validated => "VALIDATED",
            PipelineState::CacheChecking => "CACHE_CHECKING",
            PipelineState::ServingCached => "SERVING_CACHED",
            PipelineState::Extracting => "EXTRACTING",
            PipelineState::Transcoding => "TRANSCODING",
            PipelineState::Streaming => "STREAMING",
            PipelineState::Finalized => "FINALIZED",
            PipelineState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
