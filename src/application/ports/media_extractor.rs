use crate::domain::{TrackInfo, TrackReference};

use super::{BoxedReader, ProcessError, ProcessHandle};

/// The shapes an extractor may hand back for a track's audio.
pub enum ExtractorOutput {
    Reader(BoxedReader),
    Stream { stream: Option<BoxedReader> },
    Process(ProcessHandle),
    Sequence(Vec<BoxedReader>),
    Readable { readable: Option<BoxedReader> },
    Empty,
}

#[async_trait::async_trait]
pub trait MediaExtractor: Send + Sync {
    /// One-time tooling check shared by every request. Failures are logged,
    /// never returned.
    async fn ensure_ready(&self);

    async fn extract(&self, track: &TrackReference) -> Result<ExtractorOutput, ExtractorError>;

    async fn fetch_info(&self, track: &TrackReference) -> Result<TrackInfo, ExtractorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractorError {
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("metadata lookup failed: {0}")]
    InfoFailed(String),
    #[error("metadata could not be parsed: {0}")]
    InvalidMetadata(String),
    #[error("playlists are not supported")]
    Playlist,
}
