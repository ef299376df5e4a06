use std::time::Duration;

use crate::application::ports::{ExtractorError, ProcessExit, TranscoderError};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("unable to start extractor: {0}")]
    ExtractorStart(#[source] ExtractorError),
    #[error("extractor returned an unsupported stream type")]
    UnsupportedStreamShape,
    #[error("unable to start transcoder: {0}")]
    TranscoderStart(#[source] TranscoderError),
    #[error("extractor stream failed: {0}")]
    ExtractorStream(String),
    #[error("extractor finished with {0}")]
    ExtractorExit(ProcessExit),
    #[error("transcoder input failed: {0}")]
    TranscoderInput(String),
    #[error("transcoder output failed: {0}")]
    TranscoderOutput(String),
    #[error("transcoder finished with {0}")]
    TranscoderExit(ProcessExit),
    #[error("pipeline exceeded {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("internal pipeline fault: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Stage label used in failure events.
    pub fn step(&self) -> &'static str {
        match self {
            PipelineError::ExtractorStart(_) | PipelineError::UnsupportedStreamShape => "extractor",
            PipelineError::ExtractorStream(_) | PipelineError::ExtractorExit(_) => {
                "extractor_stream"
            }
            PipelineError::TranscoderStart(_) => "transcoder",
            PipelineError::TranscoderInput(_)
            | PipelineError::TranscoderOutput(_)
            | PipelineError::TranscoderExit(_) => "transcoder_stream",
            PipelineError::Timeout(_) => "timeout",
            PipelineError::Internal(_) => "internal",
        }
    }
}
