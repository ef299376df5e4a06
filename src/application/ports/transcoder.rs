use super::{ProcessError, ProcessHandle};

/// Starts a filter that reads arbitrary audio on stdin and writes the target
/// format on stdout.
pub trait Transcoder: Send + Sync {
    fn start(&self) -> Result<ProcessHandle, TranscoderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscoderError {
    #[error(transparent)]
    Process(#[from] ProcessError),
}
