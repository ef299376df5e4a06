use std::sync::Arc;

use crate::application::ports::{ProcessHandle, ProcessSpawner, Transcoder, TranscoderError};
use crate::domain::TargetFormat;

pub struct FfmpegTranscoder {
    spawner: Arc<dyn ProcessSpawner>,
    program: String,
}

impl FfmpegTranscoder {
    pub fn new(spawner: Arc<dyn ProcessSpawner>, program: impl Into<String>) -> Self {
        Self {
            spawner,
            program: program.into(),
        }
    }

    /// Reads any container from stdin and writes raw mono DFPWM to stdout.
    pub fn arguments() -> Vec<String> {
        vec![
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            "pipe:0".to_string(),
            "-f".to_string(),
            TargetFormat::CODEC.to_string(),
            "-ar".to_string(),
            TargetFormat::SAMPLE_RATE.to_string(),
            "-ac".to_string(),
            TargetFormat::CHANNELS.to_string(),
            "pipe:1".to_string(),
        ]
    }
}

impl Transcoder for FfmpegTranscoder {
    fn start(&self) -> Result<ProcessHandle, TranscoderError> {
        let handle = self.spawner.spawn(&self.program, &Self::arguments())?;
        Ok(handle)
    }
}
