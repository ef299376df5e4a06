use std::sync::Arc;

use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::OnceCell;

use crate::application::ports::{
    ExtractorError, ExtractorOutput, MediaExtractor, ProcessError, ProcessSpawner,
};
use crate::domain::{TrackInfo, TrackReference};

/// yt-dlp driven extractor.
pub struct YtDlpExtractor {
    spawner: Arc<dyn ProcessSpawner>,
    program: String,
    readiness: OnceCell<bool>,
}

impl YtDlpExtractor {
    pub fn new(spawner: Arc<dyn ProcessSpawner>, program: impl Into<String>) -> Self {
        Self {
            spawner,
            program: program.into(),
            readiness: OnceCell::new(),
        }
    }

    pub fn stream_arguments(track: &TrackReference) -> Vec<String> {
        vec![
            "-f".to_string(),
            "bestaudio".to_string(),
            "-o".to_string(),
            "-".to_string(),
            "--no-playlist".to_string(),
            "--quiet".to_string(),
            track.as_str().to_string(),
        ]
    }

    pub fn info_arguments(track: &TrackReference) -> Vec<String> {
        vec![
            "-J".to_string(),
            "--no-warnings".to_string(),
            track.as_str().to_string(),
        ]
    }

    async fn probe_version(&self) -> bool {
        let args = vec!["--version".to_string()];
        let handle = match self.spawner.spawn(&self.program, &args) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(program = %self.program, error = %e, "extractor readiness check failed");
                return false;
            }
        };

        let version = read_all(handle.stdout).await.unwrap_or_default();
        let exit = handle.monitor.wait().await;
        if exit.success() {
            tracing::info!(
                program = %self.program,
                version = %String::from_utf8_lossy(&version).trim(),
                "extractor ready"
            );
            true
        } else {
            tracing::error!(program = %self.program, status = %exit, "extractor readiness check failed");
            false
        }
    }
}

#[async_trait::async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn ensure_ready(&self) {
        self.readiness
            .get_or_init(|| self.probe_version())
            .await;
    }

    async fn extract(&self, track: &TrackReference) -> Result<ExtractorOutput, ExtractorError> {
        let mut handle = self
            .spawner
            .spawn(&self.program, &Self::stream_arguments(track))?;
        // Nothing is fed to the extractor.
        handle.stdin = None;
        Ok(ExtractorOutput::Process(handle))
    }

    async fn fetch_info(&self, track: &TrackReference) -> Result<TrackInfo, ExtractorError> {
        let mut handle = self
            .spawner
            .spawn(&self.program, &Self::info_arguments(track))?;
        handle.stdin = None;

        let stdout = handle.stdout.take().ok_or_else(|| ProcessError::MissingPipe {
            program: self.program.clone(),
            pipe: "stdout",
        })?;
        let stderr = handle.stderr.take();

        let (stdout, stderr) = tokio::join!(read_all(Some(stdout)), read_all(stderr));
        let stdout = stdout.map_err(|e| ExtractorError::InfoFailed(e.to_string()))?;
        let exit = handle.monitor.wait().await;

        if !exit.success() {
            let stderr = stderr.unwrap_or_default();
            let reason = String::from_utf8_lossy(&stderr).trim().to_string();
            let reason = if reason.is_empty() {
                exit.to_string()
            } else {
                reason
            };
            return Err(ExtractorError::InfoFailed(reason));
        }

        parse_track_info(&stdout)
    }
}

async fn read_all<R>(reader: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buffer).await?;
    }
    Ok(buffer)
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    #[serde(rename = "_type")]
    kind: Option<String>,
    title: Option<String>,
    fulltitle: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    duration: Option<serde_json::Value>,
    duration_seconds: Option<serde_json::Value>,
}

/// Parses yt-dlp `-J` output into a [`TrackInfo`].
pub fn parse_track_info(raw: &[u8]) -> Result<TrackInfo, ExtractorError> {
    let info: RawInfo =
        serde_json::from_slice(raw).map_err(|e| ExtractorError::InvalidMetadata(e.to_string()))?;

    if info.kind.as_deref() == Some("playlist") {
        return Err(ExtractorError::Playlist);
    }

    let duration = [&info.duration, &info.duration_seconds]
        .into_iter()
        .flatten()
        .find(|value| !value.is_null())
        .and_then(as_seconds)
        .filter(|seconds| seconds.is_finite())
        .unwrap_or(0.0);

    Ok(TrackInfo {
        title: first_non_empty(info.title, info.fulltitle),
        channel: first_non_empty(info.channel, info.uploader),
        duration_seconds: duration,
    })
}

fn as_seconds(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn first_non_empty(primary: Option<String>, fallback: Option<String>) -> String {
    primary
        .filter(|value| !value.is_empty())
        .or(fallback.filter(|value| !value.is_empty()))
        .unwrap_or_default()
}
