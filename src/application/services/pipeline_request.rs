use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::ProcessMonitor;
use crate::domain::{CacheKey, PipelineState, TrackReference};

use super::PipelineError;

/// How a live pipeline ended.
#[derive(Debug)]
pub enum PipelineOutcome {
    Completed,
    ClientDisconnected,
    Failed(PipelineError),
}

/// State of one live transcode, shared by the tasks that serve it.
///
/// `finalize` is the only teardown path. It runs once no matter how many
/// stages report completion or failure.
pub struct PipelineRequest {
    request_id: String,
    track: TrackReference,
    key: CacheKey,
    started: Instant,
    bytes_sent: AtomicU64,
    finalized: AtomicBool,
    shutdown: CancellationToken,
    failure: Mutex<Option<PipelineError>>,
    resources: Mutex<PipelineResources>,
}

#[derive(Default)]
struct PipelineResources {
    extractor: Option<ProcessMonitor>,
    feed: Option<AbortHandle>,
    extractor_diagnostics: Option<AbortHandle>,
    transcoder: Option<ProcessMonitor>,
    transcoder_diagnostics: Option<AbortHandle>,
}

impl PipelineResources {
    fn release(self) {
        if let Some(feed) = self.feed {
            feed.abort();
        }
        if let Some(diagnostics) = self.extractor_diagnostics {
            diagnostics.abort();
        }
        if let Some(extractor) = self.extractor {
            if !extractor.has_exited() {
                extractor.kill();
            }
        }
        if let Some(transcoder) = self.transcoder {
            if !transcoder.has_exited() {
                if let Some(diagnostics) = self.transcoder_diagnostics {
                    diagnostics.abort();
                }
                transcoder.kill();
            }
        }
    }
}

impl PipelineRequest {
    pub fn new(request_id: impl Into<String>, track: TrackReference, key: CacheKey) -> Self {
        Self {
            request_id: request_id.into(),
            track,
            key,
            started: Instant::now(),
            bytes_sent: AtomicU64::new(0),
            finalized: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            failure: Mutex::new(None),
            resources: Mutex::new(PipelineResources::default()),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn track(&self) -> &TrackReference {
        &self.track
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn attach_extractor(
        &self,
        process: Option<ProcessMonitor>,
        feed: AbortHandle,
        diagnostics: Option<AbortHandle>,
    ) {
        let mut resources = self.lock_resources();
        resources.extractor = process;
        resources.feed = Some(feed);
        resources.extractor_diagnostics = diagnostics;
    }

    pub fn attach_transcoder(&self, monitor: ProcessMonitor, diagnostics: Option<AbortHandle>) {
        let mut resources = self.lock_resources();
        resources.transcoder = Some(monitor);
        resources.transcoder_diagnostics = diagnostics;
    }

    pub fn record_sent(&self, bytes: usize) {
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }

    /// Cancelled as soon as teardown starts.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Hands the recorded failure to whoever surfaces it to the client.
    pub fn take_failure(&self) -> Option<PipelineError> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Runs teardown. Returns `false` when it had already run.
    pub fn finalize(&self, outcome: PipelineOutcome) -> bool {
        if self
            .finalized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(request_id = %self.request_id, "teardown already ran");
            return false;
        }

        let failure = match outcome {
            PipelineOutcome::Failed(error) => {
                let summary = (error.step(), error.to_string());
                *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
                Some(summary)
            }
            PipelineOutcome::ClientDisconnected => Some(("client", "client disconnected".into())),
            PipelineOutcome::Completed => None,
        };

        self.shutdown.cancel();

        let resources = std::mem::take(&mut *self.lock_resources());
        resources.release();

        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let bytes_sent = self.bytes_sent();
        match failure {
            None => tracing::info!(
                request_id = %self.request_id,
                track_url = %self.track,
                state = %PipelineState::Finalized,
                cache = "MISS",
                elapsed_ms,
                bytes_sent,
                "stream_request_completed"
            ),
            Some(("client", error)) => tracing::warn!(
                request_id = %self.request_id,
                track_url = %self.track,
                state = %PipelineState::Failed,
                step = "client",
                error = %error,
                elapsed_ms,
                bytes_sent,
                "stream_request_failed"
            ),
            Some((step, error)) => tracing::error!(
                request_id = %self.request_id,
                track_url = %self.track,
                state = %PipelineState::Failed,
                step,
                error = %error,
                elapsed_ms,
                bytes_sent,
                "stream_request_failed"
            ),
        }

        true
    }

    fn lock_resources(&self) -> MutexGuard<'_, PipelineResources> {
        self.resources.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds a request while it is being opened.
///
/// Dropping an armed guard means the caller went away before the body was
/// handed over, which is finalized as a client disconnect.
pub struct PipelineGuard {
    request: Arc<PipelineRequest>,
    armed: bool,
}

impl PipelineGuard {
    pub fn new(request: Arc<PipelineRequest>) -> Self {
        Self {
            request,
            armed: true,
        }
    }

    pub fn request(&self) -> &Arc<PipelineRequest> {
        &self.request
    }

    /// Hands ownership of teardown to whoever serves the body.
    pub fn disarm(mut self) -> Arc<PipelineRequest> {
        self.armed = false;
        Arc::clone(&self.request)
    }
}

impl Drop for PipelineGuard {
    fn drop(&mut self) {
        if self.armed && !self.request.is_finalized() {
            self.request.finalize(PipelineOutcome::ClientDisconnected);
        }
    }
}
