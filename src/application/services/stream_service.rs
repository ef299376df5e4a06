use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use crate::application::ports::{
    BoxedReader, BoxedWriter, ByteStream, CacheStore, CacheWriter, MediaExtractor, ProcessError,
    ProcessMonitor, Transcoder,
};
use crate::domain::{
    CacheEntryMetadata, CacheKey, CacheStatus, PipelineState, TargetFormat, TrackReference,
};

use super::cached_transfer::serve_cached;
use super::fan_out::{CacheChunk, Delivery, FanOut};
use super::pipeline_request::{PipelineGuard, PipelineOutcome, PipelineRequest};
use super::stream_shape::{ResolvedAudio, resolve_readable};
use super::PipelineError;

const DEFAULT_TIMEOUT_SECS: u64 = 540;
const DEFAULT_CHANNEL_CAPACITY: usize = 32;
const DEFAULT_READ_CHUNK_SIZE: usize = 16 * 1024;
const DEFAULT_CACHE_OPEN_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub timeout: Duration,
    pub channel_capacity: usize,
    pub read_chunk_size: usize,
    /// How long the cache writer may take to open before caching is skipped.
    pub cache_open_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            cache_open_timeout: Duration::from_secs(DEFAULT_CACHE_OPEN_TIMEOUT_SECS),
        }
    }
}

/// Audio body for a single request, tagged with where it came from.
pub struct TrackStream {
    pub cache_status: CacheStatus,
    pub body: ByteStream,
}

/// Serves tracks from the cache, or transcodes them live while populating it.
pub struct StreamService {
    cache_store: Arc<dyn CacheStore>,
    extractor: Arc<dyn MediaExtractor>,
    transcoder: Arc<dyn Transcoder>,
    options: PipelineOptions,
}

impl StreamService {
    pub fn new(
        cache_store: Arc<dyn CacheStore>,
        extractor: Arc<dyn MediaExtractor>,
        transcoder: Arc<dyn Transcoder>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            cache_store,
            extractor,
            transcoder,
            options,
        }
    }

    /// Opens the audio stream for `track`.
    ///
    /// A live transcode is returned once its first chunk is ready, so a
    /// pipeline that fails before producing audio surfaces as an error here
    /// instead of as a truncated body.
    pub async fn open(
        &self,
        request_id: &str,
        track: TrackReference,
    ) -> Result<TrackStream, PipelineError> {
        transition(request_id, PipelineState::Validated);
        let key = CacheKey::for_track(&track);
        let guard = PipelineGuard::new(Arc::new(PipelineRequest::new(request_id, track, key)));
        transition(request_id, PipelineState::CacheChecking);

        if let Some(cached) = self.open_cached(guard.request()).await {
            guard.disarm();
            return Ok(cached);
        }

        self.open_live(guard).await
    }

    async fn open_cached(&self, request: &PipelineRequest) -> Option<TrackStream> {
        let (request_id, key) = (request.request_id(), request.key());
        match self.cache_store.exists(key).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(request_id = %request_id, cache_key = %key, "cache_miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    cache_key = %key,
                    error = %e,
                    "cache_check_failed"
                );
                return None;
            }
        }

        match self.cache_store.open_read(key).await {
            Ok(stream) => {
                tracing::info!(request_id = %request_id, cache_key = %key, "cache_hit");
                transition(request_id, PipelineState::ServingCached);
                Some(TrackStream {
                    cache_status: CacheStatus::Hit,
                    body: serve_cached(request_id, request.track(), stream),
                })
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    cache_key = %key,
                    error = %e,
                    "cache_read_failed"
                );
                None
            }
        }
    }

    async fn open_live(&self, guard: PipelineGuard) -> Result<TrackStream, PipelineError> {
        let request = Arc::clone(guard.request());
        let request_id = request.request_id().to_string();

        transition(&request_id, PipelineState::Extracting);
        self.extractor.ensure_ready().await;

        let output = self
            .extractor
            .extract(request.track())
            .await
            .map_err(|e| fail_early(&request, PipelineError::ExtractorStart(e)))?;
        let audio = resolve_readable(output).map_err(|e| fail_early(&request, e))?;
        tracing::debug!(request_id = %request_id, shape = audio.shape, "extractor stream resolved");

        transition(&request_id, PipelineState::Transcoding);
        let mut transcoder = self
            .transcoder
            .start()
            .map_err(|e| fail_early(&request, PipelineError::TranscoderStart(e)))?;
        let stdin = take_pipe(transcoder.stdin.take(), &transcoder.program, "stdin")
            .map_err(|e| fail_early(&request, e))?;
        let stdout = take_pipe(transcoder.stdout.take(), &transcoder.program, "stdout")
            .map_err(|e| fail_early(&request, e))?;
        let transcoder_stderr = transcoder.stderr.take();
        let transcoder_monitor = transcoder.monitor.clone();

        tracing::info!(
            request_id = %request_id,
            track_url = %request.track(),
            "stream_pipeline_start"
        );

        let cache_branch = self.open_cache_branch(&request);
        let (client_tx, mut client_rx) = mpsc::channel(self.options.channel_capacity);

        let ResolvedAudio {
            reader,
            process,
            diagnostics,
            ..
        } = audio;
        let feed = tokio::spawn(feed_transcoder(
            request_id.clone(),
            reader,
            stdin,
            process.clone(),
            self.options.read_chunk_size,
        ));
        let extractor_diagnostics = diagnostics.map(|stream| {
            let request_id = request_id.clone();
            tokio::spawn(async move {
                if let Err(e) = log_diagnostics(&request_id, "extractor_stderr", stream).await {
                    tracing::debug!(request_id = %request_id, error = %e, "extractor stderr closed");
                }
            })
            .abort_handle()
        });
        request.attach_extractor(process, feed.abort_handle(), extractor_diagnostics);

        let transcoder_diagnostics = transcoder_stderr.map(|stream| {
            let request = Arc::clone(&request);
            tokio::spawn(async move {
                if let Err(e) =
                    log_diagnostics(request.request_id(), "transcoder_stderr", stream).await
                {
                    request.finalize(PipelineOutcome::Failed(PipelineError::TranscoderOutput(
                        format!("stderr: {}", e),
                    )));
                }
            })
            .abort_handle()
        });
        request.attach_transcoder(transcoder_monitor.clone(), transcoder_diagnostics);

        transition(&request_id, PipelineState::Streaming);
        tokio::spawn(drive(
            Arc::clone(&request),
            stdout,
            FanOut::new(client_tx, Some(cache_branch)),
            feed,
            transcoder_monitor,
            self.options,
        ));

        match client_rx.recv().await {
            Some(first) => Ok(TrackStream {
                cache_status: CacheStatus::Miss,
                body: live_body(Some(first), client_rx, guard.disarm()),
            }),
            None => match request.take_failure() {
                Some(error) => Err(error),
                None => Ok(TrackStream {
                    cache_status: CacheStatus::Miss,
                    body: live_body(None, client_rx, guard.disarm()),
                }),
            },
        }
    }

    /// Starts the cache writer in the background.
    ///
    /// The writer is opened inside its own task so a slow backend never holds
    /// up the client. If it cannot be opened in time the receiver is dropped
    /// and the fan-out detaches the branch on its next send.
    fn open_cache_branch(&self, request: &PipelineRequest) -> mpsc::Sender<CacheChunk> {
        let (tx, rx) = mpsc::channel(self.options.channel_capacity);
        tokio::spawn(write_cache(
            Arc::clone(&self.cache_store),
            request.request_id().to_string(),
            request.key().clone(),
            CacheEntryMetadata::new(request.track()),
            self.options.cache_open_timeout,
            rx,
        ));
        tx
    }
}

fn transition(request_id: &str, state: PipelineState) {
    tracing::debug!(request_id = %request_id, state = %state, "pipeline state transition");
}

/// Finalizes a request that failed before streaming and hands the error back.
fn fail_early(request: &PipelineRequest, error: PipelineError) -> PipelineError {
    request.finalize(PipelineOutcome::Failed(error));
    request
        .take_failure()
        .unwrap_or_else(|| PipelineError::Internal("pipeline already torn down".into()))
}

fn take_pipe<T>(pipe: Option<T>, program: &str, name: &'static str) -> Result<T, PipelineError> {
    pipe.ok_or_else(|| {
        PipelineError::TranscoderStart(
            ProcessError::MissingPipe {
                program: program.to_string(),
                pipe: name,
            }
            .into(),
        )
    })
}

/// Copies extractor audio into the transcoder, then closes its stdin.
async fn feed_transcoder(
    request_id: String,
    mut reader: BoxedReader,
    mut stdin: BoxedWriter,
    extractor: Option<ProcessMonitor>,
    chunk_size: usize,
) -> Result<(), PipelineError> {
    let mut buffer = vec![0u8; chunk_size];
    loop {
        let read = reader
            .read(&mut buffer)
            .await
            .map_err(|e| PipelineError::ExtractorStream(e.to_string()))?;
        if read == 0 {
            break;
        }
        stdin
            .write_all(&buffer[..read])
            .await
            .map_err(|e| PipelineError::TranscoderInput(e.to_string()))?;
    }

    tracing::info!(request_id = %request_id, "extractor_stream_closed");
    if let Err(e) = stdin.shutdown().await {
        tracing::debug!(request_id = %request_id, error = %e, "transcoder stdin shutdown failed");
    }
    drop(stdin);

    // A truncated download still ends the stream cleanly; only the exit status tells.
    if let Some(extractor) = extractor {
        let exit = extractor.wait().await;
        if !exit.success() {
            return Err(PipelineError::ExtractorExit(exit));
        }
    }

    Ok(())
}

async fn log_diagnostics(
    request_id: &str,
    source: &'static str,
    stream: BoxedReader,
) -> io::Result<()> {
    let mut lines = BufReader::new(stream).split(b'\n');
    while let Some(line) = lines.next_segment().await? {
        let line = String::from_utf8_lossy(&line);
        let line = line.trim_end();
        if !line.is_empty() {
            tracing::debug!(request_id = %request_id, line = %line, "{}", source);
        }
    }
    Ok(())
}

async fn write_cache(
    store: Arc<dyn CacheStore>,
    request_id: String,
    key: CacheKey,
    metadata: CacheEntryMetadata,
    open_timeout: Duration,
    mut chunks: mpsc::Receiver<CacheChunk>,
) {
    let opened = tokio::time::timeout(
        open_timeout,
        store.open_write(&key, TargetFormat::CONTENT_TYPE, &metadata),
    )
    .await;
    let mut writer: Box<dyn CacheWriter> = match opened {
        Ok(Ok(writer)) => writer,
        Ok(Err(e)) => {
            tracing::warn!(
                request_id = %request_id,
                cache_key = %key,
                error = %e,
                "cache_write_failed"
            );
            return;
        }
        Err(_) => {
            tracing::warn!(
                request_id = %request_id,
                cache_key = %key,
                timeout_ms = open_timeout.as_millis() as u64,
                "cache_write_failed"
            );
            return;
        }
    };

    while let Some(chunk) = chunks.recv().await {
        match chunk {
            CacheChunk::Data(bytes) => {
                if let Err(e) = writer.write(bytes).await {
                    tracing::warn!(
                        request_id = %request_id,
                        cache_key = %key,
                        error = %e,
                        "cache_write_failed"
                    );
                    drop(chunks);
                    writer.abort().await;
                    return;
                }
            }
            CacheChunk::End => {
                match writer.finish().await {
                    Ok(bytes) => tracing::info!(
                        request_id = %request_id,
                        cache_key = %key,
                        bytes,
                        "cache_write_completed"
                    ),
                    Err(e) => tracing::warn!(
                        request_id = %request_id,
                        cache_key = %key,
                        error = %e,
                        "cache_write_failed"
                    ),
                }
                return;
            }
        }
    }

    tracing::debug!(request_id = %request_id, cache_key = %key, "cache write abandoned");
    writer.abort().await;
}

enum PumpEvent {
    Fed(Result<(), PipelineError>),
    Read(io::Result<usize>),
}

/// Owns the transcoder output until the pipeline reaches a terminal outcome.
async fn drive(
    request: Arc<PipelineRequest>,
    stdout: BoxedReader,
    mut fan_out: FanOut,
    feed: JoinHandle<Result<(), PipelineError>>,
    transcoder: ProcessMonitor,
    options: PipelineOptions,
) {
    let shutdown = request.shutdown_token();
    let client = fan_out.client_watch();

    let outcome = tokio::select! {
        biased;
        _ = shutdown.cancelled() => return,
        _ = client.closed() => PipelineOutcome::ClientDisconnected,
        _ = tokio::time::sleep(options.timeout) => {
            PipelineOutcome::Failed(PipelineError::Timeout(options.timeout))
        }
        outcome = pump(&request, stdout, &mut fan_out, feed, &transcoder, options.read_chunk_size) => outcome,
    };

    if matches!(outcome, PipelineOutcome::Completed) {
        if fan_out.is_caching() {
            fan_out.complete().await;
        } else {
            tracing::debug!(
                request_id = %request.request_id(),
                cache_key = %request.key(),
                "cache branch detached, entry not committed"
            );
        }
    }
    request.finalize(outcome);
}

async fn pump(
    request: &PipelineRequest,
    mut stdout: BoxedReader,
    fan_out: &mut FanOut,
    mut feed: JoinHandle<Result<(), PipelineError>>,
    transcoder: &ProcessMonitor,
    chunk_size: usize,
) -> PipelineOutcome {
    let mut buffer = vec![0u8; chunk_size];
    let mut fed = false;

    loop {
        let event = tokio::select! {
            joined = &mut feed, if !fed => PumpEvent::Fed(flatten_feed(joined)),
            read = stdout.read(&mut buffer) => PumpEvent::Read(read),
        };

        match event {
            PumpEvent::Fed(Ok(())) => fed = true,
            PumpEvent::Fed(Err(e)) => return PipelineOutcome::Failed(e),
            PumpEvent::Read(Ok(0)) => break,
            PumpEvent::Read(Ok(read)) => {
                let chunk = Bytes::copy_from_slice(&buffer[..read]);
                if fan_out.deliver(chunk).await == Delivery::ClientGone {
                    return PipelineOutcome::ClientDisconnected;
                }
                request.record_sent(read);
            }
            PumpEvent::Read(Err(e)) => {
                return PipelineOutcome::Failed(PipelineError::TranscoderOutput(e.to_string()));
            }
        }
    }

    if !fed {
        if let Err(e) = flatten_feed(feed.await) {
            return PipelineOutcome::Failed(e);
        }
    }

    let exit = transcoder.wait().await;
    tracing::info!(
        request_id = %request.request_id(),
        code = ?exit.code(),
        status = %exit,
        "transcoder_exit"
    );

    if exit.success() {
        PipelineOutcome::Completed
    } else {
        PipelineOutcome::Failed(PipelineError::TranscoderExit(exit))
    }
}

fn flatten_feed(joined: Result<Result<(), PipelineError>, JoinError>) -> Result<(), PipelineError> {
    match joined {
        Ok(result) => result,
        Err(e) => Err(PipelineError::Internal(format!("extractor feed task: {}", e))),
    }
}

fn live_body(
    first: Option<Bytes>,
    mut chunks: mpsc::Receiver<Bytes>,
    request: Arc<PipelineRequest>,
) -> ByteStream {
    Box::pin(async_stream::stream! {
        if let Some(chunk) = first {
            yield Ok(chunk);
        }
        while let Some(chunk) = chunks.recv().await {
            yield Ok(chunk);
        }
        if let Some(error) = request.take_failure() {
            yield Err(io::Error::other(error.to_string()));
        }
    })
}
