use std::time::Instant;

use futures::StreamExt;

use crate::application::ports::ByteStream;
use crate::domain::TrackReference;

/// Wraps a cache read so the request logs exactly one terminal event,
/// including when the client hangs up mid-transfer.
pub fn serve_cached(request_id: &str, track: &TrackReference, stream: ByteStream) -> ByteStream {
    let mut transfer = CachedTransfer {
        request_id: request_id.to_string(),
        track_url: track.as_str().to_string(),
        started: Instant::now(),
        bytes_sent: 0,
        finished: false,
    };

    Box::pin(async_stream::stream! {
        let mut stream = stream;
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    transfer.bytes_sent += chunk.len() as u64;
                    yield Ok(chunk);
                }
                Err(error) => {
                    transfer.fail(&error.to_string());
                    yield Err(error);
                    return;
                }
            }
        }
        transfer.complete();
    })
}

struct CachedTransfer {
    request_id: String,
    track_url: String,
    started: Instant,
    bytes_sent: u64,
    finished: bool,
}

impl CachedTransfer {
    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn complete(&mut self) {
        self.finished = true;
        tracing::info!(
            request_id = %self.request_id,
            track_url = %self.track_url,
            cache = "HIT",
            elapsed_ms = self.elapsed_ms(),
            bytes_sent = self.bytes_sent,
            "stream_request_completed"
        );
    }

    fn fail(&mut self, error: &str) {
        self.finished = true;
        tracing::error!(
            request_id = %self.request_id,
            track_url = %self.track_url,
            cache = "HIT",
            step = "cache_read",
            error = %error,
            elapsed_ms = self.elapsed_ms(),
            bytes_sent = self.bytes_sent,
            "stream_request_failed"
        );
    }
}

impl Drop for CachedTransfer {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(
                request_id = %self.request_id,
                track_url = %self.track_url,
                cache = "HIT",
                step = "client",
                error = "client disconnected",
                elapsed_ms = self.elapsed_ms(),
                bytes_sent = self.bytes_sent,
                "stream_request_failed"
            );
        }
    }
}
