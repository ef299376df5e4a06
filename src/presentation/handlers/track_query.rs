use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;

use crate::domain::TrackReference;

use super::error::error_response;

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub track: Option<String>,
}

impl TrackQuery {
    /// Resolves the `track` parameter, answering 400 when it is absent or invalid.
    pub fn resolve(&self, request_id: &str) -> Result<TrackReference, Response> {
        let raw = match self.track.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                tracing::warn!(request_id = %request_id, reason = "missing_track", "stream_request_rejected");
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    "Missing track query parameter",
                ));
            }
        };

        TrackReference::resolve(raw).map_err(|e| {
            tracing::warn!(
                request_id = %request_id,
                reason = "invalid_track",
                error = %e,
                "stream_request_rejected"
            );
            error_response(StatusCode::BAD_REQUEST, "Invalid track identifier")
        })
    }
}
