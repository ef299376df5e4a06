use axum::body::Body;
use axum::extract::{Extension, Query, State};
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::domain::{CacheStatus, TargetFormat};
use crate::infrastructure::observability::RequestId;
use crate::presentation::state::AppState;

use super::TrackQuery;
use super::error::error_response;

pub const X_CACHE_HEADER: &str = "x-cache";

const CACHED_CONTROL: &str = "public, max-age=31536000, immutable";
const LIVE_CONTROL: &str = "no-store";

#[tracing::instrument(skip_all, fields(request_id = %request_id.as_str()))]
pub async fn stream_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<TrackQuery>,
) -> Response {
    tracing::info!(
        request_id = %request_id.as_str(),
        track = query.track.as_deref().unwrap_or_default(),
        "stream_request_received"
    );

    let track = match query.resolve(request_id.as_str()) {
        Ok(track) => track,
        Err(response) => return response,
    };

    match state.stream_service.open(request_id.as_str(), track).await {
        Ok(stream) => {
            let cache_control = match stream.cache_status {
                CacheStatus::Hit => CACHED_CONTROL,
                CacheStatus::Miss => LIVE_CONTROL,
            };
            let headers = [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(TargetFormat::CONTENT_TYPE),
                ),
                (
                    HeaderName::from_static(X_CACHE_HEADER),
                    HeaderValue::from_static(stream.cache_status.as_str()),
                ),
                (header::CACHE_CONTROL, HeaderValue::from_static(cache_control)),
            ];
            (StatusCode::OK, headers, Body::from_stream(stream.body)).into_response()
        }
        // Already logged as the request's terminal event.
        Err(e) => error_response(e.status_code(), e.to_string()),
    }
}
