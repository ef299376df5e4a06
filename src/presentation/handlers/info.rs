use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::TrackInfo;
use crate::infrastructure::observability::RequestId;
use crate::presentation::state::AppState;

use super::TrackQuery;
use super::error::error_response;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub title: String,
    pub channel: String,
    pub duration_seconds: f64,
    pub duration_formatted: String,
}

impl From<TrackInfo> for InfoResponse {
    fn from(info: TrackInfo) -> Self {
        let duration_formatted = info.duration_formatted();
        Self {
            title: info.title,
            channel: info.channel,
            duration_seconds: info.duration_seconds,
            duration_formatted,
        }
    }
}

#[tracing::instrument(skip_all, fields(request_id = %request_id.as_str()))]
pub async fn info_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<TrackQuery>,
) -> Response {
    let track = match query.resolve(request_id.as_str()) {
        Ok(track) => track,
        Err(response) => return response,
    };

    match state.info_service.describe(&track).await {
        Ok(info) => {
            tracing::info!(
                request_id = %request_id.as_str(),
                track_url = %track,
                title = %info.title,
                channel = %info.channel,
                duration_seconds = info.duration_seconds,
                "info_request_completed"
            );
            (StatusCode::OK, Json(InfoResponse::from(info))).into_response()
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id.as_str(),
                track_url = %track,
                error = %e,
                "info_request_failed"
            );
            error_response(e.status_code(), e.to_string())
        }
    }
}
