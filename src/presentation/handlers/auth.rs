use axum::extract::{Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use serde::Deserialize;

use crate::infrastructure::observability::redact_query;
use crate::presentation::state::AppState;

use super::error::error_response;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Deserialize)]
struct KeyQuery {
    key: Option<String>,
}

/// Admits requests carrying the shared secret in `?key=` or `x-api-key`.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let supplied = Query::<KeyQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.key)
        .or_else(|| {
            request
                .headers()
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        });

    match supplied {
        Some(key) if keys_match(key.as_bytes(), state.api_key.as_bytes()) => next.run(request).await,
        _ => {
            let target = request
                .uri()
                .path_and_query()
                .map(|pq| redact_query(pq.as_str()))
                .unwrap_or_else(|| request.uri().path().to_string());
            tracing::warn!(path = %target, "unauthorized request");
            error_response(StatusCode::FORBIDDEN, "Forbidden")
        }
    }
}

fn keys_match(supplied: &[u8], expected: &[u8]) -> bool {
    if supplied.len() != expected.len() {
        return false;
    }
    supplied
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
