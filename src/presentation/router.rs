use axum::Router;
use axum::middleware;
use axum::routing::{MethodRouter, get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    health_handler, info_handler, method_not_allowed_handler, require_api_key, stream_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler).fallback(method_not_allowed_handler))
        .route("/stream", protected(&state, get(stream_handler)))
        .route("/info", protected(&state, get(info_handler)))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

/// Method is checked before the key, so a wrong method is 405 even unauthenticated.
/// `get` would also answer HEAD, which must not start a pipeline.
fn protected(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .head(method_not_allowed_handler)
        .fallback(method_not_allowed_handler)
}
