mod auth;
mod error;
mod health;
mod info;
mod stream;
mod track_query;

pub use auth::{API_KEY_HEADER, require_api_key};
pub use error::{ErrorResponse, error_response, method_not_allowed_handler};
pub use health::health_handler;
pub use info::{InfoResponse, info_handler};
pub use stream::{X_CACHE_HEADER, stream_handler};
pub use track_query::TrackQuery;
