use std::sync::Arc;

use crate::application::services::{InfoService, StreamService};

#[derive(Clone)]
pub struct AppState {
    pub stream_service: Arc<StreamService>,
    pub info_service: Arc<InfoService>,
    pub api_key: Arc<str>,
}
