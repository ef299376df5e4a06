use std::sync::Arc;

use crate::application::ports::{ExtractorError, MediaExtractor};
use crate::domain::{TrackInfo, TrackReference};

pub struct InfoService {
    extractor: Arc<dyn MediaExtractor>,
}

impl InfoService {
    pub fn new(extractor: Arc<dyn MediaExtractor>) -> Self {
        Self { extractor }
    }

    pub async fn describe(&self, track: &TrackReference) -> Result<TrackInfo, ExtractorError> {
        self.extractor.ensure_ready().await;
        self.extractor.fetch_info(track).await
    }
}
