use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::TrackReference;

/// Provenance stored next to a cached blob.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntryMetadata {
    pub source_url: String,
    pub created_at: DateTime<Utc>,
}

impl CacheEntryMetadata {
    pub fn new(track: &TrackReference) -> Self {
        Self {
            source_url: track.as_str().to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
