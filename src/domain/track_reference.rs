use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static ABSOLUTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)https?://[^\s/?#]+\S*$").unwrap());
static VIDEO_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Canonical absolute source URL of a track.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackReference(String);

impl TrackReference {
    /// Normalizes caller input into a canonical URL.
    ///
    /// Absolute `http(s)` URLs pass through unchanged once trimmed; an
    /// 11-character video token is expanded into a watch URL. Everything else
    /// is rejected.
    pub fn resolve(input: &str) -> Result<Self, TrackReferenceError> {
        let trimmed = input.trim();

        if ABSOLUTE_URL.is_match(trimmed) {
            return Ok(Self(trimmed.to_string()));
        }

        if VIDEO_TOKEN.is_match(trimmed) {
            return Ok(Self(format!("{}{}", WATCH_URL_PREFIX, trimmed)));
        }

        Err(TrackReferenceError::InvalidReference(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackReferenceError {
    #[error("invalid track identifier: {0}")]
    InvalidReference(String),
}
