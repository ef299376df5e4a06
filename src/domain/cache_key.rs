use std::fmt;

use sha2::{Digest, Sha256};

use super::{TargetFormat, TrackReference};

/// Content address of a transcoded track: `<sha256-hex>.dfpwm`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_track(track: &TrackReference) -> Self {
        let digest = Sha256::digest(track.as_str().as_bytes());
        Self(format!("{}.{}", hex::encode(digest), TargetFormat::EXTENSION))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Object location of the key under a backend namespace.
    pub fn with_prefix(&self, prefix: &str) -> String {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            self.0.clone()
        } else {
            format!("{}/{}", prefix, self.0)
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
