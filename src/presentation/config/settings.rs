use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub cache: CacheSettings,
    pub tools: ToolSettings,
    pub pipeline: PipelineSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Deserialize)]
pub struct AuthSettings {
    pub api_key: String,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub provider: CacheProviderSetting,
    pub local_path: String,
    pub key_prefix: String,
    pub azure_account: Option<String>,
    pub azure_access_key: Option<String>,
    pub azure_container: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheProviderSetting {
    Local,
    Azure,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolSettings {
    pub extractor_path: String,
    pub transcoder_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    pub timeout_seconds: u64,
    pub channel_capacity: usize,
}

impl PipelineSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Settings {
    /// Layers built-in defaults, `appsettings.<Environment>` and `APP_*`
    /// variables, in increasing precedence.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("cache.provider", "local")?
            .set_default("cache.local_path", "./audio-cache")?
            .set_default("cache.key_prefix", "audio-cache")?
            .set_default("tools.extractor_path", "yt-dlp")?
            .set_default("tools.transcoder_path", "ffmpeg")?
            .set_default("pipeline.timeout_seconds", 540)?
            .set_default("pipeline.channel_capacity", 32)?
            .set_default("logging.level", "info")?
            .set_default("logging.enable_json", environment == Environment::Prod)?
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
