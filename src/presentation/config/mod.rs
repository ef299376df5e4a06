mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AuthSettings, CacheProviderSetting, CacheSettings, LoggingSettings, PipelineSettings,
    ServerSettings, Settings, ToolSettings,
};
