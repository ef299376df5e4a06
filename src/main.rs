use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use dfpwm_relay::application::ports::{MediaExtractor, ProcessSpawner};
use dfpwm_relay::application::services::{InfoService, PipelineOptions, StreamService};
use dfpwm_relay::infrastructure::observability::{TracingConfig, init_tracing};
use dfpwm_relay::infrastructure::process::{FfmpegTranscoder, TokioProcessSpawner, YtDlpExtractor};
use dfpwm_relay::infrastructure::storage::CacheStoreFactory;
use dfpwm_relay::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;

    let settings = Settings::load(environment).context("failed to load settings")?;

    init_tracing(&TracingConfig::from_settings(environment, &settings.logging));
    tracing::info!(
        environment = %environment,
        port = settings.server.port,
        cache_provider = ?settings.cache.provider,
        extractor = %settings.tools.extractor_path,
        transcoder = %settings.tools.transcoder_path,
        timeout_secs = settings.pipeline.timeout().as_secs(),
        "relay starting"
    );

    let cache_store =
        CacheStoreFactory::create(&settings.cache).context("failed to create cache store")?;

    let spawner: Arc<dyn ProcessSpawner> = Arc::new(TokioProcessSpawner::new());
    let extractor: Arc<dyn MediaExtractor> = Arc::new(YtDlpExtractor::new(
        Arc::clone(&spawner),
        settings.tools.extractor_path.clone(),
    ));
    let transcoder = Arc::new(FfmpegTranscoder::new(
        Arc::clone(&spawner),
        settings.tools.transcoder_path.clone(),
    ));

    // Warm the readiness check so the first request does not pay for it.
    let warmup = Arc::clone(&extractor);
    tokio::spawn(async move { warmup.ensure_ready().await });

    let options = PipelineOptions {
        timeout: settings.pipeline.timeout(),
        channel_capacity: settings.pipeline.channel_capacity.max(1),
        ..PipelineOptions::default()
    };

    let state = AppState {
        stream_service: Arc::new(StreamService::new(
            cache_store,
            Arc::clone(&extractor),
            transcoder,
            options,
        )),
        info_service: Arc::new(InfoService::new(extractor)),
        api_key: Arc::from(settings.auth.api_key.as_str()),
    };

    let router = create_router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
