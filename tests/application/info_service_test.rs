use std::sync::Arc;

use dfpwm_relay::application::ports::ExtractorError;
use dfpwm_relay::application::services::InfoService;
use dfpwm_relay::domain::TrackReference;
use dfpwm_relay::infrastructure::process::YtDlpExtractor;

use crate::helpers::fake_process::FakeSpawner;

fn service(spawner: &Arc<FakeSpawner>) -> InfoService {
    InfoService::new(Arc::new(YtDlpExtractor::new(spawner.clone(), "yt-dlp")))
}

fn track() -> TrackReference {
    TrackReference::resolve("dQw4w9WgXcQ").unwrap()
}

#[tokio::test]
async fn given_video_metadata_when_describing_then_info_is_returned() {
    let spawner = Arc::new(FakeSpawner::new().with_info(
        "yt-dlp",
        r#"{"title":"Never Gonna Give You Up","channel":"Rick Astley","duration":213}"#,
        0,
    ));

    let info = service(&spawner).describe(&track()).await.unwrap();

    assert_eq!(info.title, "Never Gonna Give You Up");
    assert_eq!(info.channel, "Rick Astley");
    assert_eq!(info.duration_formatted(), "3:33");
}

#[tokio::test]
async fn given_repeated_lookups_when_describing_then_readiness_is_checked_once() {
    let spawner = Arc::new(FakeSpawner::new().with_info("yt-dlp", r#"{"title":"a"}"#, 0));
    let service = service(&spawner);

    service.describe(&track()).await.unwrap();
    service.describe(&track()).await.unwrap();

    assert_eq!(spawner.version_checks("yt-dlp"), 1);
    assert_eq!(spawner.spawn_count("yt-dlp"), 2);
}

#[tokio::test]
async fn given_playlist_when_describing_then_playlist_error_is_returned() {
    let spawner = Arc::new(FakeSpawner::new().with_info(
        "yt-dlp",
        r#"{"_type":"playlist","title":"Mix","entries":[]}"#,
        0,
    ));

    let result = service(&spawner).describe(&track()).await;

    assert!(matches!(result, Err(ExtractorError::Playlist)));
}

#[tokio::test]
async fn given_failing_lookup_when_describing_then_info_failed_is_returned() {
    let spawner = Arc::new(FakeSpawner::new().with_info("yt-dlp", "", 1));

    let result = service(&spawner).describe(&track()).await;

    assert!(matches!(result, Err(ExtractorError::InfoFailed(_))));
}
