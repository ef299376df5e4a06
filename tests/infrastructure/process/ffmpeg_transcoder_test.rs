use std::sync::Arc;

use dfpwm_relay::application::ports::Transcoder;
use dfpwm_relay::infrastructure::process::FfmpegTranscoder;

use crate::helpers::fake_process::{FakeBehavior, FakeSpawner};

#[test]
fn given_target_format_when_building_arguments_then_argv_is_fixed_dfpwm_filter() {
    assert_eq!(
        FfmpegTranscoder::arguments(),
        vec![
            "-loglevel", "error", "-i", "pipe:0", "-f", "dfpwm", "-ar", "48000", "-ac", "1",
            "pipe:1",
        ]
    );
}

#[tokio::test]
async fn given_configured_program_when_starting_then_spawner_receives_program_and_argv() {
    let spawner = Arc::new(FakeSpawner::new().with("/opt/ffmpeg", FakeBehavior::Echo { exit: 0 }));
    let transcoder = FfmpegTranscoder::new(spawner.clone(), "/opt/ffmpeg");

    let handle = transcoder.start().unwrap();

    assert_eq!(handle.program, "/opt/ffmpeg");
    assert!(handle.stdin.is_some() && handle.stdout.is_some());
    let spawns = spawner.spawns();
    assert_eq!(spawns.len(), 1);
    assert_eq!(spawns[0].args, FfmpegTranscoder::arguments());
}

#[tokio::test]
async fn given_missing_binary_when_starting_then_spawn_error_is_returned() {
    let spawner = Arc::new(FakeSpawner::new().with("ffmpeg", FakeBehavior::FailSpawn));
    let transcoder = FfmpegTranscoder::new(spawner, "ffmpeg");

    let error = transcoder.start().unwrap_err();

    assert!(error.to_string().contains("failed to spawn ffmpeg"));
}
