use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dfpwm_relay::application::ports::{ProcessExit, ProcessMonitor};
use dfpwm_relay::application::services::{
    PipelineError, PipelineGuard, PipelineOutcome, PipelineRequest,
};
use dfpwm_relay::domain::{CacheKey, TrackReference};

use crate::helpers::log_capture::LogCapture;

fn request() -> PipelineRequest {
    let track = TrackReference::resolve("dQw4w9WgXcQ").unwrap();
    let key = CacheKey::for_track(&track);
    PipelineRequest::new("req-1", track, key)
}

/// A monitor whose process only ends when killed, counting kills.
fn killable_monitor(kills: Arc<AtomicUsize>) -> ProcessMonitor {
    ProcessMonitor::spawn(move |kill| async move {
        let _ = kill.await;
        kills.fetch_add(1, Ordering::SeqCst);
        ProcessExit::Killed
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_triggers_when_finalizing_then_teardown_runs_exactly_once() {
    let request = Arc::new(request());
    let kills = Arc::new(AtomicUsize::new(0));
    let monitor = killable_monitor(Arc::clone(&kills));
    request.attach_transcoder(monitor.clone(), None);

    let mut tasks = Vec::new();
    for i in 0..16 {
        let request = Arc::clone(&request);
        tasks.push(tokio::spawn(async move {
            let outcome = match i % 3 {
                0 => PipelineOutcome::Completed,
                1 => PipelineOutcome::ClientDisconnected,
                _ => PipelineOutcome::Failed(PipelineError::Internal(format!("trigger {}", i))),
            };
            request.finalize(outcome)
        }));
    }

    let mut winners = 0;
    for task in tasks {
        if task.await.unwrap() {
            winners += 1;
        }
    }

    assert_eq!(winners, 1);
    assert!(request.is_finalized());
    assert_eq!(monitor.wait().await, ProcessExit::Killed);
    assert_eq!(kills.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn given_racing_outcomes_when_finalizing_then_one_terminal_event_is_logged() {
    let (logs, _guard) = LogCapture::install();
    let request = request();

    assert!(request.finalize(PipelineOutcome::Failed(PipelineError::Internal(
        "first".into()
    ))));
    assert!(!request.finalize(PipelineOutcome::Completed));
    assert!(!request.finalize(PipelineOutcome::ClientDisconnected));

    let terminal = logs.terminal_events();
    assert_eq!(terminal.len(), 1);
    assert_eq!(terminal[0].message, "stream_request_failed");
    assert_eq!(terminal[0].fields["step"], "internal");
}

#[tokio::test]
async fn given_failure_when_finalized_then_failure_is_handed_out_once() {
    let request = request();
    request.finalize(PipelineOutcome::Failed(PipelineError::TranscoderExit(
        ProcessExit::Exited(1),
    )));

    assert!(matches!(
        request.take_failure(),
        Some(PipelineError::TranscoderExit(ProcessExit::Exited(1)))
    ));
    assert!(request.take_failure().is_none());
}

#[tokio::test]
async fn given_client_disconnect_when_finalized_then_no_failure_is_recorded() {
    let (logs, _guard) = LogCapture::install();
    let request = request();
    request.record_sent(10);

    request.finalize(PipelineOutcome::ClientDisconnected);

    assert!(request.take_failure().is_none());
    let failed = logs.named("stream_request_failed");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].level, tracing::Level::WARN);
    assert_eq!(failed[0].fields["step"], "client");
    assert_eq!(failed[0].fields["bytes_sent"], "10");
}

#[tokio::test]
async fn given_finalize_when_called_then_shutdown_token_is_cancelled() {
    let request = request();
    let token = request.shutdown_token();
    assert!(!token.is_cancelled());

    request.finalize(PipelineOutcome::Completed);

    assert!(token.is_cancelled());
}

#[tokio::test]
async fn given_exited_transcoder_when_finalized_then_it_is_not_killed() {
    let monitor = ProcessMonitor::spawn(|_kill| async { ProcessExit::Exited(0) });
    assert_eq!(monitor.wait().await, ProcessExit::Exited(0));

    let request = request();
    request.attach_transcoder(monitor.clone(), None);
    request.finalize(PipelineOutcome::Completed);

    assert!(monitor.kill(), "teardown should not have used the kill switch");
}

#[tokio::test]
async fn given_armed_guard_when_dropped_then_request_is_finalized_as_client_disconnect() {
    let (logs, _guard) = LogCapture::install();
    let request = Arc::new(request());
    let kills = Arc::new(AtomicUsize::new(0));
    let monitor = killable_monitor(Arc::clone(&kills));
    request.attach_transcoder(monitor.clone(), None);

    drop(PipelineGuard::new(Arc::clone(&request)));

    assert!(request.is_finalized());
    assert_eq!(monitor.wait().await, ProcessExit::Killed);
    let failed = logs.named("stream_request_failed");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].fields["step"], "client");
}

#[tokio::test]
async fn given_disarmed_guard_when_dropped_then_request_stays_open() {
    let (logs, _guard) = LogCapture::install();
    let guard = PipelineGuard::new(Arc::new(request()));

    let request = guard.disarm();

    assert!(!request.is_finalized());
    assert!(logs.terminal_events().is_empty());
}
