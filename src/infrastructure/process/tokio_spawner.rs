use std::process::Stdio;

use tokio::process::{Child, Command};
use tokio::sync::oneshot;

use crate::application::ports::{
    BoxedReader, BoxedWriter, ProcessError, ProcessExit, ProcessHandle, ProcessMonitor,
    ProcessSpawner,
};

/// Runs programs with `tokio::process`, all three stdio streams piped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessSpawner;

impl TokioProcessSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSpawner for TokioProcessSpawner {
    fn spawn(&self, program: &str, args: &[String]) -> Result<ProcessHandle, ProcessError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.to_string(),
                source,
            })?;

        tracing::debug!(program, pid = ?child.id(), "process spawned");

        let stdin = child.stdin.take().map(|s| Box::new(s) as BoxedWriter);
        let stdout = child.stdout.take().map(|s| Box::new(s) as BoxedReader);
        let stderr = child.stderr.take().map(|s| Box::new(s) as BoxedReader);
        let name = program.to_string();
        let monitor = ProcessMonitor::spawn(move |kill| watch_child(name, child, kill));

        Ok(ProcessHandle {
            program: program.to_string(),
            stdin,
            stdout,
            stderr,
            monitor,
        })
    }
}

enum ChildEvent {
    Exited(std::io::Result<std::process::ExitStatus>),
    KillRequested,
}

async fn watch_child(program: String, mut child: Child, kill: oneshot::Receiver<()>) -> ProcessExit {
    // A dropped kill switch means every monitor is gone, which also kills.
    let event = tokio::select! {
        status = child.wait() => ChildEvent::Exited(status),
        _ = kill => ChildEvent::KillRequested,
    };

    match event {
        ChildEvent::Exited(Ok(status)) => match status.code() {
            Some(code) => ProcessExit::Exited(code),
            None => ProcessExit::Signaled,
        },
        ChildEvent::Exited(Err(e)) => ProcessExit::WaitFailed(e.to_string()),
        ChildEvent::KillRequested => {
            if let Err(e) = child.start_kill() {
                tracing::debug!(program = %program, error = %e, "kill failed, process likely gone");
            }
            if let Err(e) = child.wait().await {
                tracing::warn!(program = %program, error = %e, "failed to reap killed process");
            }
            tracing::debug!(program = %program, "process killed");
            ProcessExit::Killed
        }
    }
}
