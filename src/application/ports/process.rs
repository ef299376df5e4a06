use std::fmt;
use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{oneshot, watch};

pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Spawns external programs as byte-stream filters.
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, program: &str, args: &[String]) -> Result<ProcessHandle, ProcessError>;
}

/// A running program with its stdio pipes and an exit monitor.
pub struct ProcessHandle {
    pub program: String,
    pub stdin: Option<BoxedWriter>,
    pub stdout: Option<BoxedReader>,
    pub stderr: Option<BoxedReader>,
    pub monitor: ProcessMonitor,
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("program", &self.program)
            .field("stdin", &self.stdin.is_some())
            .field("stdout", &self.stdout.is_some())
            .field("stderr", &self.stderr.is_some())
            .field("exited", &self.monitor.has_exited())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessExit {
    Exited(i32),
    Signaled,
    Killed,
    WaitFailed(String),
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        matches!(self, ProcessExit::Exited(0))
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ProcessExit::Exited(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessExit::Exited(code) => write!(f, "exit code {}", code),
            ProcessExit::Signaled => f.write_str("terminated by signal"),
            ProcessExit::Killed => f.write_str("killed"),
            ProcessExit::WaitFailed(reason) => write!(f, "wait failed: {}", reason),
        }
    }
}

/// Shared view of a process lifetime.
///
/// The watcher future owns the process and resolves with its exit. It receives
/// a kill signal that fires either on [`ProcessMonitor::kill`] or once every
/// clone of the monitor has been dropped, so an abandoned process never
/// outlives its request.
#[derive(Clone)]
pub struct ProcessMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    kill_switch: Mutex<Option<oneshot::Sender<()>>>,
    exit: watch::Receiver<Option<ProcessExit>>,
}

impl ProcessMonitor {
    pub fn spawn<F, Fut>(watcher: F) -> Self
    where
        F: FnOnce(oneshot::Receiver<()>) -> Fut,
        Fut: Future<Output = ProcessExit> + Send + 'static,
    {
        let (kill_tx, kill_rx) = oneshot::channel();
        let (exit_tx, exit_rx) = watch::channel(None);
        let watch_exit = watcher(kill_rx);

        tokio::spawn(async move {
            let exit = watch_exit.await;
            let _ = exit_tx.send(Some(exit));
        });

        Self {
            inner: Arc::new(MonitorInner {
                kill_switch: Mutex::new(Some(kill_tx)),
                exit: exit_rx,
            }),
        }
    }

    /// Requests termination. Returns `false` if a kill was already issued.
    pub fn kill(&self) -> bool {
        let switch = match self.inner.kill_switch.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match switch {
            Some(tx) => {
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    pub fn has_exited(&self) -> bool {
        self.inner.exit.borrow().is_some()
    }

    pub async fn wait(&self) -> ProcessExit {
        let mut exit = self.inner.exit.clone();
        let observed = match exit.wait_for(Option::is_some).await {
            Ok(state) => (*state).clone(),
            Err(_) => None,
        };
        observed.unwrap_or_else(|| ProcessExit::WaitFailed("process watcher stopped".to_string()))
    }
}

impl fmt::Debug for ProcessMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessMonitor")
            .field("exit", &*self.inner.exit.borrow())
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} did not expose {pipe}")]
    MissingPipe { program: String, pipe: &'static str },
}
