//! Child process creation and termination.
//!
//! `spawn` produces a [`ProcessHandle`] the caller owns; the supervisor keeps
//! nothing. In capture mode two background tasks drain stdout and stderr line
//! by line into the console sink for the lifetime of the child; the reads are
//! buffered and asynchronous so consumption never blocks the server, and they
//! end cleanly at pipe EOF. `stop` is an unconditional kill with a bounded
//! wait, not a negotiated shutdown.

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use warden_settings::ServerId;

use crate::console::ConsoleSink;
use crate::launch::LaunchSpec;
use crate::staging::StageError;

/// Upper bound on how long `stop` waits for the killed process to exit.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum StartError {
    #[error("Dependency staging failed: {0}")]
    Dependency(#[from] StageError),

    #[error("Failed to spawn {}: {source}", .executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum StopError {
    #[error("Kill request failed: {0}")]
    Kill(#[source] io::Error),

    #[error("Process did not exit within {:?} of being killed", STOP_TIMEOUT)]
    Timeout,
}

/// A live supervised process. Owned by the caller after a successful start;
/// dropped handles leave the child running (stopping is always explicit).
#[derive(Debug)]
pub struct ProcessHandle {
    id: ServerId,
    child: Child,
    capture_tasks: Vec<JoinHandle<()>>,
}

impl ProcessHandle {
    pub fn server_id(&self) -> ServerId {
        self.id
    }

    /// OS process id, if the child has not been reaped yet.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the child to exit on its own, then for the capture tasks to
    /// drain the tail of its output.
    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait().await?;
        self.join_capture_tasks().await;
        Ok(status)
    }

    /// Non-blocking exit check.
    pub fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    async fn join_capture_tasks(&mut self) {
        for task in self.capture_tasks.drain(..) {
            let _ = task.await;
        }
    }

    /// Tear down the capture tasks without waiting for pipe EOF. Used after
    /// a kill: orphaned grandchildren may keep the pipe open indefinitely.
    async fn abort_capture_tasks(&mut self) {
        for task in self.capture_tasks.drain(..) {
            task.abort();
            let _ = task.await;
        }
    }
}

/// Create the child process described by `spec`.
///
/// Capture mode pipes stdout/stderr into `sink`; direct mode inherits the
/// parent's stdio and `sink` is ignored. Spawn failure leaves no partial
/// state behind.
pub async fn spawn(
    spec: &LaunchSpec,
    id: ServerId,
    sink: Option<Arc<dyn ConsoleSink>>,
) -> Result<ProcessHandle, StartError> {
    let mut cmd = Command::new(&spec.executable);
    cmd.args(&spec.arguments).current_dir(&spec.working_dir);

    let capture = spec.capture_console;
    if capture {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        hide_window(&mut cmd);
    } else {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    }

    let mut child = cmd.spawn().map_err(|source| StartError::Spawn {
        executable: spec.executable.clone(),
        source,
    })?;

    let mut capture_tasks = Vec::new();
    if capture {
        let sink = sink.expect("capture mode requires a console sink");
        if let Some(stdout) = child.stdout.take() {
            capture_tasks.push(read_lines(id, stdout, Arc::clone(&sink)));
        }
        if let Some(stderr) = child.stderr.take() {
            capture_tasks.push(read_lines(id, stderr, sink));
        }
    }

    info!(
        "[Server {}] Spawned {} (pid={:?}) in {}",
        id,
        spec.executable.display(),
        child.id(),
        spec.working_dir.display()
    );

    Ok(ProcessHandle {
        id,
        child,
        capture_tasks,
    })
}

/// Forcibly terminate the process. A child that already exited is a no-op
/// success; a child that survives the kill past [`STOP_TIMEOUT`] is reported,
/// not retried.
pub async fn stop(handle: &mut ProcessHandle) -> Result<(), StopError> {
    let id = handle.id;

    if let Ok(Some(status)) = handle.child.try_wait() {
        debug!("[Server {}] Already exited ({}) before stop", id, status);
        handle.abort_capture_tasks().await;
        return Ok(());
    }

    match handle.child.start_kill() {
        Ok(()) => {}
        // Lost the race with a natural exit.
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => {
            handle.abort_capture_tasks().await;
            return Ok(());
        }
        Err(e) => return Err(StopError::Kill(e)),
    }

    match tokio::time::timeout(STOP_TIMEOUT, handle.child.wait()).await {
        Ok(Ok(status)) => {
            info!("[Server {}] Stopped ({})", id, status);
            handle.abort_capture_tasks().await;
            Ok(())
        }
        Ok(Err(e)) => Err(StopError::Kill(e)),
        Err(_) => {
            warn!(
                "[Server {}] Still running {:?} after kill",
                id, STOP_TIMEOUT
            );
            Err(StopError::Timeout)
        }
    }
}

/// Drain one pipe line by line into the sink until EOF. Never blocks the
/// child: reads are buffered and run on the runtime, and the task exits as
/// soon as the pipe closes.
fn read_lines(
    id: ServerId,
    stream: impl AsyncRead + Unpin + Send + 'static,
    sink: Arc<dyn ConsoleSink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => sink.line(id, &line),
                Ok(None) => break,
                Err(e) => {
                    debug!("[Server {}] Console read ended: {}", id, e);
                    break;
                }
            }
        }
    })
}

#[cfg(windows)]
fn hide_window(cmd: &mut Command) {
    // CREATE_NO_WINDOW: captured servers get no console window of their own.
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_window(_cmd: &mut Command) {}
