//! High-level start/stop entry points consumed by the host.

use std::sync::Arc;
use tracing::info;
use warden_settings::ServerSettings;

use crate::console::ConsoleSink;
use crate::launch::LaunchSpec;
use crate::process::{self, ProcessHandle, StartError, StopError};
use crate::staging;

/// One supervisor per host; holds only the console sink. Stateless across
/// operations: settings come in with every call, the process handle goes out
/// to the caller.
pub struct Supervisor {
    sink: Arc<dyn ConsoleSink>,
}

impl Supervisor {
    pub fn new(sink: Arc<dyn ConsoleSink>) -> Self {
        Self { sink }
    }

    /// Stage dependencies, build the launch command line, and spawn the
    /// server. With `capture` the child's console is fed line by line into
    /// the sink; without it the child keeps its own console.
    pub async fn start(
        &self,
        settings: &ServerSettings,
        capture: bool,
    ) -> Result<ProcessHandle, StartError> {
        staging::ensure_dependencies(&settings.paths())?;

        let spec = LaunchSpec::from_settings(settings, capture);
        info!(
            "[Server {}] Launch command: {} {}",
            settings.id,
            spec.executable.display(),
            spec.command_line()
        );

        let sink = capture.then(|| Arc::clone(&self.sink));
        process::spawn(&spec, settings.id, sink).await
    }

    /// Kill the process behind `handle`. Unconditional; see `process::stop`.
    pub async fn stop(&self, handle: &mut ProcessHandle) -> Result<(), StopError> {
        process::stop(handle).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::BufferSink;
    use crate::staging::StageError;
    use warden_settings::ServerId;

    #[tokio::test]
    async fn start_fails_fast_when_companions_are_missing() {
        let root = tempfile::tempdir().unwrap();
        let settings =
            ServerSettings::with_defaults(ServerId::new(1), root.path().to_path_buf());
        let supervisor = Supervisor::new(BufferSink::new());

        let err = supervisor.start(&settings, false).await.unwrap_err();
        assert!(matches!(
            err,
            StartError::Dependency(StageError::MissingSource { .. })
        ));
    }
}
