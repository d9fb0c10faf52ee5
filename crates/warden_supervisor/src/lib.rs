//! Launch preparation and process supervision for one dedicated server.
//!
//! The supervisor turns a read-only `ServerSettings` record into a running
//! child process: it stages required companion files, assembles the launch
//! command line, spawns the executable (optionally capturing its console
//! output line by line), and kills it on request. All state lives in the
//! filesystem and in the [`ProcessHandle`] returned to the caller.

pub mod console;
pub mod launch;
pub mod process;
pub mod staging;
mod supervisor;

pub use console::{BufferSink, ChannelSink, ConsoleLine, ConsoleSink};
pub use launch::LaunchSpec;
pub use process::{ProcessHandle, StartError, StopError, STOP_TIMEOUT};
pub use staging::{ensure_dependencies, StageError};
pub use supervisor::Supervisor;
