//! Launch command-line assembly.
//!
//! The dedicated server takes an Unreal-style launch URL as its first
//! argument: `?`-delimited segments, ordering significant, followed by fixed
//! server-mode flags. Each segment is a pure function of the settings record
//! and is omitted entirely when its inputs are absent, never emitted empty.

use std::path::PathBuf;
use warden_settings::ServerSettings;

/// Reserved delimiter between launch URL segments.
pub const SEGMENT_DELIMITER: char = '?';

/// Fixed flags appended after the launch URL.
pub const SERVER_MODE_FLAGS: &[&str] = &["-server", "-log"];

/// Everything needed to create the child process. Ephemeral: built for one
/// start attempt and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Working directory for the child: the storage root.
    pub working_dir: PathBuf,
    pub executable: PathBuf,
    /// Launch URL first, then the server-mode flags.
    pub arguments: Vec<String>,
    /// Capture mode: pipe stdout/stderr into the console sink and hide the
    /// process window. Direct mode: the child owns its own console.
    pub capture_console: bool,
}

impl LaunchSpec {
    pub fn from_settings(settings: &ServerSettings, capture_console: bool) -> Self {
        let paths = settings.paths();
        Self {
            working_dir: paths.storage_root().to_path_buf(),
            executable: paths.executable(),
            arguments: build_arguments(settings),
            capture_console,
        }
    }

    /// Space-joined arguments, for logging and the `command` subcommand.
    pub fn command_line(&self) -> String {
        self.arguments.join(" ")
    }
}

/// Ordered launch URL segments, each present only when its input is.
pub fn url_segments(settings: &ServerSettings) -> Vec<String> {
    [
        map_segment(settings),
        listen_segment(settings),
        multi_home_segment(settings),
        port_segment(settings),
        extra_segment(settings),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Full argument vector: joined launch URL (if any segments), then flags.
pub fn build_arguments(settings: &ServerSettings) -> Vec<String> {
    let segments = url_segments(settings);
    let mut args = Vec::with_capacity(1 + SERVER_MODE_FLAGS.len());
    if !segments.is_empty() {
        let mut url = String::new();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                url.push(SEGMENT_DELIMITER);
            }
            url.push_str(segment);
        }
        args.push(url);
    }
    args.extend(SERVER_MODE_FLAGS.iter().map(|f| f.to_string()));
    args
}

fn map_segment(settings: &ServerSettings) -> Option<String> {
    let map = settings.map.trim();
    (!map.is_empty()).then(|| map.to_string())
}

/// The listen flag rides with the map: no map, no listen.
fn listen_segment(settings: &ServerSettings) -> Option<String> {
    (!settings.map.trim().is_empty()).then(|| "listen".to_string())
}

/// Bind address. Only meaningful when a port is configured.
fn multi_home_segment(settings: &ServerSettings) -> Option<String> {
    settings
        .port
        .map(|_| format!("MultiHome={}", settings.address))
}

fn port_segment(settings: &ServerSettings) -> Option<String> {
    settings.port.map(|port| format!("Port={}", port))
}

/// Host-supplied parameter string, passed through verbatim. Its internal
/// syntax is the host's problem.
fn extra_segment(settings: &ServerSettings) -> Option<String> {
    let extra = settings.extra_params.trim();
    (!extra.is_empty()).then(|| extra.to_string())
}
