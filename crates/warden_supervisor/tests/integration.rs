//! End-to-end supervisor tests against a fake server installation.
//!
//! The fake storage root mirrors the real layout: companion libraries at the
//! root, a stand-in executable at `DNL/Binaries/Win64/DNLServer.exe`. On
//! Unix the executable is a shell script so we can exercise the whole
//! stage-build-spawn-capture-stop pipeline without the actual game server.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use warden_settings::paths::COMPANION_FILES;
use warden_settings::{ServerId, ServerSettings};
use warden_supervisor::{BufferSink, StageError, StartError, Supervisor};

fn install_fake_server(root: &Path, script_body: &str) {
    for name in COMPANION_FILES {
        fs::write(root.join(name), "stub").unwrap();
    }
    let exe = root.join("DNL/Binaries/Win64/DNLServer.exe");
    fs::create_dir_all(exe.parent().unwrap()).unwrap();
    fs::write(&exe, format!("#!/bin/sh\n{}\n", script_body)).unwrap();
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
}

fn settings_for(root: &Path) -> ServerSettings {
    let mut settings = ServerSettings::with_defaults(ServerId::new(11), root.to_path_buf());
    settings.session_name = "Integration".to_string();
    settings.extra_params = "ServerPassword=secret".to_string();
    settings
}

#[tokio::test]
async fn start_stages_companions_and_captures_console() {
    let root = tempfile::tempdir().unwrap();
    install_fake_server(root.path(), "echo booting; echo ready");
    let settings = settings_for(root.path());

    let sink = BufferSink::new();
    let supervisor = Supervisor::new(sink.clone());
    let mut handle = supervisor.start(&settings, true).await.unwrap();

    let status = handle.wait().await.unwrap();
    assert!(status.success());

    // Companions were staged next to the executable.
    for name in COMPANION_FILES {
        assert!(settings.paths().binaries_dir().join(name).exists());
    }

    let lines: Vec<String> = sink.take().into_iter().map(|l| l.text).collect();
    assert_eq!(lines, vec!["booting", "ready"]);
}

#[tokio::test]
async fn server_receives_the_launch_url_as_first_argument() {
    let root = tempfile::tempdir().unwrap();
    // The stand-in echoes its arguments back through the console.
    install_fake_server(root.path(), "echo \"$@\"");
    let settings = settings_for(root.path());

    let sink = BufferSink::new();
    let supervisor = Supervisor::new(sink.clone());
    let mut handle = supervisor.start(&settings, true).await.unwrap();
    handle.wait().await.unwrap();

    let lines = sink.take();
    assert_eq!(lines.len(), 1);
    assert_eq!(
        lines[0].text,
        "DNL_ALL?listen?MultiHome=0.0.0.0?Port=7777?ServerPassword=secret -server -log"
    );
}

#[tokio::test]
async fn stop_terminates_a_long_running_server() {
    let root = tempfile::tempdir().unwrap();
    install_fake_server(root.path(), "echo up; sleep 60");
    let settings = settings_for(root.path());

    let sink = BufferSink::new();
    let supervisor = Supervisor::new(sink.clone());
    let mut handle = supervisor.start(&settings, true).await.unwrap();

    // Let the server come up before killing it.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    supervisor.stop(&mut handle).await.unwrap();
    assert!(handle.try_wait().unwrap().is_some());
}

#[tokio::test]
async fn direct_mode_starts_without_capturing() {
    let root = tempfile::tempdir().unwrap();
    install_fake_server(root.path(), ":");
    let settings = settings_for(root.path());

    let sink = BufferSink::new();
    let supervisor = Supervisor::new(sink.clone());
    let mut handle = supervisor.start(&settings, false).await.unwrap();
    let status = handle.wait().await.unwrap();

    assert!(status.success());
    assert!(sink.is_empty());
}

#[tokio::test]
async fn missing_executable_surfaces_a_spawn_error() {
    let root = tempfile::tempdir().unwrap();
    // Companions are present but there is no executable.
    for name in COMPANION_FILES {
        fs::write(root.path().join(name), "stub").unwrap();
    }
    let settings = settings_for(root.path());

    let supervisor = Supervisor::new(BufferSink::new());
    let err = supervisor.start(&settings, false).await.unwrap_err();
    assert!(matches!(err, StartError::Spawn { .. }));
}

#[tokio::test]
async fn missing_companion_surfaces_a_staging_error() {
    let root = tempfile::tempdir().unwrap();
    install_fake_server(root.path(), ":");
    fs::remove_file(root.path().join(COMPANION_FILES[1])).unwrap();

    let settings = settings_for(root.path());
    let supervisor = Supervisor::new(BufferSink::new());
    let err = supervisor.start(&settings, false).await.unwrap_err();
    assert!(matches!(
        err,
        StartError::Dependency(StageError::MissingSource { .. })
    ));
}
