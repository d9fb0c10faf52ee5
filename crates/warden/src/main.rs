//! Warden CLI: dedicated-server lifecycle management.
//!
//! Usage:
//!     warden provision --settings server.json
//!     warden run --settings server.json --capture
//!     warden command --settings server.json
//!
//! The settings file is the JSON form of `ServerSettings`; the host
//! orchestrator owns it, warden only reads it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use warden_provision::Provisioner;
use warden_settings::ServerSettings;
use warden_supervisor::{ChannelSink, LaunchSpec, Supervisor};

#[derive(Parser, Debug)]
#[command(name = "warden", about = "Dedicated game server warden")]
struct Args {
    /// Mirror the full log filter on stderr instead of warnings only
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Download the config template and substitute instance values
    Provision {
        /// Path to the server settings JSON file
        #[arg(long)]
        settings: PathBuf,
    },
    /// Start the server and supervise it until it exits or Ctrl-C
    Run {
        /// Path to the server settings JSON file
        #[arg(long)]
        settings: PathBuf,
        /// Capture the server console instead of letting it own a window
        #[arg(long)]
        capture: bool,
    },
    /// Print the launch command line without starting anything
    Command {
        /// Path to the server settings JSON file
        #[arg(long)]
        settings: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    warden_logging::init_logging("warden", args.verbose)?;

    match args.command {
        CliCommand::Provision { settings } => {
            let settings = load_settings(&settings)?;
            provision(&settings).await
        }
        CliCommand::Run { settings, capture } => {
            let settings = load_settings(&settings)?;
            run(&settings, capture).await
        }
        CliCommand::Command { settings } => {
            let settings = load_settings(&settings)?;
            let spec = LaunchSpec::from_settings(&settings, false);
            println!("{} {}", spec.executable.display(), spec.command_line());
            Ok(())
        }
    }
}

fn load_settings(path: &Path) -> Result<ServerSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))
}

async fn provision(settings: &ServerSettings) -> Result<()> {
    let outcome = Provisioner::new().provision(settings).await?;
    if !outcome.is_provisioned() {
        warn!(
            "[Server {}] Config template unavailable; no config file written",
            settings.id
        );
        std::process::exit(1);
    }
    Ok(())
}

async fn run(settings: &ServerSettings, capture: bool) -> Result<()> {
    let (sink, mut console_rx) = ChannelSink::new();
    let supervisor = Supervisor::new(sink);

    let mut handle = supervisor
        .start(settings, capture)
        .await
        .with_context(|| format!("[Server {}] Start failed", settings.id))?;

    // Echo captured console lines; idle (and harmless) in direct mode.
    tokio::spawn(async move {
        while let Some(line) = console_rx.recv().await {
            println!("[{}] {}", line.id, line.text);
        }
    });

    let natural_exit = tokio::select! {
        status = handle.wait() => Some(status),
        _ = tokio::signal::ctrl_c() => None,
    };

    match natural_exit {
        Some(status) => {
            let status = status.context("Failed waiting for server exit")?;
            info!("[Server {}] Exited with {}", settings.id, status);
        }
        None => {
            info!("[Server {}] Interrupted; stopping server", settings.id);
            supervisor
                .stop(&mut handle)
                .await
                .with_context(|| format!("[Server {}] Stop failed", settings.id))?;
        }
    }

    Ok(())
}
