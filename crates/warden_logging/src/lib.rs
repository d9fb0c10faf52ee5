//! Shared logging setup for Warden binaries.
//!
//! Logs go to a size-capped rolling file under the warden home directory and
//! to stderr. `RUST_LOG` overrides the default filter for both layers.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "warden=info,warden_supervisor=info,warden_provision=info";
const MAX_LOG_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Resolve the Warden home directory.
///
/// Priority: WARDEN_HOME, then `~/.warden`, then `./.warden`.
pub fn warden_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("WARDEN_HOME") {
        return PathBuf::from(override_path);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".warden"),
        None => PathBuf::from(".").join(".warden"),
    }
}

/// Logs directory: `<home>/logs`.
pub fn logs_dir() -> PathBuf {
    warden_home().join("logs")
}

/// Initialize tracing with a rolling file writer and stderr output.
///
/// `verbose` raises the stderr layer to the file filter; otherwise stderr
/// only shows warnings so captured console output stays readable.
pub fn init_logging(app_name: &str, verbose: bool) -> Result<()> {
    let dir = logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let writer = RollingWriter::open(dir, app_name)?;

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let stderr_filter = if verbose {
        file_filter.clone()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(stderr_filter),
        )
        .init();

    Ok(())
}

/// Append-only log file that rolls to `<name>.log.old` past the size cap.
struct LogFile {
    dir: PathBuf,
    name: String,
    file: File,
    written: u64,
}

impl LogFile {
    fn open(dir: PathBuf, name: String) -> io::Result<Self> {
        let path = dir.join(format!("{}.log", name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            dir,
            name,
            file,
            written,
        })
    }

    fn roll(&mut self) -> io::Result<()> {
        let _ = self.file.flush();
        let current = self.dir.join(format!("{}.log", self.name));
        let old = self.dir.join(format!("{}.log.old", self.name));
        if current.exists() {
            fs::rename(&current, &old)?;
        }
        let replacement = Self::open(self.dir.clone(), self.name.clone())?;
        *self = replacement;
        Ok(())
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() as u64 > MAX_LOG_FILE_SIZE {
            self.roll()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Cloneable writer handed to tracing; serializes access to the log file.
#[derive(Clone)]
struct RollingWriter {
    inner: Arc<Mutex<LogFile>>,
}

impl RollingWriter {
    fn open(dir: PathBuf, app_name: &str) -> Result<Self> {
        let file = LogFile::open(dir, sanitize_name(app_name))
            .with_context(|| format!("Failed to open log file for {}", app_name))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(file)),
        })
    }
}

struct RollingWriterGuard {
    inner: Arc<Mutex<LogFile>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        RollingWriterGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for RollingWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        file.flush()
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
