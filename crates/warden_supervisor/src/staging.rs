//! Companion file staging.
//!
//! The Steam runtime libraries must sit next to the executable before the
//! server will boot. The installer leaves them at the storage root; staging
//! copies any that are missing down into the binaries directory. A missing
//! source or a failed copy is fatal to the start attempt.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};
use warden_settings::paths::COMPANION_FILES;
use warden_settings::ServerPaths;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("Companion file {name} missing from {}", .source_dir.display())]
    MissingSource { name: String, source_dir: PathBuf },

    #[error("Failed to stage {name} into {}: {source}", .target_dir.display())]
    Copy {
        name: String,
        target_dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Ensure every companion library exists in the binaries directory, copying
/// missing ones from the storage root. Idempotent; present files are left
/// untouched.
pub fn ensure_dependencies(paths: &ServerPaths) -> Result<(), StageError> {
    let target_dir = paths.binaries_dir();
    std::fs::create_dir_all(&target_dir).map_err(|source| StageError::Copy {
        name: "<binaries dir>".to_string(),
        target_dir: target_dir.clone(),
        source,
    })?;

    for name in COMPANION_FILES {
        let target = target_dir.join(name);
        if target.exists() {
            debug!("Companion {} already staged", name);
            continue;
        }

        let source_path = paths.companion_source_dir().join(name);
        if !source_path.exists() {
            return Err(StageError::MissingSource {
                name: name.to_string(),
                source_dir: paths.companion_source_dir().to_path_buf(),
            });
        }

        std::fs::copy(&source_path, &target).map_err(|source| StageError::Copy {
            name: name.to_string(),
            target_dir: target_dir.clone(),
            source,
        })?;
        info!("Staged companion {} into {}", name, target_dir.display());
    }

    Ok(())
}
