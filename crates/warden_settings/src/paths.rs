//! Fixed filesystem layout of one server instance's storage root.
//!
//! The dedicated server ships with a rigid directory tree; every path Warden
//! touches is a fixed offset from the storage root. Keeping the offsets in
//! one place means the supervisor and the provisioner can never disagree
//! about where things live.

use std::path::{Path, PathBuf};

/// Executable, relative to the storage root.
pub const EXECUTABLE_REL: &str = "DNL/Binaries/Win64/DNLServer.exe";

/// Directory holding the executable and its companion libraries.
pub const BINARIES_REL: &str = "DNL/Binaries/Win64";

/// Config file written by the provisioner, relative to the storage root.
/// Distinct subtree from the binaries on purpose.
pub const CONFIG_REL: &str = "DNL/Saved/Config/WindowsServer/GameUserSettings.ini";

/// Companion libraries that must sit next to the executable before launch.
/// The installer drops them at the storage root; staging copies them down.
pub const COMPANION_FILES: &[&str] = &["steamclient64.dll", "tier0_s64.dll", "vstdlib_s64.dll"];

/// Resolved paths for one storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerPaths {
    storage_root: PathBuf,
}

impl ServerPaths {
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
        }
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn executable(&self) -> PathBuf {
        self.storage_root.join(EXECUTABLE_REL)
    }

    pub fn binaries_dir(&self) -> PathBuf {
        self.storage_root.join(BINARIES_REL)
    }

    pub fn config_file(&self) -> PathBuf {
        self.storage_root.join(CONFIG_REL)
    }

    /// Where companion libraries are staged from: the storage root itself.
    pub fn companion_source_dir(&self) -> &Path {
        &self.storage_root
    }
}
