//! Shared plain-data types for Warden.
//!
//! Everything here is inert data: the read-only settings record handed to us
//! by the host orchestrator, canonical default values, and the fixed layout
//! of a server instance's storage root. No I/O, no behavior beyond path
//! arithmetic.

pub mod defaults;
pub mod paths;

pub use paths::ServerPaths;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Identifier for one managed server instance.
///
/// Assigned by the host; Warden only threads it through (console lines are
/// keyed by it, log messages mention it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(pub u64);

impl ServerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only settings record for one server instance.
///
/// Owned by the host; Warden never mutates or persists it. Every operation
/// takes it explicitly so there is no ambient instance state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub id: ServerId,
    /// Human-facing session name, substituted into the config template.
    pub session_name: String,
    /// Bind address passed as the MultiHome segment.
    pub address: String,
    /// Game port. None means "not configured": the MultiHome and Port
    /// segments are omitted from the launch command line.
    pub port: Option<u16>,
    /// Query/RCON port, substituted into the config template.
    pub query_port: Option<u16>,
    /// Map name. Empty means no map segment (and no listen flag).
    pub map: String,
    pub max_players: u32,
    /// Freeform extra launch parameters, passed through verbatim. The host
    /// owns this string's syntax; Warden does not validate it.
    pub extra_params: String,
    /// Root of this instance's installed files and runtime state.
    pub storage_root: PathBuf,
}

impl ServerSettings {
    /// A settings record with the game's stock values, suitable as a
    /// starting point for a fresh instance.
    pub fn with_defaults(id: ServerId, storage_root: PathBuf) -> Self {
        Self {
            id,
            session_name: String::new(),
            address: defaults::DEFAULT_BIND_ADDRESS.to_string(),
            port: Some(defaults::DEFAULT_PORT),
            query_port: Some(defaults::DEFAULT_QUERY_PORT),
            map: defaults::DEFAULT_MAP.to_string(),
            max_players: defaults::DEFAULT_MAX_PLAYERS,
            extra_params: String::new(),
            storage_root,
        }
    }

    /// Fixed filesystem layout rooted at this instance's storage root.
    pub fn paths(&self) -> ServerPaths {
        ServerPaths::new(&self.storage_root)
    }
}
