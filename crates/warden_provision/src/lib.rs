//! Config provisioning: materialize a usable `GameUserSettings.ini` for a
//! server instance before its first start.
//!
//! The provisioner downloads a stock template from a fixed remote location,
//! writes it to the instance's config path, and rewrites the placeholder
//! tokens with live settings. It always replaces, never merges: re-running
//! provision yields the same substituted file as running it once.
//!
//! Network failure is absorbed, not propagated: the server can still be
//! started without a config file, so a failed download degrades to a logged
//! warning and a [`ProvisionOutcome::TemplateUnavailable`] the host can act
//! on. Filesystem failures are real errors.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use warden_settings::defaults::CONFIG_TEMPLATE_URL;
use warden_settings::ServerSettings;

/// Placeholder tokens in the stock template. Literal, non-overlapping,
/// replaced in a single pass with no recursive expansion.
pub const PLACEHOLDER_SESSION_NAME: &str = "{{session_name}}";
pub const PLACEHOLDER_RCON_PORT: &str = "{{rcon_port}}";
pub const PLACEHOLDER_MAX_PLAYERS: &str = "{{max_players}}";

/// Transport-level bound on the template download. On expiry the download
/// counts as failed like any other network error.
const TEMPLATE_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Config file I/O failed at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What provisioning achieved. `TemplateUnavailable` means the download did
/// not produce a file (network failure, bad status, timeout); the two cases
/// are deliberately distinguishable so the host does not have to probe the
/// filesystem to learn what happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// Template downloaded and substituted; the config file is in place.
    Provisioned,
    /// Download failed; no config file exists at the target path.
    TemplateUnavailable,
}

impl ProvisionOutcome {
    /// The boolean the host ultimately cares about: is there a usable
    /// config file at the target path?
    pub fn is_provisioned(&self) -> bool {
        matches!(self, ProvisionOutcome::Provisioned)
    }
}

/// Stateless config provisioner. One instance serves any number of servers;
/// each call works purely from the passed-in settings.
pub struct Provisioner {
    client: reqwest::Client,
    template_url: String,
}

impl Provisioner {
    pub fn new() -> Self {
        Self::with_template_url(CONFIG_TEMPLATE_URL)
    }

    /// Override the template location. Exists for tests; production callers
    /// use [`Provisioner::new`] and the fixed URL.
    pub fn with_template_url(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(TEMPLATE_FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            template_url: url.into(),
        }
    }

    /// Provision the config file for one server instance.
    ///
    /// Creates parent directories, deletes any previous file, downloads the
    /// template, and substitutes the placeholder tokens in place.
    pub async fn provision(
        &self,
        settings: &ServerSettings,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        let target = settings.paths().config_file();

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ProvisionError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // Always replace, never merge.
        if target.exists() {
            std::fs::remove_file(&target).map_err(|source| ProvisionError::Io {
                path: target.clone(),
                source,
            })?;
        }

        if !self.download_template(&target).await? {
            return Ok(ProvisionOutcome::TemplateUnavailable);
        }

        let template = std::fs::read_to_string(&target).map_err(|source| ProvisionError::Io {
            path: target.clone(),
            source,
        })?;
        let substituted = substitute(&template, settings);
        std::fs::write(&target, substituted).map_err(|source| ProvisionError::Io {
            path: target.clone(),
            source,
        })?;

        info!(
            "[Server {}] Provisioned config at {}",
            settings.id,
            target.display()
        );
        Ok(ProvisionOutcome::Provisioned)
    }

    /// Fetch the template into `target`. Network and HTTP-status failures
    /// are logged and reported as `Ok(false)`; only writing the body to
    /// disk can produce a hard error.
    async fn download_template(&self, target: &Path) -> Result<bool, ProvisionError> {
        let body = match self.fetch_body().await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    "Config template download from {} failed: {}",
                    self.template_url, e
                );
                return Ok(false);
            }
        };

        std::fs::write(target, &body).map_err(|source| ProvisionError::Io {
            path: target.to_path_buf(),
            source,
        })?;
        Ok(true)
    }

    async fn fetch_body(&self) -> Result<Vec<u8>, reqwest::Error> {
        let response = self
            .client
            .get(&self.template_url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

impl Default for Provisioner {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace every placeholder token with its settings value. Single literal
/// pass; tokens never overlap, so order does not matter.
pub fn substitute(template: &str, settings: &ServerSettings) -> String {
    let rcon_port = settings
        .query_port
        .map(|p| p.to_string())
        .unwrap_or_default();
    template
        .replace(PLACEHOLDER_SESSION_NAME, &settings.session_name)
        .replace(PLACEHOLDER_RCON_PORT, &rcon_port)
        .replace(PLACEHOLDER_MAX_PLAYERS, &settings.max_players.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use warden_settings::ServerId;

    fn settings() -> ServerSettings {
        let mut s = ServerSettings::with_defaults(ServerId::new(1), PathBuf::from("/srv/dnl/1"));
        s.session_name = "Arena1".to_string();
        s.query_port = Some(27016);
        s.max_players = 70;
        s
    }

    #[test]
    fn substitute_replaces_each_documented_token() {
        let out = substitute(
            "name={{session_name}} rcon={{rcon_port}} max={{max_players}}",
            &settings(),
        );
        assert_eq!(out, "name=Arena1 rcon=27016 max=70");
    }

    #[test]
    fn substitute_replaces_repeated_tokens() {
        let out = substitute("{{session_name}} + {{session_name}}", &settings());
        assert_eq!(out, "Arena1 + Arena1");
    }

    #[test]
    fn substitute_leaves_token_free_text_unchanged() {
        let template = "[ServerSettings]\nDifficultyOffset=1.0\n";
        assert_eq!(substitute(template, &settings()), template);
    }

    #[test]
    fn substitute_with_no_query_port_yields_empty_value() {
        let mut s = settings();
        s.query_port = None;
        assert_eq!(substitute("rcon={{rcon_port}};", &s), "rcon=;");
    }

    #[test]
    fn outcome_boolean_matches_variant() {
        assert!(ProvisionOutcome::Provisioned.is_provisioned());
        assert!(!ProvisionOutcome::TemplateUnavailable.is_provisioned());
    }
}
