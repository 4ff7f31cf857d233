use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::petition::TransitionPolicy;

pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Pause between a successful create and showing the list.
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub transition_policy: TransitionPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            redirect_delay_ms: default_redirect_delay_ms(),
            timeout_secs: default_timeout_secs(),
            transition_policy: TransitionPolicy::default(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub const fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

const fn default_redirect_delay_ms() -> u64 {
    2000
}

const fn default_timeout_secs() -> u64 {
    30
}

/// Client home directory: `$PETITIONS_HOME`, else `<config_dir>/petitions`.
#[must_use]
pub fn petitions_home() -> PathBuf {
    home_from(
        env::var("PETITIONS_HOME").ok().filter(|v| !v.is_empty()),
        dirs::config_dir(),
    )
}

fn home_from(env_home: Option<String>, config_dir: Option<PathBuf>) -> PathBuf {
    if let Some(home) = env_home {
        return PathBuf::from(home);
    }
    config_dir.map_or_else(|| PathBuf::from(".petitions"), |dir| dir.join("petitions"))
}

/// Load `config.toml` from `home`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_client_config(home: &Path) -> Result<ClientConfig> {
    let path = home.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ClientConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ClientConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Effective configuration: file values, then `PETITIONS_API_URL`, then the
/// explicit flag.
///
/// # Errors
///
/// See [`load_client_config`].
pub fn resolve_config(home: &Path, cli_api_url: Option<&str>) -> Result<ClientConfig> {
    let mut config = load_client_config(home)?;
    let env_url = env::var("PETITIONS_API_URL").ok();
    config.api_url = resolve_api_url(cli_api_url, env_url.as_deref(), &config.api_url);
    Ok(config)
}

fn resolve_api_url(cli: Option<&str>, env: Option<&str>, file: &str) -> String {
    let pick = [cli, env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or(file);
    pick.trim_end_matches('/').to_string()
}
