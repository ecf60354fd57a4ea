use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, info};

// =============================================================================
// Defaults
// =============================================================================

/// Default number of registry lookups allowed in flight per resolution
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Timeout for a single registry lookup in milliseconds (30 seconds)
pub const LOOKUP_TIMEOUT_MS: u64 = 30_000;

/// Default address the HTTP server listens on
pub const DEFAULT_LISTEN: &str = "0.0.0.0:3000";

/// Default manifest path inside a repository
pub const DEFAULT_MANIFEST_PATH: &str = "package.json";

/// User agent sent to GitHub and npm
pub const USER_AGENT: &str = "depstale";

pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";
pub const DEFAULT_NPM_URL: &str = "https://registry.npmjs.org";

/// Service configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub github: GitHubConfig,
    pub registry: RegistryConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

/// Source host (GitHub contents API) configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitHubConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub manifest_path: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GITHUB_URL.to_string(),
            token: None,
            manifest_path: DEFAULT_MANIFEST_PATH.to_string(),
        }
    }
}

/// How latest versions are looked up
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    /// npm registry HTTP API
    #[default]
    Http,
    /// `npm view <name> version` subprocess
    Cli,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    pub kind: RegistryKind,
    pub base_url: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            kind: RegistryKind::Http,
            base_url: DEFAULT_NPM_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Maximum registry lookups in flight for one resolution
    pub concurrency: usize,
    /// Per-lookup timeout in milliseconds
    pub lookup_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            lookup_timeout_ms: LOOKUP_TIMEOUT_MS,
        }
    }
}

impl ServiceConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default config file is
    /// read if present and defaults are used otherwise. `GH_TOKEN` and `PORT`
    /// override the file in both cases.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = config_path();
                if default_path.is_file() {
                    Self::from_file(&default_path)?
                } else {
                    debug!("No config file at {:?}, using defaults", default_path);
                    Self::default()
                }
            }
        };

        config.apply_env(
            std::env::var("GH_TOKEN").ok(),
            std::env::var("PORT").ok(),
        )?;
        Ok(config)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    fn apply_env(&mut self, token: Option<String>, port: Option<String>) -> anyhow::Result<()> {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.github.token = Some(token);
        }

        if let Some(port) = port.filter(|p| !p.is_empty()) {
            let port: u16 = port
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", port))?;
            let mut addr = self.listen_addr()?;
            addr.set_port(port);
            self.server.listen = addr.to_string();
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .listen
            .parse()
            .with_context(|| format!("Invalid listen address: {}", self.server.listen))
    }
}

/// Returns the path to the config directory for depstale.
/// Uses $XDG_CONFIG_HOME/depstale if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/depstale,
/// or ./depstale if neither is available.
pub fn config_dir() -> PathBuf {
    dir_with_env(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
        ".config",
    )
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Returns the path to the data directory (log files).
pub fn data_dir() -> PathBuf {
    dir_with_env(
        std::env::var("XDG_DATA_HOME").ok(),
        dirs::home_dir(),
        ".local/share",
    )
}

fn dir_with_env(xdg_home: Option<String>, home_dir: Option<PathBuf>, fallback: &str) -> PathBuf {
    let base = xdg_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(fallback)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join("depstale")
}
