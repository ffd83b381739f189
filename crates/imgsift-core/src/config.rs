use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::collect::{CollectSettings, DEFAULT_GIVE_UP_FACTOR, DEFAULT_TARGET};
use crate::fetch::{HttpOptions, DEFAULT_USER_AGENT, MIN_TIMEOUT};

/// Default store directory, relative to the working directory.
pub const DEFAULT_STORE_DIR: &str = "downloaded_images";

/// HTTP settings (optional `[http]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout per attempt, in seconds. 0 is raised to 1.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Overrides the built-in browser user agent.
    pub user_agent: Option<String>,
    /// Extra request headers; same-named defaults are replaced.
    pub extra_headers: BTreeMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 15,
            user_agent: None,
            extra_headers: BTreeMap::new(),
        }
    }
}

/// Global configuration loaded from `~/.config/imgsift/config.toml`.
/// Every field is optional in the file; CLI flags override it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImgsiftConfig {
    /// Endpoint used when none is given on the command line.
    pub endpoint: Option<String>,
    /// Number of unique images to collect.
    pub count: u32,
    /// Seconds to wait between attempts.
    pub delay_secs: f64,
    /// Directory images are stored in.
    pub store_dir: PathBuf,
    /// Give up after more than `count * give_up_factor` attempts. 0 is read as 1.
    pub give_up_factor: u32,
    pub http: HttpConfig,
}

impl Default for ImgsiftConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            count: DEFAULT_TARGET,
            delay_secs: 2.0,
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            give_up_factor: DEFAULT_GIVE_UP_FACTOR,
            http: HttpConfig::default(),
        }
    }
}

impl ImgsiftConfig {
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs.max(0.0)).unwrap_or(Duration::ZERO)
    }

    pub fn collect_settings(&self) -> CollectSettings {
        CollectSettings {
            target: self.count,
            delay: self.delay(),
            give_up_factor: self.give_up_factor.max(1),
        }
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: Duration::from_secs(self.http.timeout_secs).max(MIN_TIMEOUT),
            connect_timeout: Duration::from_secs(self.http.connect_timeout_secs).max(MIN_TIMEOUT),
            user_agent: self
                .http
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            extra_headers: self
                .http
                .extra_headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// Parse and check an endpoint URL (http or https only).
pub fn validate_endpoint(endpoint: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(endpoint.trim())
        .with_context(|| format!("invalid endpoint URL {:?}", endpoint))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => anyhow::bail!("unsupported URL scheme {:?} (expected http or https)", other),
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgsift")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<ImgsiftConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: ImgsiftConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ImgsiftConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ImgsiftConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}
