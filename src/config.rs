//! Dashboard configuration.
//!
//! Resolution order, lowest to highest precedence: built-in defaults, the
//! TOML config file, `NINOUT_*` environment variables, command-line flags.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_ROW_LIMIT: u64 = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

pub const ENV_API_URL: &str = "NINOUT_API_URL";
pub const ENV_REFRESH_MS: &str = "NINOUT_REFRESH_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    /// Base URL of the run API (the `/api/...` prefix is appended)
    pub api_url: String,
    /// Period of the silent background refresh
    pub refresh_interval_ms: u64,
    /// Row window for the one-shot `rows` command
    pub row_limit: u64,
    /// Upper bound on a single request, connect + transfer
    pub request_timeout_secs: u64,
    /// Log file for the full-screen dashboard
    pub log_file: Option<PathBuf>,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            row_limit: DEFAULT_ROW_LIMIT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_file: None,
        }
    }
}

/// Values supplied on the command line; `None` leaves the lower layer as is.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub refresh_interval_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl DashConfig {
    /// Default config file location: `<config dir>/ninout/dash.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ninout").join("dash.toml"))
    }

    /// Default log file for the dashboard: `<data dir>/ninout/dash.log`.
    pub fn default_log_file() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("ninout").join("dash.log"))
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Resolve the effective config.
    ///
    /// An explicit `path` must exist and parse. Without one, the default
    /// location is used when present and silently skipped otherwise.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.is_file() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };

        config.apply_env()?;
        config.apply_overrides(overrides);
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                self.api_url = url;
            }
        }

        if let Ok(raw) = env::var(ENV_REFRESH_MS) {
            self.refresh_interval_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {ENV_REFRESH_MS} value: {raw}"))?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.api_url {
            self.api_url = url.clone();
        }
        if let Some(ms) = overrides.refresh_interval_ms {
            self.refresh_interval_ms = ms;
        }
        if let Some(path) = &overrides.log_file {
            self.log_file = Some(path.clone());
        }
    }

    /// Background refresh period, never shorter than 100ms.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(100))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
