use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the weather API lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout_secs: default_timeout_secs() }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [api]
    /// base_url = "http://localhost:8000"
    /// timeout_secs = 10
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    /// Validate and store the API base URL. Trailing slashes are dropped.
    pub fn set_base_url(&mut self, url: &str) -> Result<()> {
        let trimmed = url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).with_context(|| format!("Invalid base URL '{url}'"))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("Base URL '{url}' must use http or https");
        }

        self.api.base_url = trimmed.to_string();
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs.max(1))
    }

    pub fn set_timeout_secs(&mut self, secs: u64) -> Result<()> {
        if secs == 0 {
            bail!("Request timeout must be at least one second");
        }
        self.api.timeout_secs = secs;
        Ok(())
    }

    /// Settings from the platform config dir; defaults until `configure` saves some.
    pub fn load() -> Result<Self> {
        Self::read_from(&Self::config_file_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.write_to(&Self::config_file_path()?)
    }

    /// A missing file means defaults. A hand-edited base URL goes through the
    /// same checks as [`set_base_url`](Self::set_base_url).
    pub fn read_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Cannot read dashboard settings at {}", path.display()));
            }
        };

        let mut cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Dashboard settings at {} are not valid TOML", path.display()))?;
        let base_url = cfg.api.base_url.clone();
        cfg.set_base_url(&base_url)
            .with_context(|| format!("Bad [api] base_url in {}", path.display()))?;

        Ok(cfg)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create settings directory {}", dir.display()))?;
        }

        let body = toml::to_string_pretty(self).context("Cannot encode dashboard settings")?;
        fs::write(path, body)
            .with_context(|| format!("Cannot write dashboard settings to {}", path.display()))
    }

    /// `<platform config dir>/weather-dashboard/config.toml`.
    pub fn config_file_path() -> Result<PathBuf> {
        ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or_else(|| anyhow!("No home directory; cannot locate dashboard settings"))
    }
}
