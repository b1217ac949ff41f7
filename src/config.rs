use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use url::Url;

use crate::diff::BootstrapPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub state: StateConfig,

    #[serde(default)]
    pub diff: DiffConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_source_name")]
    pub name: String,
    #[serde(default = "default_source_url")]
    pub url: String,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Where the marker, snapshot and report live between runs.
#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default = "default_marker_path")]
    pub marker_path: PathBuf,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiffConfig {
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,
    #[serde(default)]
    pub bootstrap: BootstrapPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Defaults
fn default_source_name() -> String {
    "Phishing Army Extended Blocklist".to_string()
}
fn default_source_url() -> String {
    "https://phishing.army/download/phishing_army_blocklist_extended.txt".to_string()
}
fn default_probe_timeout() -> u64 {
    30
}
fn default_fetch_timeout() -> u64 {
    60
}
fn default_max_body_bytes() -> u64 {
    64 * 1024 * 1024
}
fn default_user_agent() -> String {
    concat!("blockwatch/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_marker_path() -> PathBuf {
    PathBuf::from("last_modified.txt")
}
fn default_snapshot_path() -> PathBuf {
    PathBuf::from("phishing_army_cache.txt")
}
fn default_report_path() -> PathBuf {
    PathBuf::from("phishing_army_NEW_last_3_hours.txt")
}
fn default_comment_prefix() -> String {
    "#".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            name: default_source_name(),
            url: default_source_url(),
            probe_timeout_secs: default_probe_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
            max_body_bytes: default_max_body_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            marker_path: default_marker_path(),
            snapshot_path: default_snapshot_path(),
            report_path: default_report_path(),
        }
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            comment_prefix: default_comment_prefix(),
            bootstrap: BootstrapPolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SourceConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.source.url)
            .with_context(|| format!("Invalid source url '{}'", self.source.url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("Source url must be http or https, got '{}'", url.scheme());
        }
        if self.source.probe_timeout_secs == 0 || self.source.fetch_timeout_secs == 0 {
            bail!("Network timeouts must be at least one second");
        }
        if self.source.max_body_bytes == 0 {
            bail!("max_body_bytes must be greater than zero");
        }
        let prefix = &self.diff.comment_prefix;
        if prefix.trim().is_empty() {
            bail!("comment_prefix must not be empty");
        }
        // Lines are trimmed before matching, so padding would never match.
        if prefix.trim() != prefix {
            bail!("comment_prefix must not start or end with whitespace");
        }
        Ok(())
    }
}
