// src/config/feed.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::alerts::{default_rules, AlertRule};

pub const DEFAULT_FEED_CONFIG_PATH: &str = "config/feed.toml";
pub const DEFAULT_FEED_URL: &str = "https://finans.truncgil.com/today.json";

pub const ENV_FEED_CONFIG_PATH: &str = "FEED_CONFIG_PATH";
pub const ENV_FEED_URL: &str = "FEED_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "FEED_POLL_INTERVAL_MS";
pub const ENV_TIMEOUT_MS: &str = "FEED_TIMEOUT_MS";

fn default_url() -> String {
    DEFAULT_FEED_URL.to_string()
}
fn default_poll_interval_ms() -> u64 {
    30_000
}
fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_rules")]
    pub alerts: Vec<AlertRule>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_timeout_ms(),
            alerts: default_rules(),
        }
    }
}

impl FeedConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: FeedConfig = toml::from_str(s).context("parsing feed config toml")?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading feed config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Resolve config using env var + fallbacks, then apply env overrides:
    /// 1) $FEED_CONFIG_PATH
    /// 2) config/feed.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_FEED_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("FEED_CONFIG_PATH points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_FEED_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from_file(&default_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        cfg.sanitize();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_FEED_URL) {
            if !url.trim().is_empty() {
                self.url = url.trim().to_string();
            }
        }
        if let Some(ms) = parse_ms_env(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = ms;
        }
        if let Some(ms) = parse_ms_env(ENV_TIMEOUT_MS) {
            self.timeout_ms = ms;
        }
    }

    fn sanitize(&mut self) {
        if self.poll_interval_ms == 0 {
            self.poll_interval_ms = default_poll_interval_ms();
        }
        if self.timeout_ms == 0 {
            self.timeout_ms = default_timeout_ms();
        }
        self.alerts
            .retain(|a| a.target_price.is_finite() && !a.instrument_key.trim().is_empty());
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn parse_ms_env(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
}
