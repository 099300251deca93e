// src/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::DEFAULT_USER_AGENT;
use crate::model::SiteConfig;

pub const ENV_CONFIG_PATH: &str = "TRACKER_CONFIG_PATH";
pub const ENV_INTERVAL_MINUTES: &str = "TRACKER_INTERVAL_MINUTES";
pub const ENV_POLITENESS_DELAY_SECS: &str = "TRACKER_POLITENESS_DELAY_SECS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "TRACKER_FETCH_TIMEOUT_SECS";
pub const ENV_STATE_PATH: &str = "TRACKER_STATE_PATH";

pub const DEFAULT_STATE_PATH: &str = "state/tracker_state.json";

fn default_interval_minutes() -> u64 {
    30
}
fn default_politeness_delay_secs() -> u64 {
    2
}
fn default_fetch_timeout_secs() -> u64 {
    15
}
fn default_state_path() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_PATH)
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Static startup configuration. Not mutated after boot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackerConfig {
    /// Sweep order is the order listed here.
    pub sites: Vec<SiteConfig>,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    /// Pause between consecutive site fetches within one sweep.
    #[serde(default = "default_politeness_delay_secs")]
    pub politeness_delay_secs: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sites: default_sites(),
            interval_minutes: default_interval_minutes(),
            politeness_delay_secs: default_politeness_delay_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            state_path: default_state_path(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_sites() -> Vec<SiteConfig> {
    vec![
        SiteConfig::new("Simply Mary", "https://simplymary.co/"),
        SiteConfig::new("Hello Mary", "https://shophellomary.com/"),
        SiteConfig::new("Crysp", "https://crysp.co/"),
        SiteConfig::new("Southern Harvest Hemp", "https://southernharvesthemp.com/"),
        SiteConfig::new("Quantum Exotics", "https://www.quantumexotics.com/"),
    ]
}

impl TrackerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_secs(self.politeness_delay_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Load from an explicit path. TOML or JSON, chosen by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading tracker config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: TrackerConfig = match ext.as_str() {
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("parsing JSON config {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("parsing TOML config {}", path.display()))?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolve config using env var + fallbacks, then apply env overrides:
    /// 1) $TRACKER_CONFIG_PATH
    /// 2) config/tracker.toml
    /// 3) config/tracker.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let toml_p = PathBuf::from("config/tracker.toml");
            let json_p = PathBuf::from("config/tracker.json");
            if toml_p.exists() {
                Self::load_from(&toml_p)?
            } else if json_p.exists() {
                Self::load_from(&json_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_u64(ENV_INTERVAL_MINUTES) {
            self.interval_minutes = v;
        }
        if let Some(v) = env_u64(ENV_POLITENESS_DELAY_SECS) {
            self.politeness_delay_secs = v;
        }
        if let Some(v) = env_u64(ENV_FETCH_TIMEOUT_SECS) {
            self.fetch_timeout_secs = v;
        }
        if let Ok(p) = std::env::var(ENV_STATE_PATH) {
            if !p.trim().is_empty() {
                self.state_path = PathBuf::from(p.trim());
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_minutes == 0 {
            bail!("interval_minutes must be at least 1");
        }
        if self.fetch_timeout_secs == 0 {
            bail!("fetch_timeout_secs must be at least 1");
        }
        let mut seen = HashSet::new();
        for s in &self.sites {
            if s.name.trim().is_empty() || s.url.trim().is_empty() {
                bail!("site entries need a non-empty name and url");
            }
            if !seen.insert(s.url.as_str()) {
                bail!("duplicate site url: {}", s.url);
            }
        }
        Ok(())
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
