// src/config.rs
//! Runtime configuration: engine limits, HTTP client settings and the ordered
//! source list. Loaded from TOML with env overrides; every field has a default
//! so an absent file means "run with all six providers".

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "GRIP_CONFIG_PATH";
pub const ENV_DEADLINE_MS: &str = "GRIP_DEADLINE_MS";
pub const ENV_CAPACITY: &str = "GRIP_CAPACITY";
pub const DEFAULT_CONFIG_PATH: &str = "config/grip.toml";

fn default_query() -> String {
    "golang".to_string()
}
fn default_deadline_ms() -> u64 {
    2_000
}
fn default_capacity() -> usize {
    20
}
fn default_timeout_secs() -> u64 {
    5
}
fn default_user_agent() -> String {
    "GripAggregator/1.0".to_string()
}
fn default_sources() -> Vec<SourceSpec> {
    [
        SourceKind::Devto,
        SourceKind::Hackernews,
        SourceKind::Hashnode,
        SourceKind::Freecodecamp,
        SourceKind::Lobsters,
        SourceKind::Bootdev,
    ]
    .into_iter()
    .map(|kind| SourceSpec {
        kind,
        base_url: None,
    })
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct GripConfig {
    /// Used when a request or CLI call supplies no query.
    #[serde(default = "default_query")]
    pub default_query: String,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Ceiling for one whole collect call, not per source.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Devto,
    Hackernews,
    Hashnode,
    Freecodecamp,
    Lobsters,
    Bootdev,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    pub kind: SourceKind,
    /// Override the provider endpoint (mirrors, tests).
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deadline_ms: default_deadline_ms(),
            capacity: default_capacity(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for GripConfig {
    fn default() -> Self {
        Self {
            default_query: default_query(),
            engine: EngineConfig::default(),
            http: HttpConfig::default(),
            sources: default_sources(),
        }
    }
}

impl GripConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: GripConfig = toml::from_str(s).context("parsing grip config toml")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from an explicit path, then apply env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading grip config from {}", path.display()))?;
        let mut cfg = Self::from_toml_str(&content)?;
        cfg.apply_env()?;
        Ok(cfg)
    }

    /// Resolve the config using env var + fallbacks:
    /// 1) $GRIP_CONFIG_PATH (must exist)
    /// 2) config/grip.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        let mut cfg = Self::default();
        cfg.apply_env()?;
        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var(ENV_DEADLINE_MS) {
            self.engine.deadline_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_DEADLINE_MS}={raw:?} is not a number"))?;
        }
        if let Ok(raw) = std::env::var(ENV_CAPACITY) {
            self.engine.capacity = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_CAPACITY}={raw:?} is not a number"))?;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.engine.deadline_ms == 0 {
            bail!("engine.deadline_ms must be > 0");
        }
        if self.engine.capacity == 0 {
            bail!("engine.capacity must be > 0");
        }
        if self.http.timeout_secs == 0 {
            bail!("http.timeout_secs must be > 0");
        }
        Ok(())
    }
}
