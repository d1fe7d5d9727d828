//! TOML configuration with environment overrides.
//!
//! ```toml
//! [search]
//! documents_url = "http://localhost:10001/api/search/documents"
//! chunks_url = "http://localhost:10001/api/search/chunks"
//! default_threshold = 0.7
//! timeout_secs = 30
//!
//! [server]
//! bind = "127.0.0.1:7341"
//! ```
//!
//! Every field is optional. After the file is read, endpoint URLs may be
//! replaced from the environment (see [`crate::endpoints`]).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::client::DEFAULT_TIMEOUT;
use crate::endpoints::{Endpoints, DEFAULT_CHUNKS_URL, DEFAULT_DOCUMENTS_URL};
use crate::models::DEFAULT_THRESHOLD;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_documents_url")]
    pub documents_url: String,
    #[serde(default = "default_chunks_url")]
    pub chunks_url: String,
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            documents_url: default_documents_url(),
            chunks_url: default_chunks_url(),
            default_threshold: DEFAULT_THRESHOLD,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_documents_url() -> String {
    DEFAULT_DOCUMENTS_URL.to_string()
}
fn default_chunks_url() -> String {
    DEFAULT_CHUNKS_URL.to_string()
}
fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.search.documents_url, &self.search.chunks_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.search.timeout_secs)
    }

    /// Replace endpoint URLs from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoints = self.endpoints().with_overrides(lookup);
        self.search.documents_url = endpoints.documents;
        self.search.chunks_url = endpoints.chunks;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.search.default_threshold) {
            anyhow::bail!("search.default_threshold must be in [0.0, 1.0]");
        }
        if self.search.timeout_secs == 0 {
            anyhow::bail!("search.timeout_secs must be > 0");
        }
        if self.search.documents_url.trim().is_empty() {
            anyhow::bail!("search.documents_url must not be empty");
        }
        if self.search.chunks_url.trim().is_empty() {
            anyhow::bail!("search.chunks_url must not be empty");
        }
        if self.server.bind.trim().is_empty() {
            anyhow::bail!("server.bind must not be empty");
        }
        Ok(())
    }
}

/// Load, apply environment overrides, and validate.
///
/// A missing file is not an error: defaults are used instead.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str::<Config>(&content).with_context(|| "Failed to parse config file")?
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Config::minimal()
    };

    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}
