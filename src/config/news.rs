// src/config/news.rs
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_NEWS_API_BASE_URL: &str = "NEWS_API_BASE_URL";
pub const ENV_NEWS_CONFIG_PATH: &str = "NEWS_CONFIG_PATH";

fn default_base_url() -> String {
    "https://newsapi.org/v2".to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_page_size() -> u32 {
    100
}
fn default_timeout_secs() -> u64 {
    10
}

/// Settings for the news search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// "ENV" means: read from NEWS_API_KEY
    pub api_key: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// NewsAPI caps this at 100.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl NewsApiConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading news config from {}", path.display()))?;
        let mut cfg: NewsApiConfig = toml::from_str(&data)?;

        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = env::var(ENV_NEWS_API_KEY)
                .map_err(|_| anyhow::anyhow!("Missing {ENV_NEWS_API_KEY} env var"))?;
        }
        Ok(cfg.sanitized())
    }

    /// Build from environment only: NEWS_API_KEY (required), NEWS_API_BASE_URL (optional).
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var(ENV_NEWS_API_KEY)
            .map_err(|_| anyhow::anyhow!("Missing {ENV_NEWS_API_KEY} env var"))?;
        let base_url = env::var(ENV_NEWS_API_BASE_URL).unwrap_or_else(|_| default_base_url());
        Ok(Self {
            base_url,
            api_key,
            language: default_language(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
        }
        .sanitized())
    }

    /// $NEWS_CONFIG_PATH (TOML, must exist when set) → environment only.
    pub fn load_default() -> anyhow::Result<Self> {
        match env::var(ENV_NEWS_CONFIG_PATH) {
            Ok(p) => Self::load_from_file(p),
            Err(_) => Self::from_env(),
        }
    }

    fn sanitized(mut self) -> Self {
        self.page_size = self.page_size.clamp(1, 100);
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        self
    }
}
