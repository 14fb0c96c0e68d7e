//! # Ranking Configuration
//!
//! Weights and time decay for the scoring engine.
//!
//! TOML shape (`config/ranking.toml`):
//! ```toml
//! version = "2024-q4"
//!
//! [weights]
//! sentiment_strength = 0.5
//! article_volume = 0.2
//! recency = 0.3
//!
//! [time_decay]
//! half_life_hours = 24.0
//! ```
//!
//! A `RankingConfig` can only be obtained through validation, so holding one
//! means the weights are non-negative, sum to 1.0 and the half-life is positive.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ConfigError;

// --- env defaults & names ---
pub const DEFAULT_RANKING_CONFIG_PATH: &str = "config/ranking.toml";
pub const ENV_RANKING_CONFIG_PATH: &str = "RANKING_CONFIG_PATH";
pub const ENV_HALF_LIFE_HOURS: &str = "RANKING_HALF_LIFE_HOURS";

pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

pub const KEY_SENTIMENT_STRENGTH: &str = "sentiment_strength";
pub const KEY_ARTICLE_VOLUME: &str = "article_volume";
pub const KEY_RECENCY: &str = "recency";

const WEIGHT_KEYS: [&str; 3] = [KEY_SENTIMENT_STRENGTH, KEY_ARTICLE_VOLUME, KEY_RECENCY];

const DEFAULT_VERSION: &str = "default";

/// Exponential recency decay parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeDecay {
    pub half_life_hours: f64,
}

/// Component weights of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weights {
    pub sentiment_strength: f64,
    pub article_volume: f64,
    pub recency: f64,
}

/// Unvalidated configuration as it comes out of TOML (or a caller).
#[derive(Debug, Clone, Deserialize)]
pub struct RawRankingConfig {
    #[serde(default)]
    pub version: Option<String>,
    pub weights: BTreeMap<String, f64>,
    pub time_decay: TimeDecay,
}

impl Default for RawRankingConfig {
    /// Sentiment-dominant weighting with a one-day half-life.
    fn default() -> Self {
        let weights = [
            (KEY_SENTIMENT_STRENGTH, 0.5),
            (KEY_ARTICLE_VOLUME, 0.2),
            (KEY_RECENCY, 0.3),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            version: None,
            weights,
            time_decay: TimeDecay {
                half_life_hours: 24.0,
            },
        }
    }
}

impl RawRankingConfig {
    /// Check keys, signs, sum and half-life. Any violation is fatal.
    pub fn validate(self) -> Result<RankingConfig, ConfigError> {
        let missing: Vec<String> = WEIGHT_KEYS
            .iter()
            .filter(|k| !self.weights.contains_key(**k))
            .map(|k| k.to_string())
            .collect();
        let unexpected: Vec<String> = self
            .weights
            .keys()
            .filter(|k| !WEIGHT_KEYS.contains(&k.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(ConfigError::WeightKeys {
                missing,
                unexpected,
            });
        }

        for (key, &value) in &self.weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeWeight {
                    key: key.clone(),
                    value,
                });
            }
        }

        let sum: f64 = self.weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum {
                sum,
                tolerance: WEIGHT_SUM_TOLERANCE,
            });
        }

        let half_life = self.time_decay.half_life_hours;
        if !half_life.is_finite() || half_life <= 0.0 {
            return Err(ConfigError::HalfLife(half_life));
        }

        let weights = Weights {
            sentiment_strength: self.weights[KEY_SENTIMENT_STRENGTH],
            article_volume: self.weights[KEY_ARTICLE_VOLUME],
            recency: self.weights[KEY_RECENCY],
        };

        Ok(RankingConfig {
            version: self
                .version
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            weights,
            time_decay: self.time_decay,
        })
    }

    /// Apply `RANKING_HALF_LIFE_HOURS` if set. An unparsable value is an error,
    /// not silently ignored.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = std::env::var(ENV_HALF_LIFE_HOURS) {
            let hours = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::Env {
                    var: ENV_HALF_LIFE_HOURS,
                    value: raw.clone(),
                })?;
            self.time_decay.half_life_hours = hours;
        }
        Ok(())
    }
}

/// Validated, immutable scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingConfig {
    version: String,
    weights: Weights,
    time_decay: TimeDecay,
}

impl Default for RankingConfig {
    fn default() -> Self {
        RawRankingConfig::default()
            .validate()
            .expect("built-in ranking config is valid")
    }
}

impl RankingConfig {
    /// Build from typed weights; goes through the same validation as files do.
    pub fn new(weights: Weights, half_life_hours: f64) -> Result<Self, ConfigError> {
        let raw = RawRankingConfig {
            version: None,
            weights: [
                (KEY_SENTIMENT_STRENGTH, weights.sentiment_strength),
                (KEY_ARTICLE_VOLUME, weights.article_volume),
                (KEY_RECENCY, weights.recency),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
            time_decay: TimeDecay { half_life_hours },
        };
        raw.validate()
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let raw: RawRankingConfig = toml::from_str(toml_str)?;
        raw.validate()
    }

    /// Load and validate a TOML file. No env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        read_raw(path)?.validate()
    }

    /// Load using env var + fallbacks:
    /// 1) $RANKING_CONFIG_PATH (must exist when set)
    /// 2) config/ranking.toml
    /// 3) built-in default
    ///
    /// `RANKING_HALF_LIFE_HOURS` overrides the decay before validation.
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut raw = match std::env::var(ENV_RANKING_CONFIG_PATH) {
            Ok(p) => read_raw(&PathBuf::from(p))?,
            Err(_) => {
                let default_path = PathBuf::from(DEFAULT_RANKING_CONFIG_PATH);
                if default_path.exists() {
                    read_raw(&default_path)?
                } else {
                    info!("no ranking config file found; using built-in defaults");
                    RawRankingConfig::default()
                }
            }
        };
        raw.apply_env_overrides()?;
        raw.validate()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn half_life_hours(&self) -> f64 {
        self.time_decay.half_life_hours
    }

    pub fn time_decay(&self) -> TimeDecay {
        self.time_decay
    }
}

fn read_raw(path: &Path) -> Result<RawRankingConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}
