//! Error taxonomy shared by the scoring core and its collaborators.
//!
//! - `ValidationError`: a single input record is malformed. Rejected before scoring.
//! - `ConfigError`: the ranking/sector configuration is unusable. Fatal at load time.
//! - `FetchError`: an external collaborator (news search, classifier) failed for one
//!   company. The ranking engine isolates these per company.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("article text is empty")]
    EmptyText,
    #[error("confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),
    #[error("polarity {0} is not one of -1, 0, 1")]
    InvalidPolarity(i64),
    #[error("unknown sentiment label `{0}`")]
    UnknownLabel(String),
    #[error("unparseable timestamp `{0}`")]
    InvalidTimestamp(String),
    #[error("record {index}: {source}")]
    InBatch {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("weight keys must be exactly {{sentiment_strength, article_volume, recency}}; missing {missing:?}, unexpected {unexpected:?}")]
    WeightKeys {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    #[error("weight `{key}` must be finite and non-negative, got {value}")]
    NegativeWeight { key: String, value: f64 },
    #[error("weights must sum to 1.0 (tolerance {tolerance}), got {sum}")]
    WeightSum { sum: f64, tolerance: f64 },
    #[error("time_decay.half_life_hours must be positive, got {0}")]
    HalfLife(f64),
    #[error("sector multiplier for `{sector}` must be finite and non-negative, got {value}")]
    SectorMultiplier { sector: String, value: f64 },
    #[error("invalid value for {var}: `{value}`")]
    Env { var: &'static str, value: String },
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("decoding response: {0}")]
    Decode(String),
    #[error("classification failed: {0}")]
    Classification(String),
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] ValidationError),
    #[error("scoring task aborted: {0}")]
    Aborted(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Upstream {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            FetchError::Network(e.to_string())
        }
    }
}
