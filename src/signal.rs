//! # Sentiment Signals
//! Typed, validated per-article records consumed by the scoring engine.
//!
//! Records are built only through validating constructors; out-of-range
//! confidence, unknown polarity/labels and empty headlines are rejected,
//! never clamped or coerced.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Discrete sentiment direction of a headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Negative,
    Neutral,
    Positive,
}

impl Polarity {
    /// Fixed label table: positive → +1, neutral → 0, negative → -1.
    /// Case-insensitive; surrounding whitespace is ignored.
    pub fn from_label(label: &str) -> Result<Self, ValidationError> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Polarity::Positive),
            "neutral" => Ok(Polarity::Neutral),
            "negative" => Ok(Polarity::Negative),
            _ => Err(ValidationError::UnknownLabel(label.to_string())),
        }
    }

    pub fn value(self) -> i8 {
        match self {
            Polarity::Negative => -1,
            Polarity::Neutral => 0,
            Polarity::Positive => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.value())
    }

    pub fn label(self) -> &'static str {
        match self {
            Polarity::Negative => "negative",
            Polarity::Neutral => "neutral",
            Polarity::Positive => "positive",
        }
    }
}

impl TryFrom<i64> for Polarity {
    type Error = ValidationError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            -1 => Ok(Polarity::Negative),
            0 => Ok(Polarity::Neutral),
            1 => Ok(Polarity::Positive),
            other => Err(ValidationError::InvalidPolarity(other)),
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-polarity article counts for one company.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentBreakdown {
    pub fn from_records(records: &[ArticleSentiment]) -> Self {
        records.iter().fold(Self::default(), |mut acc, r| {
            match r.polarity() {
                Polarity::Positive => acc.positive += 1,
                Polarity::Neutral => acc.neutral += 1,
                Polarity::Negative => acc.negative += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

/// Output of the sentiment classification collaborator for one headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// "positive" | "neutral" | "negative"
    pub label: String,
    /// Classifier confidence for `label`, expected in [0, 1].
    pub score: f64,
}

/// One validated article sentiment record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleSentiment {
    text: String,
    published_at: DateTime<Utc>,
    polarity: Polarity,
    confidence: f64,
}

impl ArticleSentiment {
    /// Validating factory over a numeric polarity (-1, 0, 1).
    pub fn new(
        text: impl Into<String>,
        published_at: DateTime<Utc>,
        polarity: i64,
        confidence: f64,
    ) -> Result<Self, ValidationError> {
        Self::with_polarity(text, published_at, Polarity::try_from(polarity)?, confidence)
    }

    pub fn with_polarity(
        text: impl Into<String>,
        published_at: DateTime<Utc>,
        polarity: Polarity,
        confidence: f64,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        // NaN fails the range check as well.
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ValidationError::ConfidenceOutOfRange(confidence));
        }
        Ok(Self {
            text,
            published_at,
            polarity,
            confidence,
        })
    }

    /// Build from a classifier label + score.
    pub fn from_label(
        text: impl Into<String>,
        published_at: DateTime<Utc>,
        label: &str,
        confidence: f64,
    ) -> Result<Self, ValidationError> {
        Self::with_polarity(text, published_at, Polarity::from_label(label)?, confidence)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// `confidence × polarity`, in [-1, 1].
    pub fn signed_confidence(&self) -> f64 {
        self.confidence * self.polarity.as_f64()
    }
}

/// Untyped record as received over the wire (e.g. `POST /score`).
///
/// Either `polarity` or `label` must be given; `polarity` wins when both are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArticle {
    pub text: String,
    /// ISO-8601 / RFC 3339 timestamp.
    pub published_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub confidence: f64,
}

impl RawArticle {
    pub fn validate(&self) -> Result<ArticleSentiment, ValidationError> {
        let published_at = parse_timestamp(&self.published_at)?;
        let polarity = match (self.polarity, self.label.as_deref()) {
            (Some(p), _) => Polarity::try_from(p)?,
            (None, Some(label)) => Polarity::from_label(label)?,
            (None, None) => return Err(ValidationError::UnknownLabel(String::new())),
        };
        ArticleSentiment::with_polarity(self.text.clone(), published_at, polarity, self.confidence)
    }
}

/// Validate a whole batch; the first bad record rejects everything.
pub fn validate_batch(raw: &[RawArticle]) -> Result<Vec<ArticleSentiment>, ValidationError> {
    raw.iter()
        .enumerate()
        .map(|(index, r)| {
            r.validate().map_err(|e| ValidationError::InBatch {
                index,
                source: Box::new(e),
            })
        })
        .collect()
}

/// Parse an ISO-8601 timestamp. RFC 3339 with offset is preferred; a bare
/// `YYYY-MM-DDTHH:MM:SS[.f]` is taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ValidationError> {
    let t = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| ValidationError::InvalidTimestamp(s.to_string()))
}
