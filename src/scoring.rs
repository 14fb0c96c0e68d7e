//! # Scoring Engine
//! Pure mapping `(articles, config, now)` → `ScoreComponents`. No I/O.
//!
//! Three signals are combined:
//! - `sentiment_strength`: mean of `confidence × polarity` (unclamped, in [-1, 1]).
//! - `article_volume`    : `min(1, ln(count + 1) / 3)`, saturates around 19 articles.
//! - `recency`           : mean of `exp(-age_hours / half_life_hours)`, age clamped at 0.
//!
//! Composite = weighted sum per `RankingConfig`, clamped to [0, 1].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RankingConfig;
use crate::error::ValidationError;
use crate::signal::{validate_batch, ArticleSentiment, RawArticle};

/// `ln(count + 1)` is divided by this; volume reaches 1 at `count = e^3 - 1`.
const VOLUME_LOG_SCALE: f64 = 3.0;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Per-company score breakdown, computed fresh per call.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub sentiment_strength: f64,
    pub article_volume: f64,
    pub recency: f64,
    pub composite_score: f64,
}

impl ScoreComponents {
    /// The defined "no news" / failure value.
    pub const fn zero() -> Self {
        Self {
            sentiment_strength: 0.0,
            article_volume: 0.0,
            recency: 0.0,
            composite_score: 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// Scores article batches against one validated configuration.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: RankingConfig,
}

impl ScoringEngine {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn score(&self, articles: &[ArticleSentiment], now: DateTime<Utc>) -> ScoreComponents {
        if articles.is_empty() {
            return ScoreComponents::zero();
        }

        let n = articles.len() as f64;
        let half_life = self.config.half_life_hours();

        let sentiment_strength =
            articles.iter().map(ArticleSentiment::signed_confidence).sum::<f64>() / n;

        let article_volume = article_volume(articles.len());

        let recency = articles
            .iter()
            .map(|a| recency_weight(age_hours(a.published_at(), now), half_life))
            .sum::<f64>()
            / n;

        let w = self.config.weights();
        let raw = w.sentiment_strength * sentiment_strength
            + w.article_volume * article_volume
            + w.recency * recency;

        ScoreComponents {
            sentiment_strength,
            article_volume,
            recency,
            composite_score: raw.clamp(0.0, 1.0),
        }
    }

    /// Validate every raw record, then score. One invalid record rejects the batch.
    pub fn score_raw(
        &self,
        raw: &[RawArticle],
        now: DateTime<Utc>,
    ) -> Result<ScoreComponents, ValidationError> {
        let articles = validate_batch(raw)?;
        Ok(self.score(&articles, now))
    }
}

/// Logarithmic volume signal in [0, 1]; 0 at `count = 0`.
pub fn article_volume(count: usize) -> f64 {
    ((count as f64 + 1.0).ln() / VOLUME_LOG_SCALE).min(1.0)
}

/// Exponential decay weight: 1.0 at age 0, `e^-1` at one half-life.
/// Negative ages (clock skew) count as 0.
pub fn recency_weight(age_hours: f64, half_life_hours: f64) -> f64 {
    (-age_hours.max(0.0) / half_life_hours).exp()
}

/// Fractional hours between `published_at` and `now`, never negative.
pub fn age_hours(published_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let ms = (now - published_at).num_milliseconds();
    (ms as f64 / MS_PER_HOUR).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Weights;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 30, 0).unwrap()
    }

    fn art(polarity: i64, confidence: f64, hours_ago: i64) -> ArticleSentiment {
        ArticleSentiment::new(
            "Headline",
            now() - Duration::hours(hours_ago),
            polarity,
            confidence,
        )
        .unwrap()
    }

    fn engine() -> ScoringEngine {
        ScoringEngine::new(RankingConfig::default())
    }

    #[test]
    fn empty_input_is_all_zero() {
        let s = engine().score(&[], now());
        assert!(s.is_zero());
    }

    #[test]
    fn reference_three_article_case_lands_mid_range() {
        let articles = vec![art(1, 1.0, 0), art(1, 1.0, 0), art(-1, 1.0, 48)];
        let s = engine().score(&articles, now());

        assert!((s.sentiment_strength - 1.0 / 3.0).abs() < 1e-12);
        assert!((s.article_volume - 4f64.ln() / 3.0).abs() < 1e-12);
        assert!((s.recency - (2.0 + (-2.0f64).exp()) / 3.0).abs() < 1e-12);
        assert!(
            s.composite_score > 0.4 && s.composite_score < 0.6,
            "composite {}",
            s.composite_score
        );
    }

    #[test]
    fn all_neutral_scores_on_volume_and_recency_only() {
        let articles = vec![art(0, 0.9, 0), art(0, 0.7, 0)];
        let s = engine().score(&articles, now());
        assert_eq!(s.sentiment_strength, 0.0);
        let w = *RankingConfig::default().weights();
        let expected = w.article_volume * article_volume(2) + w.recency * 1.0;
        assert!((s.composite_score - expected).abs() < 1e-12);
    }

    #[test]
    fn future_timestamp_counts_as_fresh_not_bonus() {
        let skewed = ArticleSentiment::new("Skew", now() + Duration::minutes(5), 1, 1.0).unwrap();
        let s = engine().score(&[skewed], now());
        assert_eq!(s.recency, 1.0);
    }

    #[test]
    fn single_very_old_article_has_near_zero_recency() {
        let s = engine().score(&[art(1, 1.0, 24 * 60)], now());
        assert!(s.recency < 1e-15);
        assert!(s.recency >= 0.0);
    }

    #[test]
    fn recency_weight_at_half_life_is_inverse_e() {
        assert_eq!(recency_weight(0.0, 24.0), 1.0);
        assert!((recency_weight(24.0, 24.0) - 0.367_879_441).abs() < 1e-6);
        assert_eq!(recency_weight(-3.0, 24.0), 1.0);
    }

    #[test]
    fn volume_saturates_at_one() {
        assert_eq!(article_volume(0), 0.0);
        assert!(article_volume(19) < 1.0);
        assert_eq!(article_volume(20), 1.0);
        assert_eq!(article_volume(10_000), 1.0);
    }

    #[test]
    fn composite_clamps_below_zero() {
        let cfg = RankingConfig::new(
            Weights {
                sentiment_strength: 1.0,
                article_volume: 0.0,
                recency: 0.0,
            },
            24.0,
        )
        .unwrap();
        let s = ScoringEngine::new(cfg).score(&[art(-1, 1.0, 0)], now());
        assert_eq!(s.sentiment_strength, -1.0);
        assert_eq!(s.composite_score, 0.0);
    }

    #[test]
    fn score_raw_rejects_whole_batch() {
        let ok = RawArticle {
            text: "Fine".into(),
            published_at: "2024-06-03T09:00:00Z".into(),
            polarity: Some(1),
            label: None,
            confidence: 0.9,
        };
        let bad = RawArticle {
            label: Some("great".into()),
            polarity: None,
            ..ok.clone()
        };
        assert!(engine().score_raw(&[ok.clone()], now()).is_ok());
        assert!(engine().score_raw(&[ok, bad], now()).is_err());
    }
}
