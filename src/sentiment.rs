//! Sentiment classification collaborator.
//!
//! `SentimentClassifier` is the seam for whatever model labels headlines
//! (a hosted transformer, a local model, a fake in tests). `LexiconClassifier`
//! is the built-in offline implementation: a word lexicon with short-range negation.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::FetchError;
use crate::signal::{Classification, Polarity};

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../config/lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Labels a batch of headlines; output is index-aligned with the input.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, texts: &[String]) -> Result<Vec<Classification>, FetchError>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (summed score, lexicon hits).
    /// A negator in the previous 1..=3 tokens flips the sign of a lexicon word.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;
        let mut hits = 0usize;

        for (i, tok) in tokens.iter().enumerate() {
            let base = self.word_score(tok);
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
            hits += 1;
        }

        (score, hits)
    }

    /// Map a lexicon score to a label and a confidence in [0, 1].
    ///
    /// Non-zero scores use `|s| / (|s| + 1)` (0.5 for one hit, approaching 1).
    /// Neutral is certain when no lexicon word matched, a coin flip when hits cancel out.
    pub fn classify_text(&self, text: &str) -> Classification {
        let (score, hits) = self.score_text(text);
        let polarity = match score.signum() {
            1 => Polarity::Positive,
            -1 => Polarity::Negative,
            _ => Polarity::Neutral,
        };
        let confidence = match polarity {
            Polarity::Neutral if hits == 0 => 1.0,
            Polarity::Neutral => 0.5,
            _ => {
                let s = f64::from(score.abs());
                s / (s + 1.0)
            }
        };
        Classification {
            label: polarity.label().to_string(),
            score: confidence,
        }
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, texts: &[String]) -> Result<Vec<Classification>, FetchError> {
        Ok(texts.iter().map(|t| self.classify_text(t)).collect())
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Lower-case alphanumeric tokens; apostrophes stay inside words so "isn't" survives.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
            | "fails"
            | "failed"
    )
}
