//! # Company Pipeline
//! Wires the injected collaborators to the scoring engine for one company:
//! fetch → normalize → classify headlines (one batch) → validated records → score.
//!
//! Any collaborator failure or invalid classifier output fails the whole company
//! with a `FetchError`; the ranking engine decides what to do with it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::error::FetchError;
use crate::ingest::prepare_articles;
use crate::ingest::types::{NewsFetcher, PreparedArticle};
use crate::scoring::{ScoreComponents, ScoringEngine};
use crate::sentiment::SentimentClassifier;
use crate::signal::{ArticleSentiment, Polarity, SentimentBreakdown};

/// One headline as shown in a preview list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlinePreview {
    pub headline: String,
    pub sentiment: Polarity,
    pub confidence: f64,
    /// `YYYY-MM-DD`
    pub date: String,
    pub source: String,
}

/// Score and sentiment breakdown for one company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyAnalysis {
    pub company: String,
    pub components: ScoreComponents,
    pub breakdown: SentimentBreakdown,
}

#[derive(Clone)]
pub struct CompanyScorer {
    fetcher: Arc<dyn NewsFetcher>,
    classifier: Arc<dyn SentimentClassifier>,
    engine: Arc<ScoringEngine>,
}

impl CompanyScorer {
    pub fn new(
        fetcher: Arc<dyn NewsFetcher>,
        classifier: Arc<dyn SentimentClassifier>,
        engine: Arc<ScoringEngine>,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            engine,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Fetch, classify and build validated records, keeping source alongside.
    async fn collect(
        &self,
        company: &str,
    ) -> Result<Vec<(ArticleSentiment, PreparedArticle)>, FetchError> {
        let raw = self.fetcher.fetch(company).await?;
        let batch = prepare_articles(raw);
        if batch.rejected > 0 {
            tracing::debug!(company, rejected = batch.rejected, "dropped malformed articles");
        }
        if batch.articles.is_empty() {
            return Ok(Vec::new());
        }

        let titles: Vec<String> = batch.articles.iter().map(|a| a.title.clone()).collect();
        let labels = self.classifier.classify(&titles).await?;
        if labels.len() != titles.len() {
            return Err(FetchError::Classification(format!(
                "{} returned {} labels for {} headlines",
                self.classifier.name(),
                labels.len(),
                titles.len()
            )));
        }

        batch
            .articles
            .into_iter()
            .zip(labels)
            .map(|(art, cls)| -> Result<_, FetchError> {
                let rec = ArticleSentiment::from_label(
                    art.title.clone(),
                    art.published_at,
                    &cls.label,
                    cls.score,
                )?;
                Ok((rec, art))
            })
            .collect()
    }

    /// Single-company analysis: components plus how many headlines fell on each side.
    pub async fn analyze(
        &self,
        company: &str,
        now: DateTime<Utc>,
    ) -> Result<CompanyAnalysis, FetchError> {
        let records: Vec<ArticleSentiment> = self
            .collect(company)
            .await?
            .into_iter()
            .map(|(rec, _)| rec)
            .collect();
        let components = self.engine.score(&records, now);
        let breakdown = SentimentBreakdown::from_records(&records);
        tracing::debug!(
            company,
            articles = records.len(),
            positive = breakdown.positive,
            negative = breakdown.negative,
            sentiment = components.sentiment_strength,
            volume = components.article_volume,
            recency = components.recency,
            composite = components.composite_score,
            "scored company"
        );
        Ok(CompanyAnalysis {
            company: company.to_string(),
            components,
            breakdown,
        })
    }

    pub async fn fetch_and_score(
        &self,
        company: &str,
        now: DateTime<Utc>,
    ) -> Result<ScoreComponents, FetchError> {
        Ok(self.analyze(company, now).await?.components)
    }

    /// Top `n` headlines in fetcher order (newest first for NewsAPI).
    pub async fn preview(&self, company: &str, n: usize) -> Result<Vec<HeadlinePreview>, FetchError> {
        Ok(self
            .collect(company)
            .await?
            .into_iter()
            .take(n)
            .map(|(rec, art)| HeadlinePreview {
                headline: rec.text().to_string(),
                sentiment: rec.polarity(),
                confidence: rec.confidence(),
                date: rec.published_at().format("%Y-%m-%d").to_string(),
                source: art.source,
            })
            .collect())
    }
}
