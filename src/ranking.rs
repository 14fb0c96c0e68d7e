//! # Ranking Engine
//! Applies scoring to many companies and produces a total order.
//!
//! Policy:
//! - Each company is independent. A failure for one company (fetch error,
//!   classifier error, invalid record, panicked task) is logged, counted and
//!   turned into a zero entry. The batch always returns one entry per input.
//! - Duplicate names are scored independently and all appear in the output.
//! - Order is descending by score; the sort is stable so ties keep input order.

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::pipeline::CompanyScorer;
use crate::scoring::ScoreComponents;
use crate::signal::SentimentBreakdown;
use crate::telemetry::describe_ranking_metrics;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub company: String,
    /// Composite score in [0, 1].
    pub score: f64,
    pub components: ScoreComponents,
    /// Polarity counts, when the scorer reports them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<SentimentBreakdown>,
    /// Why this company was defaulted to zero, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl RankedEntry {
    pub fn scored(company: impl Into<String>, components: ScoreComponents) -> Self {
        Self {
            company: company.into(),
            score: components.composite_score,
            components,
            breakdown: None,
            failure: None,
        }
    }

    pub fn with_breakdown(mut self, breakdown: SentimentBreakdown) -> Self {
        self.breakdown = Some(breakdown);
        self
    }

    pub fn failed(company: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            score: 0.0,
            components: ScoreComponents::zero(),
            breakdown: None,
            failure: Some(reason.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// A finished ranking batch, ready for presentation/export.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub config_version: String,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<RankedEntry>,
}

impl Ranking {
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.is_failure()).count()
    }
}

/// Synchronous ranking over a caller-supplied scorer.
pub fn rank<F>(companies: &[String], mut fetch_and_score: F) -> Vec<RankedEntry>
where
    F: FnMut(&str) -> Result<ScoreComponents, FetchError>,
{
    describe_ranking_metrics();
    let t0 = Instant::now();

    let entries = companies
        .iter()
        .map(|c| entry_from_result(c, fetch_and_score(c).map(|comps| (comps, None))))
        .collect();
    let entries = sort_ranked(entries);

    record_run(&entries, t0);
    entries
}

/// Stable descending sort by score (IEEE total order, so NaN cannot break it).
pub fn sort_ranked(mut entries: Vec<RankedEntry>) -> Vec<RankedEntry> {
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries
}

fn entry_from_result(
    company: &str,
    res: Result<(ScoreComponents, Option<SentimentBreakdown>), FetchError>,
) -> RankedEntry {
    match res {
        Ok((components, _)) if !components.composite_score.is_finite() => {
            warn!(company, score = components.composite_score, "non-finite score; defaulting to zero");
            counter!("ranking_company_failures_total").increment(1);
            RankedEntry::failed(company, "non-finite composite score")
        }
        Ok((components, breakdown)) => {
            let entry = RankedEntry::scored(company, components);
            match breakdown {
                Some(b) => entry.with_breakdown(b),
                None => entry,
            }
        }
        Err(e) => {
            warn!(company, error = %e, "company failed; defaulting to zero score");
            counter!("ranking_company_failures_total").increment(1);
            RankedEntry::failed(company, e.to_string())
        }
    }
}

fn record_run(entries: &[RankedEntry], t0: Instant) {
    counter!("ranking_runs_total").increment(1);
    counter!("ranking_companies_total").increment(entries.len() as u64);
    for e in entries {
        histogram!("ranking_composite_score").record(e.score);
    }
    histogram!("ranking_run_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
}

/// Concurrent ranking over the injected collaborators: one task per company.
#[derive(Clone)]
pub struct RankingEngine {
    scorer: CompanyScorer,
}

impl RankingEngine {
    pub fn new(scorer: CompanyScorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &CompanyScorer {
        &self.scorer
    }

    pub async fn rank_companies(&self, companies: &[String], now: DateTime<Utc>) -> Ranking {
        describe_ranking_metrics();
        let t0 = Instant::now();

        let handles: Vec<_> = companies
            .iter()
            .map(|company| {
                let scorer = self.scorer.clone();
                let company = company.clone();
                tokio::spawn(async move {
                    scorer
                        .analyze(&company, now)
                        .await
                        .map(|a| (a.components, Some(a.breakdown)))
                })
            })
            .collect();

        // Await in input order so a panicked task still maps to its company.
        let mut entries = Vec::with_capacity(companies.len());
        for (company, handle) in companies.iter().zip(handles) {
            let res = match handle.await {
                Ok(r) => r,
                Err(e) => Err(FetchError::Aborted(e.to_string())),
            };
            entries.push(entry_from_result(company, res));
        }
        let entries = sort_ranked(entries);

        record_run(&entries, t0);
        let ranking = Ranking {
            config_version: self.scorer.engine().config().version().to_string(),
            generated_at: now,
            entries,
        };
        info!(
            companies = companies.len(),
            failures = ranking.failures(),
            version = %ranking.config_version,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "ranking complete"
        );
        ranking
    }
}
