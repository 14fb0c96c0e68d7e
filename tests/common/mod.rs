// tests/common/mod.rs
//
// Shared fakes for the injected collaborators.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};

use news_relevance_ranker::config::RankingConfig;
use news_relevance_ranker::error::FetchError;
use news_relevance_ranker::ingest::types::{NewsArticle, NewsFetcher};
use news_relevance_ranker::pipeline::CompanyScorer;
use news_relevance_ranker::ranking::RankingEngine;
use news_relevance_ranker::scoring::ScoringEngine;
use news_relevance_ranker::sentiment::LexiconClassifier;

/// Serves canned headlines per company.
/// `"Broken"` fails with an upstream error, `"Panics"` panics inside the task.
#[derive(Default)]
pub struct CannedFetcher {
    pub by_company: HashMap<String, Vec<NewsArticle>>,
}

impl CannedFetcher {
    pub fn with(mut self, company: &str, headlines: &[(&str, DateTime<Utc>)]) -> Self {
        let arts = headlines
            .iter()
            .map(|(title, at)| NewsArticle {
                title: title.to_string(),
                published_at: at.to_rfc3339_opts(SecondsFormat::Secs, true),
                source: "Wire".into(),
            })
            .collect();
        self.by_company.insert(company.to_string(), arts);
        self
    }
}

#[async_trait]
impl NewsFetcher for CannedFetcher {
    async fn fetch(&self, company: &str) -> Result<Vec<NewsArticle>, FetchError> {
        match company {
            "Broken" => Err(FetchError::Upstream {
                status: 500,
                message: "upstream down".into(),
            }),
            "Panics" => panic!("fetcher blew up"),
            c => Ok(self.by_company.get(c).cloned().unwrap_or_default()),
        }
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

/// Acme is strongly positive, Globex mixed, Initech negative.
pub fn market(now: DateTime<Utc>) -> CannedFetcher {
    CannedFetcher::default()
        .with(
            "Acme",
            &[
                ("Acme shares surge on record profit", now - Duration::hours(1)),
                ("Acme beats estimates, raises guidance", now - Duration::hours(3)),
                ("Acme wins major contract", now - Duration::hours(5)),
            ],
        )
        .with(
            "Globex",
            &[
                ("Globex profit rises", now - Duration::hours(10)),
                ("Globex faces lawsuit", now - Duration::hours(30)),
            ],
        )
        .with(
            "Initech",
            &[("Initech shares plunge after fraud probe", now - Duration::hours(2))],
        )
}

pub fn ranking_engine(fetcher: CannedFetcher) -> RankingEngine {
    let scorer = CompanyScorer::new(
        Arc::new(fetcher),
        Arc::new(LexiconClassifier::new()),
        Arc::new(ScoringEngine::new(RankingConfig::default())),
    );
    RankingEngine::new(scorer)
}

pub fn names(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}
