// src/ingest/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Article as supplied by the news search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsArticle {
    pub title: String,        // raw headline
    pub published_at: String, // ISO-8601
    pub source: String,       // e.g. "Reuters"
}

/// Article that survived normalization and timestamp parsing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PreparedArticle {
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub source: String,
}

#[async_trait::async_trait]
pub trait NewsFetcher: Send + Sync {
    async fn fetch(&self, company: &str) -> Result<Vec<NewsArticle>, FetchError>;
    fn name(&self) -> &'static str;
}
