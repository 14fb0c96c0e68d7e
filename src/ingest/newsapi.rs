// src/ingest/newsapi.rs
//! NewsAPI `/v2/everything` client: latest English articles mentioning a company.

use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;
use std::time::Duration;

use crate::config::NewsApiConfig;
use crate::error::FetchError;
use crate::ingest::types::{NewsArticle, NewsFetcher};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    articles: Vec<ApiArticle>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    title: Option<String>,
    published_at: Option<String>,
    #[serde(default)]
    source: Option<ApiSource>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

pub struct NewsApiFetcher {
    client: reqwest::Client,
    cfg: NewsApiConfig,
}

impl NewsApiFetcher {
    pub fn new(cfg: NewsApiConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self { client, cfg })
    }

    fn endpoint(&self) -> String {
        format!("{}/everything", self.cfg.base_url)
    }
}

/// Map an API body into articles. A missing title or timestamp is passed through
/// as empty so ingestion rejects (and counts) it.
fn into_articles(body: EverythingResponse) -> Result<Vec<NewsArticle>, FetchError> {
    if body.status != "ok" {
        return Err(FetchError::Upstream {
            status: 200,
            message: format!(
                "{}: {}",
                body.code.unwrap_or_else(|| "unknown".into()),
                body.message.unwrap_or_default()
            ),
        });
    }
    Ok(body
        .articles
        .into_iter()
        .map(|a| NewsArticle {
            title: a.title.unwrap_or_default(),
            published_at: a.published_at.unwrap_or_default(),
            source: a
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "unknown".into()),
        })
        .collect())
}

#[async_trait]
impl NewsFetcher for NewsApiFetcher {
    async fn fetch(&self, company: &str) -> Result<Vec<NewsArticle>, FetchError> {
        let t0 = std::time::Instant::now();
        let page_size = self.cfg.page_size.to_string();

        let resp = self
            .client
            .get(self.endpoint())
            .header("X-Api-Key", &self.cfg.api_key)
            .query(&[
                ("q", company),
                ("language", self.cfg.language.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: EverythingResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        let articles = into_articles(body)?;

        histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("ingest_articles_total").increment(articles.len() as u64);
        tracing::debug!(company, count = articles.len(), "newsapi fetch");

        Ok(articles)
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ok_body_and_tolerates_missing_fields() {
        let body: EverythingResponse = serde_json::from_str(
            r#"{
                "status": "ok",
                "totalResults": 2,
                "articles": [
                    {"source": {"id": null, "name": "Reuters"}, "title": "Acme beats", "publishedAt": "2024-05-01T10:00:00Z"},
                    {"source": {"id": null, "name": null}, "title": null, "publishedAt": null}
                ]
            }"#,
        )
        .unwrap();
        let arts = into_articles(body).unwrap();
        assert_eq!(arts.len(), 2);
        assert_eq!(arts[0].source, "Reuters");
        assert_eq!(arts[1].source, "unknown");
        assert!(arts[1].title.is_empty());
    }

    #[test]
    fn error_status_becomes_upstream_error() {
        let body: EverythingResponse = serde_json::from_str(
            r#"{"status":"error","code":"rateLimited","message":"Too many requests"}"#,
        )
        .unwrap();
        match into_articles(body) {
            Err(FetchError::Upstream { message, .. }) => assert!(message.contains("rateLimited")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
