// src/ingest/mod.rs
pub mod newsapi;
pub mod types;

use crate::ingest::types::{NewsArticle, PreparedArticle};
use crate::signal::parse_timestamp;
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// Headlines longer than this are cut (in chars).
const MAX_HEADLINE_CHARS: usize = 300;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_articles_total", "Articles returned by the news fetcher.");
        describe_counter!(
            "ingest_rejected_total",
            "Articles rejected for empty titles or unparseable timestamps."
        );
        describe_histogram!("ingest_fetch_ms", "News fetch latency in milliseconds.");
    });
}

/// Normalize a headline: decode entities, strip tags, ASCII quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > MAX_HEADLINE_CHARS {
        out = out.chars().take(MAX_HEADLINE_CHARS).collect();
    }

    out
}

/// Result of preparing one fetch for classification.
#[derive(Debug, Clone, Default)]
pub struct PreparedBatch {
    pub articles: Vec<PreparedArticle>,
    pub rejected: usize,
}

/// Normalize titles and parse timestamps. Articles with an empty title or an
/// unparseable timestamp are dropped and counted. No deduplication.
pub fn prepare_articles(raw: Vec<NewsArticle>) -> PreparedBatch {
    ensure_metrics_described();

    let mut batch = PreparedBatch {
        articles: Vec::with_capacity(raw.len()),
        rejected: 0,
    };

    for art in raw {
        let title = normalize_text(&art.title);
        if title.is_empty() {
            batch.rejected += 1;
            tracing::debug!(source = %art.source, "rejected article with empty title");
            continue;
        }
        match parse_timestamp(&art.published_at) {
            Ok(published_at) => batch.articles.push(PreparedArticle {
                title,
                published_at,
                source: art.source,
            }),
            Err(e) => {
                batch.rejected += 1;
                tracing::debug!(source = %art.source, error = %e, "rejected article");
            }
        }
    }

    counter!("ingest_rejected_total").increment(batch.rejected as u64);
    batch
}
