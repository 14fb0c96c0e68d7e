//! News Relevance Ranker: binary entrypoint.
//! Loads configuration, wires the news fetcher and classifier into the ranking
//! engine, and serves the Axum HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use news_relevance_ranker::{
    api::{create_router, AppState},
    config::{news::ENV_NEWS_CONFIG_PATH, NewsApiConfig, RankingConfig},
    history::ScoreHistory,
    ingest::newsapi::NewsApiFetcher,
    pipeline::CompanyScorer,
    ranking::RankingEngine,
    scoring::ScoringEngine,
    sector::SectorMap,
    sentiment::LexiconClassifier,
    telemetry::{init_tracing, Metrics},
};

const ENV_ADDR: &str = "RANKER_ADDR";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const HISTORY_CAPACITY: usize = 10_000;

/// `None` when no news config is available; the API then serves `/score` and `/history` only.
fn build_ranking(engine: Arc<ScoringEngine>) -> anyhow::Result<Option<RankingEngine>> {
    let cfg = match NewsApiConfig::load_default() {
        Ok(cfg) => cfg,
        // An explicit config file that fails to load is fatal.
        Err(e) if std::env::var_os(ENV_NEWS_CONFIG_PATH).is_some() => {
            return Err(e.context("loading news config"));
        }
        Err(e) => {
            warn!(error = %e, "news fetcher disabled");
            return Ok(None);
        }
    };
    let fetcher = NewsApiFetcher::new(cfg).context("building news API client")?;
    let scorer = CompanyScorer::new(
        Arc::new(fetcher),
        Arc::new(LexiconClassifier::new()),
        engine,
    );
    Ok(Some(RankingEngine::new(scorer)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = RankingConfig::load_default().context("loading ranking config")?;
    info!(
        version = config.version(),
        half_life_hours = config.half_life_hours(),
        "ranking config loaded"
    );
    let sectors = SectorMap::load_default().context("loading sector map")?;
    let engine = Arc::new(ScoringEngine::new(config));
    let ranking = build_ranking(engine.clone())?;

    let state = AppState {
        engine,
        ranking,
        sectors: Arc::new(sectors),
        history: Arc::new(ScoreHistory::with_capacity(HISTORY_CAPACITY)),
    };

    let mut router = create_router(state);
    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => warn!(error = %e, "prometheus recorder not installed"),
    }

    let addr: SocketAddr = std::env::var(ENV_ADDR)
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .with_context(|| format!("parsing {ENV_ADDR}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, router).await.context("serving HTTP")?;
    Ok(())
}
