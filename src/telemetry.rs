//! Logging and metrics bootstrap for the binary.

use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_LOG_JSON: &str = "RANKER_LOG_JSON";
const DEFAULT_FILTER: &str = "news_relevance_ranker=info,warn";

/// Install the global subscriber. `RUST_LOG` wins over the default filter;
/// `RANKER_LOG_JSON=1` switches to JSON lines.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var(ENV_LOG_JSON).ok().is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// One-time descriptions for the ranking series.
pub(crate) fn describe_ranking_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ranking_runs_total", "Ranking batches executed.");
        describe_counter!("ranking_companies_total", "Companies processed across runs.");
        describe_counter!(
            "ranking_company_failures_total",
            "Companies whose fetch/scoring failed and were defaulted to zero."
        );
        describe_histogram!("ranking_run_ms", "Ranking batch wall time in milliseconds.");
        describe_histogram!("ranking_composite_score", "Composite scores produced.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Fails if a recorder is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        describe_ranking_metrics();
        Ok(Self { handle })
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
