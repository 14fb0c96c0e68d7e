//! HTTP surface over the scoring core.
//!
//! Routes:
//! - `GET  /health`
//! - `POST /score`                       pre-classified articles → components
//! - `POST /rank`                        companies → ranking (optionally sector-adjusted)
//! - `GET  /analyze/{company}`           one company's score and polarity counts
//! - `GET  /preview/{company}?n=5`       top headlines with sentiment
//! - `GET  /history/{company}?days=30`   recorded scores
//! - `GET  /sectors/{sector}/benchmark`  top 5 + average for a sector

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::error::{FetchError, ValidationError};
use crate::history::{HistoryEntry, ScoreHistory};
use crate::pipeline::{CompanyAnalysis, HeadlinePreview};
use crate::ranking::{Ranking, RankingEngine};
use crate::scoring::{ScoreComponents, ScoringEngine};
use crate::sector::{sector_benchmark, AdjustedEntry, SectorBenchmark, SectorMap};
use crate::signal::RawArticle;

const DEFAULT_PREVIEW_N: usize = 5;
const MAX_PREVIEW_N: usize = 50;
const DEFAULT_HISTORY_DAYS: u32 = 30;
const BENCHMARK_TOP_N: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ScoringEngine>,
    /// `None` when no news fetcher is configured; fetch-backed routes answer 503.
    pub ranking: Option<RankingEngine>,
    pub sectors: Arc<SectorMap>,
    pub history: Arc<ScoreHistory>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/score", post(score))
        .route("/rank", post(rank))
        .route("/analyze/{company}", get(analyze))
        .route("/preview/{company}", get(preview))
        .route("/history/{company}", get(history))
        .route("/sectors/{sector}/benchmark", get(benchmark))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/* ----------------------------
Errors
---------------------------- */

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Upstream(FetchError),
    Unavailable(&'static str),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Upstream(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            ApiError::Unavailable(what) => (StatusCode::SERVICE_UNAVAILABLE, what.to_string()),
        };
        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

fn ranking_engine(state: &AppState) -> Result<&RankingEngine, ApiError> {
    state
        .ranking
        .as_ref()
        .ok_or(ApiError::Unavailable("news fetcher not configured"))
}

/* ----------------------------
POST /score
---------------------------- */

#[derive(Deserialize)]
struct ScoreReq {
    articles: Vec<RawArticle>,
    /// Defaults to the server clock.
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

async fn score(
    State(state): State<AppState>,
    Json(body): Json<ScoreReq>,
) -> Result<Json<ScoreComponents>, ApiError> {
    let now = body.now.unwrap_or_else(Utc::now);
    let components = state.engine.score_raw(&body.articles, now)?;
    Ok(Json(components))
}

/* ----------------------------
POST /rank
---------------------------- */

/// Either `["Apple", "Google"]` or `"Apple, Google"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CompanyList {
    List(Vec<String>),
    Csv(String),
}

impl CompanyList {
    /// Trimmed names; blanks dropped, duplicates kept.
    fn into_names(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            CompanyList::List(v) => v,
            CompanyList::Csv(s) => s.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

#[derive(Deserialize)]
struct RankReq {
    companies: CompanyList,
    #[serde(default)]
    sector_adjust: bool,
}

#[derive(Serialize)]
struct RankResp {
    #[serde(flatten)]
    ranking: Ranking,
    #[serde(skip_serializing_if = "Option::is_none")]
    adjusted: Option<Vec<AdjustedEntry>>,
}

async fn rank(
    State(state): State<AppState>,
    Json(body): Json<RankReq>,
) -> Result<Json<RankResp>, ApiError> {
    let engine = ranking_engine(&state)?;
    let companies = body.companies.into_names();
    let now = Utc::now();

    let ranking = engine.rank_companies(&companies, now).await;
    // Isolated failures are outages, not data points.
    for e in ranking.entries.iter().filter(|e| !e.is_failure()) {
        state
            .history
            .record(&e.company, &e.components, e.breakdown, now);
    }

    let adjusted = body
        .sector_adjust
        .then(|| state.sectors.adjust_entries(&ranking.entries));

    Ok(Json(RankResp { ranking, adjusted }))
}

/* ----------------------------
GET /analyze, /preview, /history, /sectors
---------------------------- */

async fn analyze(
    State(state): State<AppState>,
    Path(company): Path<String>,
) -> Result<Json<CompanyAnalysis>, ApiError> {
    let engine = ranking_engine(&state)?;
    let now = Utc::now();
    let analysis = engine
        .scorer()
        .analyze(&company, now)
        .await
        .map_err(ApiError::Upstream)?;
    state.history.record(
        &analysis.company,
        &analysis.components,
        Some(analysis.breakdown),
        now,
    );
    Ok(Json(analysis))
}

#[derive(Deserialize)]
struct PreviewQuery {
    n: Option<usize>,
}

async fn preview(
    State(state): State<AppState>,
    Path(company): Path<String>,
    Query(q): Query<PreviewQuery>,
) -> Result<Json<Vec<HeadlinePreview>>, ApiError> {
    let engine = ranking_engine(&state)?;
    let n = q.n.unwrap_or(DEFAULT_PREVIEW_N).min(MAX_PREVIEW_N);
    let out = engine
        .scorer()
        .preview(&company, n)
        .await
        .map_err(ApiError::Upstream)?;
    Ok(Json(out))
}

#[derive(Deserialize)]
struct HistoryQuery {
    days: Option<u32>,
}

async fn history(
    State(state): State<AppState>,
    Path(company): Path<String>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<HistoryEntry>> {
    let days = q.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    Json(state.history.for_company(&company, days, Utc::now()))
}

async fn benchmark(
    State(state): State<AppState>,
    Path(sector): Path<String>,
) -> Result<Json<SectorBenchmark>, ApiError> {
    let engine = ranking_engine(&state)?;
    let companies = state.sectors.companies_in(&sector);
    let ranking = engine.rank_companies(&companies, Utc::now()).await;
    Ok(Json(sector_benchmark(&sector, &ranking.entries, BENCHMARK_TOP_N)))
}
