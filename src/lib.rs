// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod ingest;
pub mod pipeline;
pub mod ranking;
pub mod scoring;
pub mod sector;
pub mod sentiment;
pub mod signal;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::{RankingConfig, Weights};
pub use crate::error::{ConfigError, FetchError, ValidationError};
pub use crate::ranking::{rank, RankedEntry, Ranking, RankingEngine};
pub use crate::scoring::{ScoreComponents, ScoringEngine};
pub use crate::sector::{adjust, SectorMap};
pub use crate::signal::{ArticleSentiment, Polarity, RawArticle, SentimentBreakdown};
