//! Configuration sources: scoring weights/decay and the news search collaborator.

pub mod news;
pub mod ranking;

pub use news::NewsApiConfig;
pub use ranking::{RankingConfig, RawRankingConfig, TimeDecay, Weights};
