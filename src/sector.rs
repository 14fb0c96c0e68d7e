//! # Sector Adjustment
//!
//! Optional multiplicative post-processing of composite scores by an
//! industry-sector factor, plus sector benchmarks over a ranking.
//!
//! - Unknown sectors and companies without a sector use multiplier 1.0.
//! - Adjustment never re-sorts; `resort_adjusted` exists for callers who want
//!   sector-adjusted order.
//!
//! TOML shape (`config/sectors.toml`):
//! ```toml
//! [companies]
//! Apple = "Technology"
//!
//! [multipliers]
//! Technology = 1.10
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::ranking::RankedEntry;

pub const DEFAULT_SECTOR_MAP_PATH: &str = "config/sectors.toml";
pub const ENV_SECTOR_MAP_PATH: &str = "SECTOR_MAP_PATH";

/// Neutral multiplier for unknown sectors.
pub const NEUTRAL_MULTIPLIER: f64 = 1.0;

/// `score × sector_weights[sector]`, or `score` unchanged for unknown sectors.
pub fn adjust(score: f64, sector: &str, sector_weights: &HashMap<String, f64>) -> f64 {
    score * sector_weights.get(sector).copied().unwrap_or(NEUTRAL_MULTIPLIER)
}

/// Company → sector and sector → multiplier tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorMap {
    #[serde(default)]
    pub companies: HashMap<String, String>,
    #[serde(default)]
    pub multipliers: HashMap<String, f64>,
}

/// A ranked entry with its sector-adjusted score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedEntry {
    #[serde(flatten)]
    pub entry: RankedEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    pub multiplier: f64,
    pub adjusted_score: f64,
}

/// Top companies and average score within one sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorBenchmark {
    pub sector: String,
    pub top: Vec<RankedEntry>,
    pub average: f64,
    pub count: usize,
}

impl SectorMap {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let map: SectorMap = toml::from_str(s)?;
        map.validate()
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// $SECTOR_MAP_PATH (must exist when set) → config/sectors.toml → empty map.
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Ok(p) = std::env::var(ENV_SECTOR_MAP_PATH) {
            return Self::load_from(&PathBuf::from(p));
        }
        let default_path = PathBuf::from(DEFAULT_SECTOR_MAP_PATH);
        if default_path.exists() {
            Self::load_from(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        for (sector, &value) in &self.multipliers {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::SectorMultiplier {
                    sector: sector.clone(),
                    value,
                });
            }
        }
        Ok(self)
    }

    pub fn sector_of(&self, company: &str) -> Option<&str> {
        self.companies.get(company).map(String::as_str)
    }

    pub fn multiplier(&self, sector: &str) -> f64 {
        self.multipliers
            .get(sector)
            .copied()
            .unwrap_or(NEUTRAL_MULTIPLIER)
    }

    pub fn adjust(&self, score: f64, sector: &str) -> f64 {
        adjust(score, sector, &self.multipliers)
    }

    /// Adjust every entry, preserving input order.
    pub fn adjust_entries(&self, entries: &[RankedEntry]) -> Vec<AdjustedEntry> {
        entries
            .iter()
            .map(|e| {
                let sector = self.sector_of(&e.company).map(str::to_string);
                let multiplier = sector
                    .as_deref()
                    .map(|s| self.multiplier(s))
                    .unwrap_or(NEUTRAL_MULTIPLIER);
                AdjustedEntry {
                    entry: e.clone(),
                    sector,
                    multiplier,
                    adjusted_score: e.score * multiplier,
                }
            })
            .collect()
    }

    /// Companies assigned to `sector`, sorted by name.
    pub fn companies_in(&self, sector: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .companies
            .iter()
            .filter(|(_, s)| s.as_str() == sector)
            .map(|(c, _)| c.clone())
            .collect();
        out.sort();
        out
    }
}

/// Stable descending sort by adjusted score.
pub fn resort_adjusted(mut entries: Vec<AdjustedEntry>) -> Vec<AdjustedEntry> {
    entries.sort_by(|a, b| b.adjusted_score.total_cmp(&a.adjusted_score));
    entries
}

/// Benchmark a sector from already-ranked entries (descending order assumed).
/// Average is over all given entries; 0.0 when there are none.
pub fn sector_benchmark(sector: &str, ranked: &[RankedEntry], top_n: usize) -> SectorBenchmark {
    let count = ranked.len();
    let average = if count > 0 {
        ranked.iter().map(|e| e.score).sum::<f64>() / count as f64
    } else {
        0.0
    };
    SectorBenchmark {
        sector: sector.to_string(),
        top: ranked.iter().take(top_n).cloned().collect(),
        average,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreComponents;

    fn entry(company: &str, score: f64) -> RankedEntry {
        RankedEntry::scored(
            company,
            ScoreComponents {
                composite_score: score,
                ..ScoreComponents::zero()
            },
        )
    }

    fn map() -> SectorMap {
        SectorMap::from_toml_str(
            r#"
            [companies]
            Apple = "Technology"
            Exxon = "Energy"
            Nvidia = "Technology"
            [multipliers]
            Technology = 1.2
            Energy = 0.5
            "#,
        )
        .unwrap()
    }

    #[test]
    fn unknown_sector_passes_through() {
        let weights = HashMap::from([("Energy".to_string(), 0.5)]);
        assert_eq!(adjust(0.42, "Utilities", &weights), 0.42);
        assert!((adjust(0.42, "Energy", &weights) - 0.21).abs() < 1e-12);
    }

    #[test]
    fn adjust_entries_keeps_order_and_defaults_unmapped() {
        let m = map();
        let out = m.adjust_entries(&[entry("Exxon", 0.8), entry("Apple", 0.5), entry("Acme", 0.3)]);
        let order: Vec<_> = out.iter().map(|a| a.entry.company.as_str()).collect();
        assert_eq!(order, vec!["Exxon", "Apple", "Acme"]);
        assert!((out[0].adjusted_score - 0.4).abs() < 1e-12);
        assert!((out[1].adjusted_score - 0.6).abs() < 1e-12);
        assert_eq!(out[2].multiplier, 1.0);
        assert!(out[2].sector.is_none());

        let resorted = resort_adjusted(out);
        assert_eq!(resorted[0].entry.company, "Apple");
    }

    #[test]
    fn resort_is_stable_and_tolerates_nan() {
        let m = map();
        let mut out = m.adjust_entries(&[entry("Acme", 0.3), entry("Initech", 0.3), entry("Exxon", 0.9)]);
        out[2].adjusted_score = f64::NAN;
        let resorted = resort_adjusted(out);
        let order: Vec<_> = resorted
            .iter()
            .filter(|a| !a.adjusted_score.is_nan())
            .map(|a| a.entry.company.as_str())
            .collect();
        assert_eq!(order, vec!["Acme", "Initech"]);
    }

    #[test]
    fn rejects_negative_multiplier() {
        let err = SectorMap::from_toml_str("[multipliers]\nEnergy = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::SectorMultiplier { .. }));
    }

    #[test]
    fn benchmark_top_and_average() {
        let m = map();
        assert_eq!(m.companies_in("Technology"), vec!["Apple", "Nvidia"]);
        let ranked = vec![entry("Nvidia", 0.9), entry("Apple", 0.3)];
        let b = sector_benchmark("Technology", &ranked, 1);
        assert_eq!(b.top.len(), 1);
        assert_eq!(b.top[0].company, "Nvidia");
        assert!((b.average - 0.6).abs() < 1e-12);
        assert_eq!(b.count, 2);

        let empty = sector_benchmark("Finance", &[], 5);
        assert_eq!(empty.average, 0.0);
    }
}
