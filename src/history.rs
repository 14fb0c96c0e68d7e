//! Bounded in-memory log of per-company scores for trend views.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::scoring::ScoreComponents;
use crate::signal::SentimentBreakdown;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub company: String,
    pub score: f64,
    pub components: ScoreComponents,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<SentimentBreakdown>,
}

#[derive(Debug)]
pub struct ScoreHistory {
    inner: Mutex<VecDeque<HistoryEntry>>,
    cap: usize,
}

impl ScoreHistory {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 100_000);
        Self {
            inner: Mutex::new(VecDeque::with_capacity(cap.min(10_000))),
            cap,
        }
    }

    /// Only successful analyses belong here; callers skip isolated failures.
    pub fn record(
        &self,
        company: &str,
        components: &ScoreComponents,
        breakdown: Option<SentimentBreakdown>,
        at: DateTime<Utc>,
    ) {
        let entry = HistoryEntry {
            at,
            company: company.to_string(),
            score: components.composite_score,
            components: *components,
            breakdown,
        };

        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push_back(entry);
        while v.len() > self.cap {
            v.pop_front();
        }
    }

    /// Entries for `company` recorded within the last `days` before `now`, oldest first.
    pub fn for_company(&self, company: &str, days: u32, now: DateTime<Utc>) -> Vec<HistoryEntry> {
        let cutoff = now - Duration::days(i64::from(days));
        let v = self.inner.lock().expect("history mutex poisoned");
        let mut out: Vec<HistoryEntry> = v
            .iter()
            .filter(|e| e.company == company && e.at >= cutoff)
            .cloned()
            .collect();
        out.sort_by_key(|e| e.at);
        out
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("history mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
