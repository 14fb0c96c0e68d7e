// tests/scoring.rs
//
// End-to-end checks of the scoring core through the public API, plus
// property tests for the component bounds.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use news_relevance_ranker::config::{RankingConfig, Weights};
use news_relevance_ranker::scoring::{article_volume, recency_weight, ScoringEngine};
use news_relevance_ranker::signal::{ArticleSentiment, RawArticle};
use news_relevance_ranker::ValidationError;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap()
}

fn reference_engine() -> ScoringEngine {
    let cfg = RankingConfig::new(
        Weights {
            sentiment_strength: 0.5,
            article_volume: 0.2,
            recency: 0.3,
        },
        24.0,
    )
    .expect("reference weights are valid");
    ScoringEngine::new(cfg)
}

fn reference_signals(now: DateTime<Utc>) -> Vec<ArticleSentiment> {
    vec![
        ArticleSentiment::new("Acme beats estimates", now, 1, 1.0).unwrap(),
        ArticleSentiment::new("Acme raises guidance", now, 1, 1.0).unwrap(),
        ArticleSentiment::new("Acme recalls product", now - Duration::hours(48), -1, 1.0).unwrap(),
    ]
}

#[test]
fn reference_scenario_lands_mid_range() {
    let c = reference_engine().score(&reference_signals(now()), now());

    assert!((c.sentiment_strength - 1.0 / 3.0).abs() < 1e-9);
    assert!((c.article_volume - (4.0_f64).ln() / 3.0).abs() < 1e-9);
    let expected_recency = (2.0 + (-2.0_f64).exp()) / 3.0;
    assert!((c.recency - expected_recency).abs() < 1e-9);

    assert!(
        c.composite_score > 0.4 && c.composite_score < 0.6,
        "composite {} outside (0.4, 0.6)",
        c.composite_score
    );
    assert!((c.composite_score - 0.4726).abs() < 1e-3);
}

#[test]
fn day_later_evaluation_has_lower_recency() {
    let engine = reference_engine();
    let signals = reference_signals(now());
    let early = engine.score(&signals, now());
    let late = engine.score(&signals, now() + Duration::hours(24));
    assert!(late.recency < early.recency);
    assert_eq!(late.article_volume, early.article_volume);
    assert_eq!(late.sentiment_strength, early.sentiment_strength);
}

#[test]
fn empty_input_scores_zero() {
    let c = reference_engine().score(&[], now());
    assert!(c.is_zero());
}

#[test]
fn raw_articles_accept_labels_and_reject_bad_batches() {
    let engine = reference_engine();
    let ok = vec![
        RawArticle {
            text: "Acme beats estimates".into(),
            published_at: "2024-03-15T09:30:00Z".into(),
            polarity: None,
            label: Some("Positive".into()),
            confidence: 0.9,
        },
        RawArticle {
            text: "Acme holds annual meeting".into(),
            published_at: "2024-03-15T08:30:00+00:00".into(),
            polarity: Some(0),
            label: None,
            confidence: 0.8,
        },
    ];
    let c = engine.score_raw(&ok, now()).unwrap();
    assert!((c.sentiment_strength - 0.45).abs() < 1e-9);

    let mut bad = ok.clone();
    bad[1].confidence = 1.5;
    match engine.score_raw(&bad, now()).unwrap_err() {
        ValidationError::InBatch { index, source } => {
            assert_eq!(index, 1);
            assert!(matches!(*source, ValidationError::ConfidenceOutOfRange(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ── Properties ───────────────────────────────────────────────────────

fn arb_signal() -> impl Strategy<Value = (i64, f64, i64)> {
    // (polarity, confidence, age in minutes; negative = future)
    (-1_i64..=1, 0.0..=1.0_f64, -600_i64..20_000)
}

/// Three non-negative weights normalized to sum to 1; corners (all weight on
/// one component) are drawn explicitly since uniform sampling rarely hits them.
fn arb_weights() -> impl Strategy<Value = (f64, f64, f64)> {
    prop_oneof![
        Just((1.0, 0.0, 0.0)),
        Just((0.0, 1.0, 0.0)),
        Just((0.0, 0.0, 1.0)),
        (0.0..=1.0_f64, 0.0..=1.0_f64, 0.0..=1.0_f64)
            .prop_filter("weights must not all be zero", |(a, b, c)| a + b + c > 1e-3)
            .prop_map(|(a, b, c)| {
                let sum = a + b + c;
                (a / sum, b / sum, c / sum)
            }),
    ]
}

proptest! {
    #[test]
    fn volume_is_monotonic_and_bounded(n in 0_usize..10_000) {
        let v = article_volume(n);
        let next = article_volume(n + 1);
        prop_assert!((0.0..=1.0).contains(&v));
        prop_assert!(next >= v);
    }

    #[test]
    fn recency_never_increases_with_age(
        age in 0.0..10_000.0_f64,
        delta in 0.0..1_000.0_f64,
        half_life in 0.1..500.0_f64,
    ) {
        let a = recency_weight(age, half_life);
        let b = recency_weight(age + delta, half_life);
        prop_assert!((0.0..=1.0).contains(&a));
        prop_assert!(b <= a);
    }

    #[test]
    fn composite_stays_in_unit_interval(
        (sentiment_w, volume_w, recency_w) in arb_weights(),
        half_life in 0.1..1_000.0_f64,
        signals in prop::collection::vec(arb_signal(), 0..40),
    ) {
        let cfg = RankingConfig::new(
            Weights {
                sentiment_strength: sentiment_w,
                article_volume: volume_w,
                recency: recency_w,
            },
            half_life,
        );
        prop_assert!(cfg.is_ok(), "normalized weights must validate: {:?}", cfg);
        let engine = ScoringEngine::new(cfg.unwrap());

        let now = now();
        let records: Vec<ArticleSentiment> = signals
            .iter()
            .map(|&(p, conf, age_min)| {
                ArticleSentiment::new("headline", now - Duration::minutes(age_min), p, conf).unwrap()
            })
            .collect();
        let c = engine.score(&records, now);
        prop_assert!((0.0..=1.0).contains(&c.composite_score));
        prop_assert!((-1.0..=1.0).contains(&c.sentiment_strength));
        prop_assert!((0.0..=1.0).contains(&c.recency));
    }
}
