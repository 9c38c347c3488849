//! Integration tests for indigenous score aggregation over stored observations

mod helpers;

use chrono::{Duration, Utc};
use coastal_common::Location;
use coastal_risk::models::{ObservationCategory, Severity};
use coastal_risk::services::{AggregateScoreResult, IndigenousScoreAggregator};
use helpers::{memory_store, new_observation, validated_observation, KOCHI, KOZHIKODE};

#[tokio::test]
async fn test_no_observations_is_empty_result() {
    let aggregator = IndigenousScoreAggregator::new(memory_store().await);
    let result = aggregator.calculate_indigenous_score(KOCHI, 24).await.unwrap();
    assert_eq!(result, AggregateScoreResult::empty());
}

#[tokio::test]
async fn test_scores_nearby_recent_validated_only() {
    let store = memory_store().await;
    let aggregator = IndigenousScoreAggregator::new(store.clone());

    let counted = validated_observation(
        &store,
        "fisher-1",
        ObservationCategory::AnomalousWaves,
        Severity::High,
        KOCHI,
        Duration::hours(2),
        0.8,
    )
    .await;
    // Too old
    validated_observation(
        &store,
        "fisher-1",
        ObservationCategory::AnomalousWaves,
        Severity::Critical,
        KOCHI,
        Duration::hours(30),
        1.0,
    )
    .await;
    // Too far
    validated_observation(
        &store,
        "fisher-2",
        ObservationCategory::AnomalousWaves,
        Severity::Critical,
        KOZHIKODE,
        Duration::hours(1),
        1.0,
    )
    .await;
    // Not validated
    store
        .insert_observation(&new_observation(
            "fisher-3",
            ObservationCategory::AnomalousWaves,
            Severity::Critical,
            KOCHI,
            Utc::now(),
        ))
        .await
        .unwrap();

    let result = aggregator.calculate_indigenous_score(KOCHI, 24).await.unwrap();
    assert_eq!(result.num_observations, 1);
    assert_eq!(result.observations[0].id, counted);
    // 0.75 * 0.8 / 3
    assert_eq!(result.wave_anomaly_score, 0.2);
    assert_eq!(result.total_indigenous_score, 0.2);
    assert_eq!(result.confidence, 0.2);
}

#[tokio::test]
async fn test_wider_window_includes_older_observations() {
    let store = memory_store().await;
    let aggregator = IndigenousScoreAggregator::new(store.clone());
    validated_observation(
        &store,
        "fisher-1",
        ObservationCategory::WindPatternShift,
        Severity::Moderate,
        KOCHI,
        Duration::hours(30),
        0.6,
    )
    .await;

    let day = aggregator.calculate_indigenous_score(KOCHI, 24).await.unwrap();
    assert_eq!(day.num_observations, 0);

    let two_days = aggregator.calculate_indigenous_score(KOCHI, 48).await.unwrap();
    assert_eq!(two_days.num_observations, 1);
    // 0.5 * 0.6 / 3
    assert_eq!(two_days.wind_anomaly_score, 0.1);
}

#[tokio::test]
async fn test_observations_ordered_by_reliability() {
    let store = memory_store().await;
    let aggregator = IndigenousScoreAggregator::new(store.clone());
    let mut expected = Vec::new();
    for reliability in [0.3, 0.9, 0.6] {
        let id = validated_observation(
            &store,
            "fisher-1",
            ObservationCategory::TidalAnomaly,
            Severity::Moderate,
            KOCHI,
            Duration::hours(1),
            reliability,
        )
        .await;
        expected.push((reliability, id));
    }
    expected.sort_by(|a, b| b.0.total_cmp(&a.0));

    let result = aggregator.calculate_indigenous_score(KOCHI, 24).await.unwrap();
    let ids: Vec<i64> = result.observations.iter().map(|o| o.id).collect();
    assert_eq!(ids, expected.into_iter().map(|(_, id)| id).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_heavy_reporting_saturates() {
    let store = memory_store().await;
    let aggregator = IndigenousScoreAggregator::new(store.clone());
    for category in ObservationCategory::ALL {
        for _ in 0..10 {
            validated_observation(
                &store,
                "fisher-1",
                category,
                Severity::Critical,
                KOCHI,
                Duration::hours(1),
                1.0,
            )
            .await;
        }
    }

    let result = aggregator.calculate_indigenous_score(KOCHI, 24).await.unwrap();
    assert_eq!(result.num_observations, 60);
    assert_eq!(result.total_indigenous_score, 1.0);
    assert_eq!(result.confidence, 1.0);
    assert!(result.wave_anomaly_score <= 0.4);
    assert!(result.wind_anomaly_score <= 0.3);
    assert!(result.tidal_anomaly_score <= 0.25);
    assert!(result.ecosystem_stress_score <= 0.2);
}

#[tokio::test]
async fn test_explicit_clock() {
    let store = memory_store().await;
    let aggregator = IndigenousScoreAggregator::new(store.clone());
    validated_observation(
        &store,
        "fisher-1",
        ObservationCategory::MangroveStress,
        Severity::High,
        KOCHI,
        Duration::hours(1),
        0.9,
    )
    .await;

    // A day later the observation has aged out of a 12h window
    let later = Utc::now() + Duration::hours(24);
    let result = aggregator
        .calculate_indigenous_score_at(KOCHI, 12, later)
        .await
        .unwrap();
    assert_eq!(result.num_observations, 0);
}

#[tokio::test]
async fn test_huge_lookback_covers_everything() {
    let store = memory_store().await;
    let aggregator = IndigenousScoreAggregator::new(store.clone());
    validated_observation(
        &store,
        "fisher-1",
        ObservationCategory::AnomalousWaves,
        Severity::High,
        KOCHI,
        Duration::days(400),
        0.8,
    )
    .await;

    for hours_back in [1_000_000_000_000, i64::MAX] {
        let result = aggregator
            .calculate_indigenous_score(KOCHI, hours_back)
            .await
            .unwrap();
        assert_eq!(result.num_observations, 1, "hours_back {}", hours_back);
    }
}

#[tokio::test]
async fn test_rejects_bad_arguments() {
    let aggregator = IndigenousScoreAggregator::new(memory_store().await);
    assert!(aggregator
        .calculate_indigenous_score(KOCHI, 0)
        .await
        .unwrap_err()
        .is_validation());
    assert!(aggregator
        .calculate_indigenous_score(Location::new(120.0, 76.0), 24)
        .await
        .unwrap_err()
        .is_validation());
}
