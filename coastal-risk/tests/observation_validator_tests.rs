//! Integration tests for observation submission, validation and scoring

mod helpers;

use chrono::{Duration, Utc};
use coastal_common::Location;
use coastal_risk::models::{
    ObservationCategory, ObserverRole, Severity, ValidationState, ANONYMOUS_OBSERVER_NAME,
};
use coastal_risk::services::{ObservationValidator, RecentObservationsQuery, Submission};
use helpers::{memory_store, new_observation, validated_observation, KOCHI, KOZHIKODE};

async fn validator() -> ObservationValidator {
    ObservationValidator::new(memory_store().await)
}

fn wave_report(observer_id: &str) -> Submission {
    Submission::new(
        observer_id,
        ObservationCategory::AnomalousWaves,
        "Waves breaking much further up the beach than usual",
        KOCHI,
    )
}

#[tokio::test]
async fn test_register_validates_input() {
    let validator = validator().await;

    let err = validator
        .register_observer("  ", "Ravi", ObserverRole::Fisherman, KOCHI)
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = validator
        .register_observer("fisher-1", "Ravi", ObserverRole::Fisherman, Location::new(95.0, 76.0))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert!(validator
        .register_observer("fisher-1", "Ravi", ObserverRole::Fisherman, KOCHI)
        .await
        .unwrap());
    assert!(!validator
        .register_observer("fisher-1", "Ravi", ObserverRole::Fisherman, KOCHI)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_submit_uses_registered_name() {
    let validator = validator().await;
    validator
        .register_observer("fisher-1", "Ravi", ObserverRole::Fisherman, KOCHI)
        .await
        .unwrap();

    let id = validator.submit_observation(wave_report("fisher-1")).await.unwrap();

    let observation = validator.store().get_observation(id).await.unwrap().unwrap();
    assert_eq!(observation.observer_name, "Ravi");
    assert_eq!(observation.severity, Severity::Moderate);
    assert_eq!(observation.confidence, 0.7);
    assert_eq!(observation.validation_state, ValidationState::Unvalidated);

    let observer = validator.store().get_observer("fisher-1").await.unwrap().unwrap();
    assert_eq!(observer.total_observations, 1);
}

#[tokio::test]
async fn test_submit_from_unknown_observer_is_anonymous() {
    let validator = validator().await;
    let id = validator.submit_observation(wave_report("walk-in")).await.unwrap();

    let observation = validator.store().get_observation(id).await.unwrap().unwrap();
    assert_eq!(observation.observer_name, ANONYMOUS_OBSERVER_NAME);
    assert_eq!(observation.observer_id, "walk-in");
}

#[tokio::test]
async fn test_submit_with_blank_observer_is_anonymous() {
    let validator = validator().await;
    let id = validator.submit_observation(wave_report("")).await.unwrap();

    let observation = validator.store().get_observation(id).await.unwrap().unwrap();
    assert_eq!(observation.observer_name, ANONYMOUS_OBSERVER_NAME);
    assert_eq!(observation.observer_id, "");
}

#[tokio::test]
async fn test_submit_rejects_bad_confidence() {
    let validator = validator().await;
    for confidence in [-0.1, 1.01, f64::NAN] {
        let err = validator
            .submit_observation(wave_report("fisher-1").with_confidence(confidence))
            .await
            .unwrap_err();
        assert!(err.is_validation(), "confidence {}", confidence);
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM observations")
        .fetch_one(validator.store().pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_reliability_unvalidated_then_validated() {
    let validator = validator().await;
    validator
        .register_observer("fisher-1", "Ravi", ObserverRole::Fisherman, KOCHI)
        .await
        .unwrap();
    let id = validator.submit_observation(wave_report("fisher-1")).await.unwrap();

    // 0.5 * 0.7 * 0.7 + 0.5 * 0.3
    assert_eq!(validator.calculate_observation_reliability(id).await.unwrap(), 0.395);

    validator
        .validate_observation(id, "elder-1", true, 0.0, "Seen it too")
        .await
        .unwrap();
    assert_eq!(validator.calculate_observation_reliability(id).await.unwrap(), 0.545);

    let observation = validator.store().get_observation(id).await.unwrap().unwrap();
    assert_eq!(observation.reliability_score, 0.545);
}

#[tokio::test]
async fn test_reliability_is_idempotent() {
    let validator = validator().await;
    validator
        .register_observer("fisher-1", "Ravi", ObserverRole::Fisherman, KOCHI)
        .await
        .unwrap();
    let id = validator
        .submit_observation(wave_report("fisher-1").with_severity(Severity::Critical))
        .await
        .unwrap();

    let first = validator.calculate_observation_reliability(id).await.unwrap();
    let second = validator.calculate_observation_reliability(id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_reliability_counts_corroboration() {
    let store = memory_store().await;
    let validator = ObservationValidator::new(store.clone());
    validator
        .register_observer("fisher-1", "Ravi", ObserverRole::Fisherman, KOCHI)
        .await
        .unwrap();

    // Two validated wave reports within ~10 km, one outside, one other category
    let nearby = Location::new(KOCHI.lat + 0.05, KOCHI.lon - 0.05);
    for location in [KOCHI, nearby] {
        validated_observation(
            &store,
            "fisher-2",
            ObservationCategory::AnomalousWaves,
            Severity::High,
            location,
            Duration::hours(1),
            0.6,
        )
        .await;
    }
    validated_observation(
        &store,
        "fisher-2",
        ObservationCategory::AnomalousWaves,
        Severity::High,
        KOZHIKODE,
        Duration::hours(1),
        0.6,
    )
    .await;
    validated_observation(
        &store,
        "fisher-2",
        ObservationCategory::TidalAnomaly,
        Severity::High,
        KOCHI,
        Duration::hours(1),
        0.6,
    )
    .await;

    let id = validator.submit_observation(wave_report("fisher-1")).await.unwrap();
    validator
        .validate_observation(id, "elder-1", true, 0.0, "")
        .await
        .unwrap();

    // 0.545 + 2 * 0.05
    assert_eq!(validator.calculate_observation_reliability(id).await.unwrap(), 0.645);
}

#[tokio::test]
async fn test_reliability_zero_without_registered_observer() {
    let validator = validator().await;
    let id = validator.submit_observation(wave_report("walk-in")).await.unwrap();

    assert_eq!(validator.calculate_observation_reliability(id).await.unwrap(), 0.0);
    assert_eq!(validator.calculate_observation_reliability(12345).await.unwrap(), 0.0);
}

#[tokio::test]
async fn test_validate_missing_observation_is_not_found() {
    let validator = validator().await;
    let err = validator
        .validate_observation(404, "elder-1", true, 0.0, "")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_validate_rejects_non_finite_adjustment() {
    let validator = validator().await;
    let id = validator.submit_observation(wave_report("fisher-1")).await.unwrap();
    let err = validator
        .validate_observation(id, "elder-1", true, f64::INFINITY, "")
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_invalid_decision_excludes_from_recent() {
    let store = memory_store().await;
    let validator = ObservationValidator::new(store.clone());
    let id = validated_observation(
        &store,
        "fisher-1",
        ObservationCategory::CoastalErosion,
        Severity::High,
        KOCHI,
        Duration::hours(3),
        0.9,
    )
    .await;

    let before = validator
        .get_recent_observations(RecentObservationsQuery::default())
        .await
        .unwrap();
    assert_eq!(before.len(), 1);

    validator
        .validate_observation(id, "elder-2", false, 0.0, "Old erosion, not new")
        .await
        .unwrap();
    let after = validator
        .get_recent_observations(RecentObservationsQuery::default())
        .await
        .unwrap();
    assert!(after.is_empty());
}

#[tokio::test]
async fn test_recent_observations_window_and_filters() {
    let store = memory_store().await;
    let validator = ObservationValidator::new(store.clone());
    let now = Utc::now();

    let fresh_wave = validated_observation(
        &store,
        "fisher-1",
        ObservationCategory::AnomalousWaves,
        Severity::High,
        KOCHI,
        Duration::hours(6),
        0.7,
    )
    .await;
    let older_tide = validated_observation(
        &store,
        "fisher-1",
        ObservationCategory::TidalAnomaly,
        Severity::Moderate,
        KOZHIKODE,
        Duration::days(3),
        0.5,
    )
    .await;
    // Outside the 7-day window
    validated_observation(
        &store,
        "fisher-1",
        ObservationCategory::AnomalousWaves,
        Severity::High,
        KOCHI,
        Duration::days(10),
        0.9,
    )
    .await;
    // Below the default reliability floor
    validated_observation(
        &store,
        "fisher-1",
        ObservationCategory::AnomalousWaves,
        Severity::High,
        KOCHI,
        Duration::hours(1),
        0.2,
    )
    .await;
    // Never validated
    store
        .insert_observation(&new_observation(
            "fisher-1",
            ObservationCategory::AnomalousWaves,
            Severity::Critical,
            KOCHI,
            now,
        ))
        .await
        .unwrap();

    let recent = validator
        .get_recent_observations_at(RecentObservationsQuery::default(), now)
        .await
        .unwrap();
    let ids: Vec<i64> = recent.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![fresh_wave, older_tide]);

    let waves_only = validator
        .get_recent_observations_at(
            RecentObservationsQuery {
                category: Some(ObservationCategory::AnomalousWaves),
                ..RecentObservationsQuery::default()
            },
            now,
        )
        .await
        .unwrap();
    assert_eq!(waves_only.len(), 1);
    assert_eq!(waves_only[0].id, fresh_wave);

    let last_day = validator
        .get_recent_observations_at(
            RecentObservationsQuery {
                days: 1,
                min_reliability: 0.0,
                ..RecentObservationsQuery::default()
            },
            now,
        )
        .await
        .unwrap();
    assert_eq!(last_day.len(), 2);

    let err = validator
        .get_recent_observations_at(
            RecentObservationsQuery {
                days: 0,
                ..RecentObservationsQuery::default()
            },
            now,
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_recent_observations_huge_lookback() {
    let store = memory_store().await;
    let validator = ObservationValidator::new(store.clone());
    validated_observation(
        &store,
        "fisher-1",
        ObservationCategory::TidalAnomaly,
        Severity::Moderate,
        KOCHI,
        Duration::days(400),
        0.9,
    )
    .await;

    for days in [1_000_000_000, i64::MAX] {
        let recent = validator
            .get_recent_observations(RecentObservationsQuery {
                days,
                ..RecentObservationsQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(recent.len(), 1, "days {}", days);
    }
}
