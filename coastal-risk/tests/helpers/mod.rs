//! Shared fixtures for coastal-risk integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use coastal_common::config::{RegionBounds, RiskThresholds};
use coastal_common::Location;
use coastal_risk::db::ObservationStore;
use coastal_risk::models::{NewObservation, ObservationCategory, ObserverRole, Severity};
use coastal_risk::services::FixedConditions;
use coastal_risk::{build_router, AppState};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

/// Fort Kochi beach
pub const KOCHI: Location = Location {
    lat: 9.935,
    lon: 76.267,
};

/// Kozhikode, well outside the 50 km aggregation window around Kochi
pub const KOZHIKODE: Location = Location {
    lat: 11.25,
    lon: 75.78,
};

/// Fresh in-memory store with the full schema
///
/// One connection that never expires, so the in-memory database lives as
/// long as the pool.
pub async fn memory_store() -> ObservationStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");
    coastal_common::db::init_schema(&pool)
        .await
        .expect("Should create schema");
    ObservationStore::new(pool)
}

pub async fn register(store: &ObservationStore, observer_id: &str, name: &str) {
    store
        .register_observer(observer_id, name, ObserverRole::Fisherman, KOCHI)
        .await
        .expect("Should register observer");
}

/// Observation row ready for direct insertion
pub fn new_observation(
    observer_id: &str,
    category: ObservationCategory,
    severity: Severity,
    location: Location,
    submitted_at: DateTime<Utc>,
) -> NewObservation {
    NewObservation {
        observer_id: observer_id.to_string(),
        observer_name: observer_id.to_string(),
        location,
        category,
        description: format!("{} near shore", category),
        confidence: 0.7,
        severity,
        submitted_at,
    }
}

/// Insert, validate and score one observation; returns its id
pub async fn validated_observation(
    store: &ObservationStore,
    observer_id: &str,
    category: ObservationCategory,
    severity: Severity,
    location: Location,
    age: Duration,
    reliability: f64,
) -> i64 {
    let id = store
        .insert_observation(&new_observation(
            observer_id,
            category,
            severity,
            location,
            Utc::now() - age,
        ))
        .await
        .expect("Should insert observation");
    store
        .record_validation(id, "elder-1", true, 0.0, "")
        .await
        .expect("Should validate observation");
    store
        .update_reliability(id, reliability)
        .await
        .expect("Should set reliability");
    id
}

/// Router over `store` with default region and thresholds
pub fn test_app(store: ObservationStore) -> axum::Router {
    test_app_with_conditions(store, FixedConditions::new(2.4, 320.0))
}

pub fn test_app_with_conditions(store: ObservationStore, conditions: FixedConditions) -> axum::Router {
    let state = AppState::new(
        store,
        RegionBounds::default(),
        RiskThresholds::default(),
        Arc::new(conditions),
    );
    build_router(state)
}
