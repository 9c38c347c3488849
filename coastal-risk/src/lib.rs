//! Coastal flood risk fusion and community observation reliability
//!
//! Library interface used by the `coastal-risk` service binary and by the
//! integration tests.

pub mod api;
pub mod db;
pub mod error;
pub mod fusion;
pub mod models;
pub mod services;
pub mod utils;
pub mod validators;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use coastal_common::config::{RegionBounds, RiskThresholds};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::ObservationStore;
use crate::services::{ConditionsSource, IndigenousScoreAggregator, ObservationValidator};
use crate::validators::InputValidator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub validator: ObservationValidator,
    pub aggregator: IndigenousScoreAggregator,
    /// Region and physical range checks for request inputs
    pub inputs: InputValidator,
    pub thresholds: RiskThresholds,
    /// Tide/rainfall provider for live risk assessments
    pub conditions: Arc<dyn ConditionsSource>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: ObservationStore,
        region: RegionBounds,
        thresholds: RiskThresholds,
        conditions: Arc<dyn ConditionsSource>,
    ) -> Self {
        Self {
            validator: ObservationValidator::new(store.clone()),
            aggregator: IndigenousScoreAggregator::new(store),
            inputs: InputValidator::new(region),
            thresholds,
            conditions,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::observation_routes())
        .merge(api::risk_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
