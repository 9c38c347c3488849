//! Indigenous Score Aggregator
//!
//! Turns validated community observations near a location into a single
//! bounded "Indigenous Observations Score" for the hybrid risk formula.
//!
//! Each observation contributes `severity_weight × reliability_score` to its
//! category. Categories map to four sub-scores with independent caps:
//!
//! | Sub-score  | Categories                                            | Divisor | Cap  |
//! |------------|-------------------------------------------------------|---------|------|
//! | wave       | anomalous_waves                                       | 3       | 0.40 |
//! | wind       | wind_pattern_shift                                    | 3       | 0.30 |
//! | tidal      | tidal_anomaly                                         | 3       | 0.25 |
//! | ecosystem  | wildlife_behavior + coastal_erosion + mangrove_stress | 9       | 0.20 |
//!
//! The caps sum to 1.15, so the total is clamped to 1.0 again. Confidence
//! grows linearly with the number of observations and saturates at five.

use chrono::{DateTime, Utc};
use coastal_common::time::{hours_before, now};
use coastal_common::{BoundingBox, Error, Location, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::db::{ObservationFilter, ObservationOrder, ObservationStore};
use crate::models::{Observation, ObservationCategory};
use crate::utils::round_to;

/// Search half-width around the target location in degrees (~50 km)
pub const SEARCH_RADIUS_DEGREES: f64 = 0.45;

/// Default lookback window
pub const DEFAULT_HOURS_BACK: i64 = 24;

/// Observation count at which confidence reaches 1.0
const FULL_CONFIDENCE_COUNT: f64 = 5.0;

const WAVE_DIVISOR: f64 = 3.0;
const WAVE_CAP: f64 = 0.4;
const WIND_DIVISOR: f64 = 3.0;
const WIND_CAP: f64 = 0.3;
const TIDAL_DIVISOR: f64 = 3.0;
const TIDAL_CAP: f64 = 0.25;
const ECOSYSTEM_DIVISOR: f64 = 9.0;
const ECOSYSTEM_CAP: f64 = 0.2;

/// Aggregated community signal for one location and window
///
/// Recomputed on every call and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateScoreResult {
    pub wave_anomaly_score: f64,
    pub wind_anomaly_score: f64,
    pub tidal_anomaly_score: f64,
    pub ecosystem_stress_score: f64,
    /// Sum of the sub-scores, at most 1.0
    pub total_indigenous_score: f64,
    /// min(count / 5, 1.0)
    pub confidence: f64,
    pub num_observations: usize,
    /// Matching observations, most reliable first
    pub observations: Vec<Observation>,
}

impl AggregateScoreResult {
    /// Result for a window with no matching observations
    pub fn empty() -> Self {
        Self {
            wave_anomaly_score: 0.0,
            wind_anomaly_score: 0.0,
            tidal_anomaly_score: 0.0,
            ecosystem_stress_score: 0.0,
            total_indigenous_score: 0.0,
            confidence: 0.0,
            num_observations: 0,
            observations: Vec::new(),
        }
    }

    /// Score observations already selected for the window
    ///
    /// Pure function of its input; used by the aggregator after querying.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        if observations.is_empty() {
            return Self::empty();
        }

        let mut raw: HashMap<ObservationCategory, f64> = HashMap::new();
        for observation in &observations {
            *raw.entry(observation.category).or_insert(0.0) +=
                observation.severity.weight() * observation.reliability_score;
        }
        let raw_of = |category: ObservationCategory| raw.get(&category).copied().unwrap_or(0.0);

        let wave = (raw_of(ObservationCategory::AnomalousWaves) / WAVE_DIVISOR).min(WAVE_CAP);
        let wind = (raw_of(ObservationCategory::WindPatternShift) / WIND_DIVISOR).min(WIND_CAP);
        let tidal = (raw_of(ObservationCategory::TidalAnomaly) / TIDAL_DIVISOR).min(TIDAL_CAP);
        let ecosystem = ((raw_of(ObservationCategory::WildlifeBehavior)
            + raw_of(ObservationCategory::CoastalErosion)
            + raw_of(ObservationCategory::MangroveStress))
            / ECOSYSTEM_DIVISOR)
            .min(ECOSYSTEM_CAP);

        let total = (wave + wind + tidal + ecosystem).min(1.0);
        let count = observations.len();
        let confidence = (count as f64 / FULL_CONFIDENCE_COUNT).min(1.0);

        Self {
            wave_anomaly_score: round_to(wave, 3),
            wind_anomaly_score: round_to(wind, 3),
            tidal_anomaly_score: round_to(tidal, 3),
            ecosystem_stress_score: round_to(ecosystem, 3),
            total_indigenous_score: round_to(total, 3),
            confidence: round_to(confidence, 3),
            num_observations: count,
            observations,
        }
    }
}

/// Reads validated observations and produces indigenous scores
///
/// Read-only; safe to share across concurrent callers.
#[derive(Debug, Clone)]
pub struct IndigenousScoreAggregator {
    store: ObservationStore,
}

impl IndigenousScoreAggregator {
    pub fn new(store: ObservationStore) -> Self {
        Self { store }
    }

    /// Score validated observations within ~50 km and `hours_back` hours
    pub async fn calculate_indigenous_score(
        &self,
        location: Location,
        hours_back: i64,
    ) -> Result<AggregateScoreResult> {
        self.calculate_indigenous_score_at(location, hours_back, now())
            .await
    }

    /// Same as [`Self::calculate_indigenous_score`] with an explicit clock
    pub async fn calculate_indigenous_score_at(
        &self,
        location: Location,
        hours_back: i64,
        now: DateTime<Utc>,
    ) -> Result<AggregateScoreResult> {
        if hours_back <= 0 {
            return Err(Error::Validation(format!(
                "hours_back must be positive (got {})",
                hours_back
            )));
        }
        if !location.is_on_globe() {
            return Err(Error::Validation(format!(
                "Location ({}, {}) is not a valid coordinate",
                location.lat, location.lon
            )));
        }

        let filter = ObservationFilter::validated()
            .within(BoundingBox::around(location, SEARCH_RADIUS_DEGREES))
            .since(hours_before(now, hours_back))
            .order_by(ObservationOrder::ReliabilityDesc);

        let observations = self.store.query_observations(&filter).await?;
        if observations.is_empty() {
            debug!(
                "No validated observations near ({}, {}) in last {}h",
                location.lat, location.lon, hours_back
            );
            return Ok(AggregateScoreResult::empty());
        }

        let result = AggregateScoreResult::from_observations(observations);
        info!(
            "Indigenous score {:.3} (confidence {:.2}, {} observations) near ({}, {})",
            result.total_indigenous_score,
            result.confidence,
            result.num_observations,
            location.lat,
            location.lon
        );

        Ok(result)
    }
}
