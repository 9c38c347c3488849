//! Observation Validator
//!
//! Write-path gatekeeper for community observations: accepts submissions,
//! records validation decisions, and owns reliability scoring.
//!
//! Reliability combines five factors:
//! 1. Observer's historical accuracy × stated confidence
//! 2. Severity weight (70% observer trust, 30% severity)
//! 3. Flat boost once a validator marks the observation valid
//! 4. Corroboration by other valid observations of the same category nearby
//! 5. Clamp to 1.0 after each boost, round to 3 decimals
//!
//! Validation outcomes do not feed back into the observer's accuracy score.
//! The schema carries `accuracy_score`, but no learning rule is defined yet.

use chrono::{DateTime, Utc};
use coastal_common::time::{days_before, now};
use coastal_common::{BoundingBox, Error, Location, Result};
use tracing::{debug, info, warn};

use crate::db::{ObservationFilter, ObservationOrder, ObservationStore};
use crate::models::{
    NewObservation, Observation, ObservationCategory, ObserverRole, Severity, ValidationRecord,
    ANONYMOUS_OBSERVER_NAME,
};
use crate::utils::round_to;

/// Confidence assumed when the observer does not state one
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// Share of the score carried by observer accuracy × confidence
const OBSERVER_TRUST_SHARE: f64 = 0.7;

/// Share of the score carried by severity weight
const SEVERITY_SHARE: f64 = 0.3;

/// Flat boost for observations a validator marked valid
pub const VALIDATION_BOOST: f64 = 0.15;

/// Boost per corroborating observation
pub const CORROBORATION_BOOST: f64 = 0.05;

/// Corroboration search half-width in degrees (~10 km)
pub const CORROBORATION_RADIUS_DEGREES: f64 = 0.09;

/// An observation as submitted by a community member
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub observer_id: String,
    pub category: ObservationCategory,
    pub description: String,
    pub location: Location,
    pub severity: Severity,
    pub confidence: f64,
}

impl Submission {
    /// Submission with default severity (MODERATE) and confidence (0.7)
    pub fn new(
        observer_id: impl Into<String>,
        category: ObservationCategory,
        description: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            observer_id: observer_id.into(),
            category,
            description: description.into(),
            location,
            severity: Severity::default(),
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(Error::Validation(format!(
                "Confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        if !self.location.is_on_globe() {
            return Err(Error::Validation(format!(
                "Location ({}, {}) is not a valid coordinate",
                self.location.lat, self.location.lon
            )));
        }
        Ok(())
    }
}

/// Parameters for [`ObservationValidator::get_recent_observations`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentObservationsQuery {
    pub days: i64,
    pub category: Option<ObservationCategory>,
    pub min_reliability: f64,
}

impl Default for RecentObservationsQuery {
    fn default() -> Self {
        Self {
            days: 7,
            category: None,
            min_reliability: 0.3,
        }
    }
}

/// Reliability of a single observation from its scoring inputs
///
/// Always within [0, 1] for inputs in [0, 1], whatever the corroboration count.
pub fn reliability_score(
    observer_accuracy: f64,
    confidence: f64,
    severity: Severity,
    is_valid: bool,
    corroboration_count: i64,
) -> f64 {
    let mut score = observer_accuracy * confidence;
    score = score * OBSERVER_TRUST_SHARE + severity.weight() * SEVERITY_SHARE;

    if is_valid {
        score = (score + VALIDATION_BOOST).min(1.0);
    }

    if corroboration_count > 0 {
        score = (score + corroboration_count as f64 * CORROBORATION_BOOST).min(1.0);
    }

    round_to(score.clamp(0.0, 1.0), 3)
}

/// Accepts, validates and scores community observations
///
/// Holds an explicit handle to its store; construct one per store.
#[derive(Debug, Clone)]
pub struct ObservationValidator {
    store: ObservationStore,
}

impl ObservationValidator {
    pub fn new(store: ObservationStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ObservationStore {
        &self.store
    }

    /// Register a community observer (no-op if already registered)
    pub async fn register_observer(
        &self,
        observer_id: &str,
        name: &str,
        role: ObserverRole,
        location: Location,
    ) -> Result<bool> {
        if observer_id.trim().is_empty() {
            return Err(Error::Validation("Observer id must not be empty".to_string()));
        }
        if !location.is_on_globe() {
            return Err(Error::Validation(format!(
                "Location ({}, {}) is not a valid coordinate",
                location.lat, location.lon
            )));
        }
        self.store
            .register_observer(observer_id, name, role, location)
            .await
    }

    /// Store a new observation and return its id
    ///
    /// Unknown (or blank) observer ids are not rejected; their observations
    /// are recorded under the name "Anonymous".
    pub async fn submit_observation(&self, submission: Submission) -> Result<i64> {
        if let Err(e) = submission.validate() {
            warn!("Rejected observation from {}: {}", submission.observer_id, e);
            return Err(e);
        }

        let observer_name = match self.store.observer_name(&submission.observer_id).await? {
            Some(name) => name,
            None => {
                debug!(
                    "Observer {} not registered, submitting as {}",
                    submission.observer_id, ANONYMOUS_OBSERVER_NAME
                );
                ANONYMOUS_OBSERVER_NAME.to_string()
            }
        };

        let observation = NewObservation {
            observer_id: submission.observer_id,
            observer_name,
            location: submission.location,
            category: submission.category,
            description: submission.description,
            confidence: submission.confidence,
            severity: submission.severity,
            submitted_at: now(),
        };

        self.store.insert_observation(&observation).await
    }

    /// Record a validator's decision
    ///
    /// The adjustment is kept in the audit log only; it changes neither the
    /// observation's reliability nor the observer's accuracy.
    pub async fn validate_observation(
        &self,
        observation_id: i64,
        validator_id: &str,
        is_valid: bool,
        reliability_adjustment: f64,
        notes: &str,
    ) -> Result<ValidationRecord> {
        if !reliability_adjustment.is_finite() {
            return Err(Error::Validation(
                "Reliability adjustment must be a finite number".to_string(),
            ));
        }
        self.store
            .record_validation(observation_id, validator_id, is_valid, reliability_adjustment, notes)
            .await
    }

    /// Recompute, persist and return an observation's reliability
    ///
    /// Returns 0.0 without writing anything when the observation does not
    /// exist or its observer is not registered (no accuracy to score with).
    pub async fn calculate_observation_reliability(&self, observation_id: i64) -> Result<f64> {
        let Some(observation) = self.store.get_observation(observation_id).await? else {
            debug!("Observation {} not found, reliability 0.0", observation_id);
            return Ok(0.0);
        };

        let Some(observer) = self.store.get_observer(&observation.observer_id).await? else {
            debug!(
                "Observer {} of observation {} not registered, reliability 0.0",
                observation.observer_id, observation_id
            );
            return Ok(0.0);
        };

        let corroboration_count = self.count_corroborating(&observation).await?;

        let score = reliability_score(
            observer.accuracy_score,
            observation.confidence,
            observation.severity,
            observation.is_valid(),
            corroboration_count,
        );

        self.store.update_reliability(observation_id, score).await?;

        debug!(
            "Observation {} reliability {:.3} (accuracy {:.2}, confidence {:.2}, {}, {} corroborating)",
            observation_id,
            score,
            observer.accuracy_score,
            observation.confidence,
            observation.validation_state,
            corroboration_count
        );

        Ok(score)
    }

    /// Validated observations newer than `days`, newest first
    pub async fn get_recent_observations(
        &self,
        query: RecentObservationsQuery,
    ) -> Result<Vec<Observation>> {
        self.get_recent_observations_at(query, now()).await
    }

    /// Same as [`Self::get_recent_observations`] with an explicit clock
    pub async fn get_recent_observations_at(
        &self,
        query: RecentObservationsQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<Observation>> {
        if query.days <= 0 {
            return Err(Error::Validation(format!(
                "Lookback must be at least one day (got {})",
                query.days
            )));
        }

        let filter = ObservationFilter::validated()
            .since(days_before(now, query.days))
            .min_reliability(query.min_reliability)
            .category(query.category)
            .order_by(ObservationOrder::RecencyDesc);

        let observations = self.store.query_observations(&filter).await?;
        info!(
            "Found {} recent observations (last {} days)",
            observations.len(),
            query.days
        );
        Ok(observations)
    }

    /// Other valid observations of the same category within ~10 km
    async fn count_corroborating(&self, observation: &Observation) -> Result<i64> {
        let filter = ObservationFilter::validated()
            .within(BoundingBox::around(observation.location, CORROBORATION_RADIUS_DEGREES))
            .category(Some(observation.category))
            .excluding(observation.id);

        self.store.count_observations(&filter).await
    }
}
