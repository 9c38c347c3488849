//! Community observer and observation endpoints
//!
//! Region bounds are enforced here; the services only require coordinates
//! that exist on the globe.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use coastal_common::Location;
use serde::{Deserialize, Serialize};

use crate::models::{
    Observation, ObservationCategory, ObserverRole, Severity, ValidationRecord,
};
use crate::services::indigenous_aggregator::DEFAULT_HOURS_BACK;
use crate::services::{AggregateScoreResult, RecentObservationsQuery, Submission};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterObserverRequest {
    pub observer_id: String,
    pub name: String,
    pub role: ObserverRole,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Serialize)]
pub struct RegisterObserverResponse {
    pub observer_id: String,
    /// False when the id was already registered (nothing changed)
    pub registered: bool,
}

/// POST /api/observers
pub async fn register_observer(
    State(state): State<AppState>,
    Json(request): Json<RegisterObserverRequest>,
) -> ApiResult<(StatusCode, Json<RegisterObserverResponse>)> {
    let location = Location::new(request.lat, request.lon);
    state.inputs.validate_coordinates(location)?;

    let registered = state
        .validator
        .register_observer(&request.observer_id, &request.name, request.role, location)
        .await?;

    let status = if registered {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(RegisterObserverResponse {
            observer_id: request.observer_id,
            registered,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SubmitObservationRequest {
    pub observer_id: String,
    pub category: ObservationCategory,
    #[serde(default)]
    pub description: String,
    pub lat: f64,
    pub lon: f64,
    pub severity: Option<Severity>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SubmitObservationResponse {
    pub observation_id: i64,
}

/// POST /api/observations
pub async fn submit_observation(
    State(state): State<AppState>,
    Json(request): Json<SubmitObservationRequest>,
) -> ApiResult<(StatusCode, Json<SubmitObservationResponse>)> {
    let location = Location::new(request.lat, request.lon);
    state.inputs.validate_coordinates(location)?;

    let mut submission = Submission::new(
        request.observer_id,
        request.category,
        request.description,
        location,
    );
    if let Some(severity) = request.severity {
        submission = submission.with_severity(severity);
    }
    if let Some(confidence) = request.confidence {
        submission = submission.with_confidence(confidence);
    }

    let observation_id = state.validator.submit_observation(submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitObservationResponse { observation_id }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ValidateObservationRequest {
    pub validator_id: String,
    pub is_valid: bool,
    #[serde(default)]
    pub reliability_adjustment: f64,
    #[serde(default)]
    pub notes: String,
}

/// POST /api/observations/:id/validate
pub async fn validate_observation(
    State(state): State<AppState>,
    Path(observation_id): Path<i64>,
    Json(request): Json<ValidateObservationRequest>,
) -> ApiResult<Json<ValidationRecord>> {
    if request.validator_id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "validator_id must not be empty".to_string(),
        ));
    }

    let record = state
        .validator
        .validate_observation(
            observation_id,
            &request.validator_id,
            request.is_valid,
            request.reliability_adjustment,
            &request.notes,
        )
        .await?;

    Ok(Json(record))
}

#[derive(Debug, Serialize)]
pub struct ReliabilityResponse {
    pub observation_id: i64,
    pub reliability_score: f64,
}

/// POST /api/observations/:id/reliability
///
/// Unlike the service call, an unknown id is reported as 404 rather than 0.0.
pub async fn recalculate_reliability(
    State(state): State<AppState>,
    Path(observation_id): Path<i64>,
) -> ApiResult<Json<ReliabilityResponse>> {
    if state
        .validator
        .store()
        .get_observation(observation_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!(
            "Observation {} not found",
            observation_id
        )));
    }

    let reliability_score = state
        .validator
        .calculate_observation_reliability(observation_id)
        .await?;

    Ok(Json(ReliabilityResponse {
        observation_id,
        reliability_score,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecentObservationsParams {
    pub days: Option<i64>,
    pub category: Option<ObservationCategory>,
    pub min_reliability: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RecentObservationsResponse {
    pub count: usize,
    pub observations: Vec<Observation>,
}

/// GET /api/observations/recent
pub async fn recent_observations(
    State(state): State<AppState>,
    Query(params): Query<RecentObservationsParams>,
) -> ApiResult<Json<RecentObservationsResponse>> {
    let defaults = RecentObservationsQuery::default();
    let query = RecentObservationsQuery {
        days: params.days.unwrap_or(defaults.days),
        category: params.category,
        min_reliability: params.min_reliability.unwrap_or(defaults.min_reliability),
    };

    let observations = state.validator.get_recent_observations(query).await?;
    Ok(Json(RecentObservationsResponse {
        count: observations.len(),
        observations,
    }))
}

#[derive(Debug, Deserialize)]
pub struct IndigenousScoreParams {
    pub lat: f64,
    pub lon: f64,
    pub hours_back: Option<i64>,
}

/// GET /api/indigenous-score
pub async fn indigenous_score(
    State(state): State<AppState>,
    Query(params): Query<IndigenousScoreParams>,
) -> ApiResult<Json<AggregateScoreResult>> {
    let location = Location::new(params.lat, params.lon);
    state.inputs.validate_coordinates(location)?;

    let result = state
        .aggregator
        .calculate_indigenous_score(location, params.hours_back.unwrap_or(DEFAULT_HOURS_BACK))
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub category: ObservationCategory,
    pub description: &'static str,
    pub indicators: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct SeverityInfo {
    pub severity: Severity,
    pub weight: f64,
}

#[derive(Debug, Serialize)]
pub struct ObservationTypesResponse {
    pub categories: Vec<CategoryInfo>,
    pub severities: Vec<SeverityInfo>,
}

/// GET /api/observation-types
///
/// Catalogue of reportable categories and severity weights, for building
/// submission forms.
pub async fn observation_types() -> Json<ObservationTypesResponse> {
    let categories = ObservationCategory::ALL
        .iter()
        .map(|category| CategoryInfo {
            category: *category,
            description: category.description(),
            indicators: category.indicators(),
        })
        .collect();
    let severities = Severity::ALL
        .iter()
        .map(|severity| SeverityInfo {
            severity: *severity,
            weight: severity.weight(),
        })
        .collect();

    Json(ObservationTypesResponse {
        categories,
        severities,
    })
}

/// Build observer/observation routes
pub fn observation_routes() -> Router<AppState> {
    Router::new()
        .route("/api/observers", post(register_observer))
        .route("/api/observations", post(submit_observation))
        .route("/api/observations/recent", get(recent_observations))
        .route("/api/observations/:id/validate", post(validate_observation))
        .route(
            "/api/observations/:id/reliability",
            post(recalculate_reliability),
        )
        .route("/api/indigenous-score", get(indigenous_score))
        .route("/api/observation-types", get(observation_types))
}
