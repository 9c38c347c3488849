//! Flood risk assessment endpoint
//!
//! The indigenous contribution comes either from manual sea/wind selections
//! or from validated community observations near the location. Tide and
//! rainfall come from the request or, on request, the configured conditions
//! source.

use axum::{extract::State, routing::post, Json, Router};
use coastal_common::Location;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::fusion::{assess_risk, IndigenousInput, RiskBreakdown, RiskInputs, RiskLevel};
use crate::services::indigenous_aggregator::DEFAULT_HOURS_BACK;
use crate::services::CurrentConditions;
use crate::validators::InputFields;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct RiskRequest {
    pub lat: f64,
    pub lon: f64,
    /// Mangrove bioshield width in metres
    pub mangrove_width: f64,
    /// Manual mode: "Calm", "Choppy" or "Rough"
    pub sea_state: Option<String>,
    /// Manual mode: "Normal", "High" or "Very High"
    pub wind_speed: Option<String>,
    /// Use the observation aggregator instead of sea/wind selections
    #[serde(default)]
    pub use_community_observations: bool,
    pub hours_back: Option<i64>,
    /// Fetch tide and rainfall from the conditions source
    #[serde(default)]
    pub use_live_conditions: bool,
    #[serde(default)]
    pub tide_level: f64,
    #[serde(default)]
    pub rainfall_mm: f64,
    /// Checked when present; not part of the score
    pub salinity_ppm: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CommunitySignal {
    pub total_indigenous_score: f64,
    pub confidence: f64,
    pub num_observations: usize,
}

#[derive(Debug, Serialize)]
pub struct RiskResponse {
    pub location: Location,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub breakdown: RiskBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<CommunitySignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<CurrentConditions>,
}

/// POST /api/risk
pub async fn assess(
    State(state): State<AppState>,
    Json(request): Json<RiskRequest>,
) -> ApiResult<Json<RiskResponse>> {
    let location = Location::new(request.lat, request.lon);
    let inputs = &state.inputs;

    let live = request.use_live_conditions;
    let manual_mode = !request.use_community_observations;
    let sea_state = request.sea_state.as_deref().unwrap_or_default();
    let wind_speed = request.wind_speed.as_deref().unwrap_or_default();

    let errors = inputs.validate_all_inputs(&InputFields {
        location: Some(location),
        mangrove_width_m: Some(request.mangrove_width),
        salinity_ppm: request.salinity_ppm,
        sea_state: manual_mode.then_some(sea_state),
        wind_speed: manual_mode.then_some(wind_speed),
        tide_level_m: (!live).then_some(request.tide_level),
        rainfall_mm: (!live).then_some(request.rainfall_mm),
    });
    if !errors.is_empty() {
        return Err(ApiError::BadRequest(errors.join("; ")));
    }

    let manual = if manual_mode {
        Some(IndigenousInput::Manual {
            sea_state: inputs.validate_sea_state(sea_state)?,
            wind_speed: inputs.validate_wind_speed(wind_speed)?,
        })
    } else {
        None
    };

    let (indigenous, community) = match manual {
        Some(manual) => (manual, None),
        None => {
            let aggregate = state
                .aggregator
                .calculate_indigenous_score(location, request.hours_back.unwrap_or(DEFAULT_HOURS_BACK))
                .await?;
            let signal = CommunitySignal {
                total_indigenous_score: aggregate.total_indigenous_score,
                confidence: aggregate.confidence,
                num_observations: aggregate.num_observations,
            };
            (
                IndigenousInput::Observed {
                    total_indigenous_score: aggregate.total_indigenous_score,
                },
                Some(signal),
            )
        }
    };

    let conditions = if live {
        Some(state.conditions.current_conditions(location).await?)
    } else {
        None
    };
    let (tide_level, rainfall_mm) = match &conditions {
        Some(live) => (live.water_level_m, live.rainfall_mm),
        None => (request.tide_level, request.rainfall_mm),
    };

    let breakdown = assess_risk(
        &RiskInputs {
            mangrove_width: request.mangrove_width,
            indigenous,
            tide_level,
            rainfall_mm,
        },
        &state.thresholds,
    );

    info!(
        "Risk {:.2} ({}) at ({}, {})",
        breakdown.risk_score, breakdown.risk_level, location.lat, location.lon
    );

    Ok(Json(RiskResponse {
        location,
        risk_score: breakdown.risk_score,
        risk_level: breakdown.risk_level,
        breakdown,
        community,
        conditions,
    }))
}

/// Build risk routes
pub fn risk_routes() -> Router<AppState> {
    Router::new().route("/api/risk", post(assess))
}
