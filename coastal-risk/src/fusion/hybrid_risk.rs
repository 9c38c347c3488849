//! Hybrid coastal flood risk formula
//!
//! ```text
//! risk = satellite_base + indigenous + tide + rainfall - mangrove_protection
//! ```
//!
//! clamped to [0, 1] and rounded to 2 decimals. Every contributor is capped:
//!
//! | Contributor          | Formula                              | Range      |
//! |----------------------|--------------------------------------|------------|
//! | satellite base       | constant                             | 0.3        |
//! | indigenous (manual)  | sea state + wind speed               | 0.0 – 0.6  |
//! | indigenous (observed)| aggregator total                     | 0.0 – 1.0  |
//! | tide                 | min(tide_m / 3 × 0.2, 0.2)           | 0.0 – 0.2  |
//! | rainfall             | min(rain_mm / 500 × 0.15, 0.15)      | 0.0 – 0.15 |
//! | mangrove protection  | min(width_m / 100, 0.5)              | 0.0 – 0.5  |
//!
//! No I/O and no hidden state: identical inputs give identical outputs.

use coastal_common::config::RiskThresholds;
use coastal_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::risk_level::RiskLevel;
use crate::utils::round_to;

/// Baseline flood risk from satellite elevation/land-cover analysis
pub const SATELLITE_BASE_RISK: f64 = 0.3;

const TIDE_FULL_SCALE_M: f64 = 3.0;
const TIDE_MAX_CONTRIBUTION: f64 = 0.2;
const RAINFALL_FULL_SCALE_MM: f64 = 500.0;
const RAINFALL_MAX_CONTRIBUTION: f64 = 0.15;
const MANGROVE_FULL_PROTECTION_M: f64 = 100.0;
const MANGROVE_MAX_PROTECTION: f64 = 0.5;

/// Sea state reported by fishermen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeaState {
    Calm,
    Choppy,
    /// Equivalent to an anomalous swell
    Rough,
}

impl SeaState {
    pub const ALL: [SeaState; 3] = [SeaState::Calm, SeaState::Choppy, SeaState::Rough];

    pub fn risk_weight(&self) -> f64 {
        match self {
            SeaState::Calm => 0.0,
            SeaState::Choppy => 0.2,
            SeaState::Rough => 0.4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeaState::Calm => "Calm",
            SeaState::Choppy => "Choppy",
            SeaState::Rough => "Rough",
        }
    }
}

impl fmt::Display for SeaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeaState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Sea state '{}' invalid. Must be one of: Calm, Choppy, Rough",
                    s
                ))
            })
    }
}

/// Wind strength reported by fishermen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WindSpeed {
    Normal,
    High,
    /// Equivalent to cyclonic wind
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl WindSpeed {
    pub const ALL: [WindSpeed; 3] = [WindSpeed::Normal, WindSpeed::High, WindSpeed::VeryHigh];

    pub fn risk_weight(&self) -> f64 {
        match self {
            WindSpeed::Normal => 0.0,
            WindSpeed::High => 0.1,
            WindSpeed::VeryHigh => 0.2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindSpeed::Normal => "Normal",
            WindSpeed::High => "High",
            WindSpeed::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for WindSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindSpeed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|speed| speed.as_str() == s)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Wind speed '{}' invalid. Must be one of: Normal, High, Very High",
                    s
                ))
            })
    }
}

/// Source of the indigenous-knowledge contribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum IndigenousInput {
    /// Manual sea/wind selections (offline substitute for community data)
    Manual {
        sea_state: SeaState,
        wind_speed: WindSpeed,
    },
    /// Total score from the observation aggregator
    Observed { total_indigenous_score: f64 },
}

impl IndigenousInput {
    pub fn contribution(&self) -> f64 {
        match self {
            IndigenousInput::Manual {
                sea_state,
                wind_speed,
            } => sea_state.risk_weight() + wind_speed.risk_weight(),
            IndigenousInput::Observed {
                total_indigenous_score,
            } => *total_indigenous_score,
        }
    }
}

/// All inputs to the fusion formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskInputs {
    /// Mangrove bioshield width in metres
    pub mangrove_width: f64,
    pub indigenous: IndigenousInput,
    /// Tide level in metres
    pub tide_level: f64,
    /// Rainfall in millimetres
    pub rainfall_mm: f64,
}

/// Per-contributor view of a fused score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskBreakdown {
    pub satellite_base: f64,
    pub indigenous_contribution: f64,
    pub tide_contribution: f64,
    pub rainfall_contribution: f64,
    pub mangrove_protection: f64,
    /// Clamped to [0, 1], 2 decimals
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

pub fn tide_contribution(tide_level: f64) -> f64 {
    (tide_level / TIDE_FULL_SCALE_M * TIDE_MAX_CONTRIBUTION).min(TIDE_MAX_CONTRIBUTION)
}

pub fn rainfall_contribution(rainfall_mm: f64) -> f64 {
    (rainfall_mm / RAINFALL_FULL_SCALE_MM * RAINFALL_MAX_CONTRIBUTION)
        .min(RAINFALL_MAX_CONTRIBUTION)
}

pub fn mangrove_protection(mangrove_width: f64) -> f64 {
    (mangrove_width / MANGROVE_FULL_PROTECTION_M).min(MANGROVE_MAX_PROTECTION)
}

/// Fuse all contributors into one bounded score with its breakdown
pub fn assess_risk(inputs: &RiskInputs, thresholds: &RiskThresholds) -> RiskBreakdown {
    let indigenous = inputs.indigenous.contribution();
    let tide = tide_contribution(inputs.tide_level);
    let rainfall = rainfall_contribution(inputs.rainfall_mm);
    let protection = mangrove_protection(inputs.mangrove_width);

    let raw = SATELLITE_BASE_RISK + indigenous + tide + rainfall - protection;
    let risk_score = round_to(raw.clamp(0.0, 1.0), 2);

    RiskBreakdown {
        satellite_base: SATELLITE_BASE_RISK,
        indigenous_contribution: indigenous,
        tide_contribution: tide,
        rainfall_contribution: rainfall,
        mangrove_protection: protection,
        risk_score,
        risk_level: RiskLevel::classify(risk_score, thresholds),
    }
}

/// Hybrid risk score from the manual (dashboard) inputs
pub fn calculate_hybrid_risk(
    mangrove_width: f64,
    sea_state: SeaState,
    wind_speed: WindSpeed,
    tide_level: f64,
    rainfall_mm: f64,
) -> f64 {
    let inputs = RiskInputs {
        mangrove_width,
        indigenous: IndigenousInput::Manual {
            sea_state,
            wind_speed,
        },
        tide_level,
        rainfall_mm,
    };
    assess_risk(&inputs, &RiskThresholds::default()).risk_score
}

/// Hybrid risk score using the observation aggregator's total
pub fn calculate_hybrid_risk_observed(
    mangrove_width: f64,
    total_indigenous_score: f64,
    tide_level: f64,
    rainfall_mm: f64,
) -> f64 {
    let inputs = RiskInputs {
        mangrove_width,
        indigenous: IndigenousInput::Observed {
            total_indigenous_score,
        },
        tide_level,
        rainfall_mm,
    };
    assess_risk(&inputs, &RiskThresholds::default()).risk_score
}
