//! Hybrid risk fusion
//!
//! Combines the satellite baseline, the indigenous-knowledge signal, live
//! tide/rainfall readings and mangrove protection into one bounded score.

pub mod hybrid_risk;
pub mod risk_level;

pub use hybrid_risk::{
    assess_risk, calculate_hybrid_risk, calculate_hybrid_risk_observed, IndigenousInput,
    RiskBreakdown, RiskInputs, SeaState, WindSpeed, SATELLITE_BASE_RISK,
};
pub use risk_level::RiskLevel;
