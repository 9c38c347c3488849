//! Observation and validation-history records

use chrono::{DateTime, Utc};
use coastal_common::{Error, Location, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::category::{ObservationCategory, Severity};

/// Observer name recorded when the submitting id is not registered
pub const ANONYMOUS_OBSERVER_NAME: &str = "Anonymous";

/// Validation lifecycle of an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationState {
    #[default]
    Unvalidated,
    Valid,
    Invalid,
}

impl ValidationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationState::Unvalidated => "unvalidated",
            ValidationState::Valid => "valid",
            ValidationState::Invalid => "invalid",
        }
    }

    pub fn from_decision(is_valid: bool) -> Self {
        if is_valid {
            ValidationState::Valid
        } else {
            ValidationState::Invalid
        }
    }
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unvalidated" => Ok(ValidationState::Unvalidated),
            "valid" => Ok(ValidationState::Valid),
            "invalid" => Ok(ValidationState::Invalid),
            _ => Err(Error::Validation(format!("Unknown validation state '{}'", s))),
        }
    }
}

/// Stored community observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: i64,
    pub observer_id: String,
    /// Observer name at submission time
    pub observer_name: String,
    pub location: Location,
    pub category: ObservationCategory,
    pub description: String,
    /// Observer-asserted confidence in [0, 1]
    pub confidence: f64,
    pub severity: Severity,
    pub submitted_at: DateTime<Utc>,
    pub validation_state: ValidationState,
    pub validator_id: Option<String>,
    pub validated_at: Option<DateTime<Utc>>,
    /// Last computed reliability; only meaningful once validated
    pub reliability_score: f64,
}

impl Observation {
    pub fn is_valid(&self) -> bool {
        self.validation_state == ValidationState::Valid
    }
}

/// Fields supplied when inserting an observation
#[derive(Debug, Clone, PartialEq)]
pub struct NewObservation {
    pub observer_id: String,
    pub observer_name: String,
    pub location: Location,
    pub category: ObservationCategory,
    pub description: String,
    pub confidence: f64,
    pub severity: Severity,
    pub submitted_at: DateTime<Utc>,
}

/// Outcome recorded in the validation history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationResult {
    Valid,
    Invalid,
}

impl ValidationResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationResult::Valid => "VALID",
            ValidationResult::Invalid => "INVALID",
        }
    }
}

impl FromStr for ValidationResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "VALID" => Ok(ValidationResult::Valid),
            "INVALID" => Ok(ValidationResult::Invalid),
            _ => Err(Error::Validation(format!("Unknown validation result '{}'", s))),
        }
    }
}

/// Append-only audit entry for one validation decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub validation_id: i64,
    pub observation_id: i64,
    pub validator_id: String,
    pub result: ValidationResult,
    pub reliability_adjustment: f64,
    pub notes: String,
    pub validated_at: DateTime<Utc>,
}
