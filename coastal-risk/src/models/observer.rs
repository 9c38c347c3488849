//! Community observer records

use chrono::{DateTime, Utc};
use coastal_common::{Error, Location, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Accuracy assigned to newly registered observers
pub const DEFAULT_ACCURACY_SCORE: f64 = 0.5;

/// Community role of an observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObserverRole {
    Fisherman,
    Farmer,
    Collector,
    Elder,
    Other,
}

impl ObserverRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObserverRole::Fisherman => "fisherman",
            ObserverRole::Farmer => "farmer",
            ObserverRole::Collector => "collector",
            ObserverRole::Elder => "elder",
            ObserverRole::Other => "other",
        }
    }
}

impl fmt::Display for ObserverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObserverRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fisherman" => Ok(ObserverRole::Fisherman),
            "farmer" => Ok(ObserverRole::Farmer),
            "collector" => Ok(ObserverRole::Collector),
            "elder" => Ok(ObserverRole::Elder),
            "other" => Ok(ObserverRole::Other),
            _ => Err(Error::Validation(format!(
                "Unknown observer role '{}'. Must be one of: fisherman, farmer, collector, elder, other",
                s
            ))),
        }
    }
}

/// Registered community member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub observer_id: String,
    pub name: String,
    pub role: ObserverRole,
    pub location: Location,
    pub total_observations: i64,
    /// Historical accuracy in [0, 1]; not adjusted by validation outcomes
    pub accuracy_score: f64,
    pub verified: bool,
    pub registered_at: DateTime<Utc>,
}
