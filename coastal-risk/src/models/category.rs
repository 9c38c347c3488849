//! Observation categories and severities
//!
//! Both are closed sets so a misspelled category can never silently fall
//! outside aggregation.

use coastal_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of environmental sign a community member reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationCategory {
    AnomalousWaves,
    WindPatternShift,
    TidalAnomaly,
    WildlifeBehavior,
    CoastalErosion,
    MangroveStress,
}

impl ObservationCategory {
    pub const ALL: [ObservationCategory; 6] = [
        ObservationCategory::AnomalousWaves,
        ObservationCategory::WindPatternShift,
        ObservationCategory::TidalAnomaly,
        ObservationCategory::WildlifeBehavior,
        ObservationCategory::CoastalErosion,
        ObservationCategory::MangroveStress,
    ];

    /// Stored/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationCategory::AnomalousWaves => "anomalous_waves",
            ObservationCategory::WindPatternShift => "wind_pattern_shift",
            ObservationCategory::TidalAnomaly => "tidal_anomaly",
            ObservationCategory::WildlifeBehavior => "wildlife_behavior",
            ObservationCategory::CoastalErosion => "coastal_erosion",
            ObservationCategory::MangroveStress => "mangrove_stress",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ObservationCategory::AnomalousWaves => "Unusual wave patterns or heights",
            ObservationCategory::WindPatternShift => {
                "Sudden or abnormal wind direction/speed changes"
            }
            ObservationCategory::TidalAnomaly => "Unusual tidal behavior or timing deviations",
            ObservationCategory::WildlifeBehavior => "Unusual bird, fish, or animal behavior",
            ObservationCategory::CoastalErosion => "Rapid erosion or land loss",
            ObservationCategory::MangroveStress => {
                "Health issues or changes in mangrove ecosystem"
            }
        }
    }

    /// Typical phrases observers use when reporting this category
    pub fn indicators(&self) -> &'static [&'static str] {
        match self {
            ObservationCategory::AnomalousWaves => &[
                "unusually high waves",
                "rapid wave changes",
                "strange wave direction",
            ],
            ObservationCategory::WindPatternShift => {
                &["wind direction change", "sudden gust", "persistent wind"]
            }
            ObservationCategory::TidalAnomaly => &[
                "early/late tide",
                "higher than usual",
                "tide didnt recede",
            ],
            ObservationCategory::WildlifeBehavior => &[
                "birds fleeing",
                "fish moving inland",
                "marine animals missing",
            ],
            ObservationCategory::CoastalErosion => {
                &["sand loss", "beach erosion", "land subsiding"]
            }
            ObservationCategory::MangroveStress => &[
                "tree loss",
                "disease",
                "salt intrusion",
                "reduced density",
            ],
        }
    }
}

impl fmt::Display for ObservationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObservationCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Unknown observation category '{}'. Must be one of: {}",
                    s,
                    Self::ALL.map(|c| c.as_str()).join(", ")
                ))
            })
    }
}

/// Observer-assessed severity of an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    #[default]
    Moderate,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Moderate,
        Severity::High,
        Severity::Critical,
    ];

    /// Fixed numeric proxy used by reliability scoring and aggregation
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Low => 0.2,
            Severity::Moderate => 0.5,
            Severity::High => 0.75,
            Severity::Critical => 0.95,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Moderate => "MODERATE",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sev| sev.as_str() == s)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Unknown severity '{}'. Must be one of: LOW, MODERATE, HIGH, CRITICAL",
                    s
                ))
            })
    }
}
