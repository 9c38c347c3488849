//! Real-time tide and rainfall conditions
//!
//! Live feeds (tide gauges, rainfall forecasts) are external collaborators.
//! The risk engine only sees the fixed [`CurrentConditions`] shape through
//! the [`ConditionsSource`] trait. Sources that can fail are wrapped in
//! [`FallbackConditions`], which degrades to a synthetic reading.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coastal_common::config::ConditionsConfig;
use coastal_common::{Error, Location, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Snapshot of environmental readings at a location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    /// Water level above datum in metres
    pub water_level_m: f64,
    /// Rainfall expected today in millimetres
    pub rainfall_mm: f64,
    pub observed_at: DateTime<Utc>,
    /// Provider name for provenance
    pub source: String,
}

/// Provider of current tide/rainfall readings
#[async_trait]
pub trait ConditionsSource: Send + Sync {
    /// Source name for provenance tracking
    fn name(&self) -> &'static str;

    async fn current_conditions(&self, location: Location) -> Result<CurrentConditions>;
}

/// Constant readings (offline operation, tests, manual slider values)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedConditions {
    pub water_level_m: f64,
    pub rainfall_mm: f64,
}

impl FixedConditions {
    pub fn new(water_level_m: f64, rainfall_mm: f64) -> Self {
        Self {
            water_level_m,
            rainfall_mm,
        }
    }

    /// Typical monsoon-season mid-tide reading used when live data is down
    pub fn synthetic() -> Self {
        Self::new(1.5, 100.0)
    }
}

#[async_trait]
impl ConditionsSource for FixedConditions {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn current_conditions(&self, _location: Location) -> Result<CurrentConditions> {
        Ok(CurrentConditions {
            water_level_m: self.water_level_m,
            rainfall_mm: self.rainfall_mm,
            observed_at: Utc::now(),
            source: self.name().to_string(),
        })
    }
}

/// Latest readings written to a JSON file by an external feed
///
/// The file holds `{"water_level_m": .., "rainfall_mm": .., "observed_at": ..}`
/// with `observed_at` optional (RFC 3339). It is re-read on every request.
#[derive(Debug, Clone)]
pub struct FileConditions {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Readings {
    water_level_m: f64,
    rainfall_mm: f64,
    observed_at: Option<DateTime<Utc>>,
}

impl FileConditions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConditionsSource for FileConditions {
    fn name(&self) -> &'static str {
        "readings-file"
    }

    async fn current_conditions(&self, _location: Location) -> Result<CurrentConditions> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let readings: Readings = serde_json::from_str(&content).map_err(|e| {
            Error::Internal(format!("Malformed readings file {}: {}", self.path.display(), e))
        })?;

        let plausible = |v: f64| v.is_finite() && v >= 0.0;
        if !plausible(readings.water_level_m) || !plausible(readings.rainfall_mm) {
            return Err(Error::Internal(format!(
                "Readings file {} has negative or non-finite values",
                self.path.display()
            )));
        }

        Ok(CurrentConditions {
            water_level_m: readings.water_level_m,
            rainfall_mm: readings.rainfall_mm,
            observed_at: readings.observed_at.unwrap_or_else(Utc::now),
            source: self.name().to_string(),
        })
    }
}

/// Primary source with a synthetic fallback on failure
pub struct FallbackConditions<S> {
    primary: S,
    fallback: FixedConditions,
}

impl<S: ConditionsSource> FallbackConditions<S> {
    pub fn new(primary: S) -> Self {
        Self {
            primary,
            fallback: FixedConditions::synthetic(),
        }
    }

    pub fn with_fallback(mut self, fallback: FixedConditions) -> Self {
        self.fallback = fallback;
        self
    }
}

#[async_trait]
impl<S: ConditionsSource> ConditionsSource for FallbackConditions<S> {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn current_conditions(&self, location: Location) -> Result<CurrentConditions> {
        match self.primary.current_conditions(location).await {
            Ok(conditions) => Ok(conditions),
            Err(e) => {
                warn!(
                    "Conditions source '{}' failed ({}), using synthetic readings",
                    self.primary.name(),
                    e
                );
                let mut conditions = self.fallback.current_conditions(location).await?;
                conditions.source = "synthetic".to_string();
                Ok(conditions)
            }
        }
    }
}

/// Build the conditions source described by configuration
///
/// A configured readings file is wrapped in [`FallbackConditions`] using the
/// configured fallback values; otherwise those values are served as fixed
/// readings.
pub fn conditions_source(config: &ConditionsConfig) -> Arc<dyn ConditionsSource> {
    let fixed = FixedConditions::new(config.fallback_water_level_m, config.fallback_rainfall_mm);
    match &config.readings_file {
        Some(path) => {
            info!("Reading live conditions from {}", path.display());
            Arc::new(FallbackConditions::new(FileConditions::new(path.clone())).with_fallback(fixed))
        }
        None => {
            warn!(
                "No readings file configured, serving fixed conditions ({} m, {} mm)",
                fixed.water_level_m, fixed.rainfall_mm
            );
            Arc::new(fixed)
        }
    }
}
