//! Boundary checks for user-supplied risk and observation inputs
//!
//! Each check returns [`Error::Validation`] with a message naming the value
//! and the accepted range. [`InputValidator::validate_all_inputs`] runs every
//! check and collects all messages instead of stopping at the first.

use coastal_common::config::RegionBounds;
use coastal_common::{Error, Location, Result};
use tracing::warn;

use crate::fusion::{SeaState, WindSpeed};

pub const MANGROVE_WIDTH_MAX_M: f64 = 300.0;
pub const SALINITY_MAX_PPM: f64 = 40_000.0;

/// Validates inputs against the configured region and physical ranges
#[derive(Debug, Clone, Copy, Default)]
pub struct InputValidator {
    region: RegionBounds,
}

impl InputValidator {
    pub fn new(region: RegionBounds) -> Self {
        Self { region }
    }

    pub fn region(&self) -> &RegionBounds {
        &self.region
    }

    pub fn validate_lat(&self, lat: f64) -> Result<()> {
        if lat.is_finite() && self.region.lat_min <= lat && lat <= self.region.lat_max {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "Latitude {} outside region bounds ({}-{})",
                lat, self.region.lat_min, self.region.lat_max
            )))
        }
    }

    pub fn validate_lon(&self, lon: f64) -> Result<()> {
        if lon.is_finite() && self.region.lon_min <= lon && lon <= self.region.lon_max {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "Longitude {} outside region bounds ({}-{})",
                lon, self.region.lon_min, self.region.lon_max
            )))
        }
    }

    pub fn validate_coordinates(&self, location: Location) -> Result<()> {
        self.validate_lat(location.lat)
            .and_then(|_| self.validate_lon(location.lon))
            .inspect_err(|e| warn!("Invalid coordinates: {}", e))
    }

    pub fn validate_mangrove_width(&self, width_m: f64) -> Result<()> {
        if (0.0..=MANGROVE_WIDTH_MAX_M).contains(&width_m) {
            Ok(())
        } else {
            let e = Error::Validation(format!(
                "Mangrove width {}m seems unrealistic (0-{}m expected)",
                width_m, MANGROVE_WIDTH_MAX_M
            ));
            warn!("{}", e);
            Err(e)
        }
    }

    pub fn validate_salinity(&self, salinity_ppm: f64) -> Result<()> {
        if (0.0..=SALINITY_MAX_PPM).contains(&salinity_ppm) {
            Ok(())
        } else {
            let e = Error::Validation(format!(
                "Salinity {}ppm outside realistic range (0-{})",
                salinity_ppm, SALINITY_MAX_PPM
            ));
            warn!("{}", e);
            Err(e)
        }
    }

    /// Tide level in metres above datum; must be finite and non-negative
    pub fn validate_tide_level(&self, tide_m: f64) -> Result<()> {
        non_negative("Tide level", tide_m, "m")
    }

    pub fn validate_rainfall(&self, rainfall_mm: f64) -> Result<()> {
        non_negative("Rainfall", rainfall_mm, "mm")
    }

    pub fn validate_sea_state(&self, state: &str) -> Result<SeaState> {
        state
            .parse::<SeaState>()
            .inspect_err(|e| warn!("{}", e))
    }

    pub fn validate_wind_speed(&self, speed: &str) -> Result<WindSpeed> {
        speed
            .parse::<WindSpeed>()
            .inspect_err(|e| warn!("{}", e))
    }

    /// Run the check for every supplied field and return all failures,
    /// each prefixed by its field label
    ///
    /// Fields left as `None` are skipped. An empty list means every supplied
    /// input is acceptable.
    pub fn validate_all_inputs(&self, fields: &InputFields<'_>) -> Vec<String> {
        let mut errors = Vec::new();
        let mut record = |label: &str, result: Result<()>| {
            if let Err(e) = result {
                errors.push(format!("{}: {}", label, failure_message(&e)));
            }
        };

        if let Some(location) = fields.location {
            record("Location", self.validate_coordinates(location));
        }
        if let Some(width) = fields.mangrove_width_m {
            record("Mangrove Width", self.validate_mangrove_width(width));
        }
        if let Some(salinity) = fields.salinity_ppm {
            record("Salinity", self.validate_salinity(salinity));
        }
        if let Some(state) = fields.sea_state {
            record("Sea State", self.validate_sea_state(state).map(|_| ()));
        }
        if let Some(speed) = fields.wind_speed {
            record("Wind Speed", self.validate_wind_speed(speed).map(|_| ()));
        }
        if let Some(tide) = fields.tide_level_m {
            record("Tide Level", self.validate_tide_level(tide));
        }
        if let Some(rainfall) = fields.rainfall_mm {
            record("Rainfall", self.validate_rainfall(rainfall));
        }

        errors
    }
}

/// Raw user inputs for [`InputValidator::validate_all_inputs`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFields<'a> {
    pub location: Option<Location>,
    pub mangrove_width_m: Option<f64>,
    pub salinity_ppm: Option<f64>,
    pub sea_state: Option<&'a str>,
    pub wind_speed: Option<&'a str>,
    pub tide_level_m: Option<f64>,
    pub rainfall_mm: Option<f64>,
}

fn non_negative(field: &str, value: f64, unit: &str) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        let e = Error::Validation(format!("{} {}{} must be a non-negative number", field, value, unit));
        warn!("{}", e);
        Err(e)
    }
}

/// Message text of a failed check without the error-kind prefix
fn failure_message(error: &Error) -> String {
    match error {
        Error::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kochi() -> Location {
        Location::new(9.935, 76.267)
    }

    #[test]
    fn test_region_bounds_inclusive() {
        let v = InputValidator::default();
        assert!(v.validate_lat(8.0).is_ok());
        assert!(v.validate_lat(12.5).is_ok());
        assert!(v.validate_lat(7.99).is_err());
        assert!(v.validate_lon(74.0).is_ok());
        assert!(v.validate_lon(78.01).is_err());
        assert!(v.validate_lat(f64::NAN).is_err());
    }

    #[test]
    fn test_coordinates_outside_region() {
        let v = InputValidator::default();
        assert!(v.validate_coordinates(kochi()).is_ok());
        let err = v.validate_coordinates(Location::new(28.6, 77.2)).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Latitude 28.6"));
    }

    #[test]
    fn test_custom_region() {
        let v = InputValidator::new(RegionBounds {
            lat_min: 0.0,
            lat_max: 1.0,
            lon_min: 0.0,
            lon_max: 1.0,
        });
        assert!(v.validate_coordinates(kochi()).is_err());
        assert!(v.validate_coordinates(Location::new(0.5, 0.5)).is_ok());
    }

    #[test]
    fn test_physical_ranges() {
        let v = InputValidator::default();
        assert!(v.validate_mangrove_width(0.0).is_ok());
        assert!(v.validate_mangrove_width(300.0).is_ok());
        assert!(v.validate_mangrove_width(-1.0).is_err());
        assert!(v.validate_mangrove_width(301.0).is_err());
        assert!(v.validate_salinity(35_000.0).is_ok());
        assert!(v.validate_salinity(40_001.0).is_err());
        assert!(v.validate_salinity(f64::NAN).is_err());
        assert!(v.validate_tide_level(2.5).is_ok());
        assert!(v.validate_tide_level(-0.1).is_err());
        assert!(v.validate_rainfall(0.0).is_ok());
        assert!(v.validate_rainfall(f64::INFINITY).is_err());
    }

    #[test]
    fn test_categorical_inputs() {
        let v = InputValidator::default();
        assert_eq!(v.validate_sea_state("Choppy").unwrap(), SeaState::Choppy);
        assert!(v.validate_sea_state("choppy").is_err());
        assert_eq!(v.validate_wind_speed("Very High").unwrap(), WindSpeed::VeryHigh);
        assert!(v.validate_wind_speed("Gale").is_err());
    }

    #[test]
    fn test_validate_all_collects_every_failure() {
        let v = InputValidator::default();
        let valid = InputFields {
            location: Some(kochi()),
            mangrove_width_m: Some(50.0),
            salinity_ppm: Some(30_000.0),
            sea_state: Some("Calm"),
            wind_speed: Some("High"),
            tide_level_m: Some(1.5),
            rainfall_mm: Some(100.0),
        };
        assert!(v.validate_all_inputs(&valid).is_empty());

        let errors = v.validate_all_inputs(&InputFields {
            location: Some(Location::new(0.0, 0.0)),
            mangrove_width_m: Some(500.0),
            salinity_ppm: Some(-5.0),
            sea_state: Some("Stormy"),
            wind_speed: Some("Gale"),
            tide_level_m: Some(-1.0),
            rainfall_mm: Some(f64::NAN),
        });
        let labels: Vec<&str> = errors
            .iter()
            .filter_map(|e| e.split(": ").next())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Location",
                "Mangrove Width",
                "Salinity",
                "Sea State",
                "Wind Speed",
                "Tide Level",
                "Rainfall"
            ]
        );
    }

    #[test]
    fn test_validate_all_skips_absent_fields() {
        let v = InputValidator::default();
        assert!(v.validate_all_inputs(&InputFields::default()).is_empty());

        let errors = v.validate_all_inputs(&InputFields {
            location: Some(kochi()),
            sea_state: Some(""),
            ..InputFields::default()
        });
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Sea State: Sea state '' invalid"));
    }
}
