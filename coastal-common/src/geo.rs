//! Geographic primitives
//!
//! Search windows are expressed in degrees, not kilometres: a box of
//! ±0.09° is roughly 10 km and ±0.45° roughly 50 km near the equator.

use serde::{Deserialize, Serialize};

/// A point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and within [-90, 90] × [-180, 180]
    pub fn is_on_globe(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<(f64, f64)> for Location {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// Inclusive latitude/longitude window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Square window of `radius_degrees` on each side of `center`
    pub fn around(center: Location, radius_degrees: f64) -> Self {
        Self {
            lat_min: center.lat - radius_degrees,
            lat_max: center.lat + radius_degrees,
            lon_min: center.lon - radius_degrees,
            lon_max: center.lon + radius_degrees,
        }
    }

    pub fn contains(&self, location: Location) -> bool {
        (self.lat_min..=self.lat_max).contains(&location.lat)
            && (self.lon_min..=self.lon_max).contains(&location.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_around_is_symmetric() {
        let bbox = BoundingBox::around(Location::new(10.0, 76.0), 0.5);
        assert_eq!(bbox.lat_min, 9.5);
        assert_eq!(bbox.lat_max, 10.5);
        assert_eq!(bbox.lon_min, 75.5);
        assert_eq!(bbox.lon_max, 76.5);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let bbox = BoundingBox::around(Location::new(10.0, 76.0), 0.5);
        assert!(bbox.contains(Location::new(10.5, 75.5)));
        assert!(bbox.contains(Location::new(10.0, 76.0)));
        assert!(!bbox.contains(Location::new(10.51, 76.0)));
        assert!(!bbox.contains(Location::new(10.0, 75.49)));
    }

    #[test]
    fn test_is_on_globe() {
        assert!(Location::new(9.935, 76.267).is_on_globe());
        assert!(Location::new(-90.0, 180.0).is_on_globe());
        assert!(!Location::new(90.5, 0.0).is_on_globe());
        assert!(!Location::new(0.0, f64::NAN).is_on_globe());
    }

    #[test]
    fn test_from_tuple() {
        let location: Location = (10.0, 76.22).into();
        assert_eq!(location, Location::new(10.0, 76.22));
    }
}
