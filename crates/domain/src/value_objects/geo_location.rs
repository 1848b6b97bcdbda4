//! Geographic location value object

use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic coordinate pair (latitude, longitude) in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in degrees (-90 to 90)
    latitude: f64,
    /// Longitude in degrees (-180 to 180)
    longitude: f64,
}

/// Error type for invalid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCoordinates;

impl fmt::Display for InvalidCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180"
        )
    }
}

impl std::error::Error for InvalidCoordinates {}

impl GeoLocation {
    /// Create a new location with validation
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoordinates` if latitude is not in [-90, 90]
    /// or longitude is not in [-180, 180] (NaN is rejected as well)
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinates> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinates);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a location without validation (for compile-time constants)
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Get the latitude
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Get the longitude
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Position in GeoJSON axis order (`[longitude, latitude]`)
    #[must_use]
    pub const fn to_lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Calculate approximate distance to another location in kilometers
    ///
    /// Uses the Haversine formula for great-circle distance
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (lat1_rad.cos() * lat2_rad.cos()).mul_add(
            (delta_lon / 2.0).sin().powi(2),
            (delta_lat / 2.0).sin().powi(2),
        );
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Linear interpolation towards `other` in coordinate space
    ///
    /// `fraction` 0.0 yields `self`, 1.0 yields `other`.
    #[must_use]
    pub fn lerp(&self, other: &Self, fraction: f64) -> Self {
        Self {
            latitude: (other.latitude - self.latitude).mul_add(fraction, self.latitude),
            longitude: (other.longitude - self.longitude).mul_add(fraction, self.longitude),
        }
    }

    /// Shift by a small offset in degrees
    #[must_use]
    pub fn offset(&self, delta_latitude: f64, delta_longitude: f64) -> Self {
        Self {
            latitude: self.latitude + delta_latitude,
            longitude: self.longitude + delta_longitude,
        }
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Common locations for defaults
impl GeoLocation {
    /// Kochi (Ernakulam), Kerala
    #[must_use]
    pub const fn kochi() -> Self {
        Self::new_unchecked(9.9312, 76.2673)
    }

    /// Kozhikode, Kerala
    #[must_use]
    pub const fn kozhikode() -> Self {
        Self::new_unchecked(11.2588, 75.7804)
    }

    /// Thiruvananthapuram (Trivandrum), Kerala
    #[must_use]
    pub const fn trivandrum() -> Self {
        Self::new_unchecked(8.4855, 76.9492)
    }
}
