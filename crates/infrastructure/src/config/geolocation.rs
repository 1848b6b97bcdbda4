//! Geolocation configuration

use std::time::Duration;

use application::ports::WatchOptions;
use domain::GeoLocation;
use serde::{Deserialize, Serialize};

use super::default_true;

/// Geographic location configuration (latitude/longitude pair)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocationConfig {
    /// Latitude (-90.0 to 90.0)
    pub latitude: f64,
    /// Longitude (-180.0 to 180.0)
    pub longitude: f64,
}

impl GeoLocationConfig {
    /// Convert to domain `GeoLocation` value object
    ///
    /// Returns `None` if coordinates are invalid.
    #[must_use]
    pub fn to_geo_location(&self) -> Option<GeoLocation> {
        GeoLocation::new(self.latitude, self.longitude).ok()
    }
}

impl From<GeoLocation> for GeoLocationConfig {
    fn from(location: GeoLocation) -> Self {
        Self {
            latitude: location.latitude(),
            longitude: location.longitude(),
        }
    }
}

/// Location source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeolocationAppConfig {
    /// Coordinate used while no fix is available
    ///
    /// Configured as inline table: `{ latitude = 9.9312, longitude = 76.2673 }`
    #[serde(default = "default_fallback")]
    pub fallback: GeoLocationConfig,

    /// Position reported by the fixed location source
    ///
    /// When absent the source reports that geolocation is unsupported and
    /// the fallback is used.
    #[serde(default)]
    pub position: Option<GeoLocationConfig>,

    /// Prefer a high-accuracy fix
    #[serde(default = "default_true")]
    pub high_accuracy: bool,

    /// Time to wait for the first fix in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum age of a cached position in milliseconds
    #[serde(default)]
    pub maximum_age_ms: u64,
}

fn default_fallback() -> GeoLocationConfig {
    GeoLocation::kochi().into()
}

const fn default_timeout_ms() -> u64 {
    5000
}

impl Default for GeolocationAppConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback(),
            position: None,
            high_accuracy: default_true(),
            timeout_ms: default_timeout_ms(),
            maximum_age_ms: 0,
        }
    }
}

impl GeolocationAppConfig {
    /// Options passed to the location source
    #[must_use]
    pub const fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            high_accuracy: self.high_accuracy,
            timeout: Duration::from_millis(self.timeout_ms),
            maximum_age: Duration::from_millis(self.maximum_age_ms),
        }
    }

    /// The fallback coordinate as a domain value
    ///
    /// # Errors
    ///
    /// Returns an error if the configured coordinate is out of range.
    pub fn fallback_location(&self) -> Result<GeoLocation, String> {
        self.fallback.to_geo_location().ok_or_else(|| {
            format!(
                "geolocation.fallback is not a valid coordinate: {}, {}",
                self.fallback.latitude, self.fallback.longitude
            )
        })
    }

    /// The configured fixed position, if any
    ///
    /// # Errors
    ///
    /// Returns an error if a position is set but out of range.
    pub fn fixed_position(&self) -> Result<Option<GeoLocation>, String> {
        self.position
            .map(|p| {
                p.to_geo_location().ok_or_else(|| {
                    format!(
                        "geolocation.position is not a valid coordinate: {}, {}",
                        p.latitude, p.longitude
                    )
                })
            })
            .transpose()
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a coordinate is invalid or the timeout is zero.
    pub fn validate(&self) -> Result<(), String> {
        self.fallback_location()?;
        self.fixed_position()?;
        if self.timeout_ms == 0 {
            return Err("geolocation.timeout_ms must be greater than zero".to_string());
        }
        Ok(())
    }
}
