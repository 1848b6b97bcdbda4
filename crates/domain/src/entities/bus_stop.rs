//! Bus stop entity - A nearby stop returned by a stop lookup

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value_objects::GeoLocation;

/// Name used when the upstream data carries no stop name
pub const UNNAMED_STOP: &str = "Bus Stop";

/// A bus stop near a queried location
///
/// Stops only live for the duration of one lookup; the `id` is whatever the
/// upstream source uses and is not stable across lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusStop {
    /// Upstream identifier
    pub id: String,
    /// Human-readable stop name
    pub name: String,
    /// Stop position
    pub location: GeoLocation,
    /// Route names serving this stop, if known
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<String>,
}

impl BusStop {
    /// Create a new stop without route information
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: GeoLocation) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            routes: Vec::new(),
        }
    }

    /// Attach route names
    #[must_use]
    pub fn with_routes(mut self, routes: Vec<String>) -> Self {
        self.routes = routes;
        self
    }

    /// Distance from a reference point in kilometers
    #[must_use]
    pub fn distance_km_from(&self, from: &GeoLocation) -> f64 {
        self.location.distance_km(from)
    }

    /// Route information line as shown in stop listings
    #[must_use]
    pub fn routes_label(&self) -> String {
        if self.routes.is_empty() {
            String::from("No route information available")
        } else {
            format!("Routes: {}", self.routes.join(", "))
        }
    }
}

impl fmt::Display for BusStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
