//! Bus route entity - One static schedule entry

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{GeoLocation, RouteId};

/// Display format for departure times, e.g. `8:30 AM`
const DEPARTURE_FORMAT: &str = "%-I:%M %p";

/// A scheduled bus route
///
/// Records are defined once when the directory is built and only handed out
/// by shared reference afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusRoute {
    /// Route identifier
    pub id: RouteId,
    /// Service name (e.g., "KSRTC 123")
    pub name: String,
    /// Departure location name
    pub origin: String,
    /// Destination location name
    pub destination: String,
    /// Scheduled local departure time
    pub departure: NaiveTime,
    /// Depot the bus starts from; used as the route endpoint on the map
    pub depot: GeoLocation,
}

impl BusRoute {
    /// Create a new route record
    #[must_use]
    pub fn new(
        id: impl Into<RouteId>,
        name: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure: NaiveTime,
        depot: GeoLocation,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            origin: origin.into(),
            destination: destination.into(),
            departure,
            depot,
        }
    }

    /// Parse a departure time as written on schedules (`8:30 AM`, `11:30 PM`)
    pub fn parse_departure(value: &str) -> Result<NaiveTime, DomainError> {
        NaiveTime::parse_from_str(value.trim(), "%I:%M %p")
            .map_err(|_| DomainError::InvalidDepartureTime(value.to_string()))
    }

    /// Departure time formatted for display
    #[must_use]
    pub fn departure_label(&self) -> String {
        self.departure.format(DEPARTURE_FORMAT).to_string()
    }

    /// Popup label for the depot marker
    #[must_use]
    pub fn depot_label(&self) -> String {
        format!("{} Depot", self.name)
    }

    /// Compact one-line summary for listings
    #[must_use]
    pub fn format_summary(&self) -> String {
        format!(
            "🚌 {} · {} to {} · departs {}",
            self.name,
            self.origin,
            self.destination,
            self.departure_label()
        )
    }
}

impl fmt::Display for BusRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_summary())
    }
}
