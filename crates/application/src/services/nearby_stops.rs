//! Nearby bus stop lookup
//!
//! Wraps a [`StopFinderPort`] with the fixed search policy: a 2 km radius
//! and at most 30 stops. Failures never escape; they become an empty list
//! plus an advisory message.

use std::sync::Arc;

use domain::{BusStop, value_objects::GeoLocation};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::ports::StopFinderPort;

/// Search radius around the queried point
pub const STOP_SEARCH_RADIUS_METERS: u32 = 2000;

/// Maximum number of stops kept from one lookup
pub const MAX_NEARBY_STOPS: usize = 30;

/// Message shown when the stop lookup fails
pub const STOP_FETCH_FAILED: &str = "Could not load nearby bus stops.";

/// Result of one stop lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StopFetchOutcome {
    /// Stops in upstream order, at most [`MAX_NEARBY_STOPS`]
    pub stops: Vec<BusStop>,
    /// Advisory text when the lookup failed
    pub error: Option<String>,
    /// True when the result hit the cap and more stops may exist
    pub capped: bool,
}

impl StopFetchOutcome {
    /// Whether the lookup failed
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Service fetching bus stops near a point
pub struct NearbyStopService {
    finder: Arc<dyn StopFinderPort>,
}

impl std::fmt::Debug for NearbyStopService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearbyStopService")
            .field("finder", &"<StopFinderPort>")
            .finish()
    }
}

impl NearbyStopService {
    /// Create a new service over a stop finder
    #[must_use]
    pub fn new(finder: Arc<dyn StopFinderPort>) -> Self {
        Self { finder }
    }

    /// Fetch stops around `location`
    ///
    /// Issues exactly one lookup. There is no retry and no caching.
    #[instrument(skip(self), fields(location = %location))]
    pub async fn fetch(&self, location: &GeoLocation) -> StopFetchOutcome {
        #[allow(clippy::cast_possible_truncation)]
        let limit = MAX_NEARBY_STOPS as u32;

        match self
            .finder
            .find_stops_near(location, STOP_SEARCH_RADIUS_METERS, limit)
            .await
        {
            Ok(mut stops) => {
                let capped = stops.len() >= MAX_NEARBY_STOPS;
                if stops.len() > MAX_NEARBY_STOPS {
                    debug!(
                        received = stops.len(),
                        "Truncating stop list to cap"
                    );
                    stops.truncate(MAX_NEARBY_STOPS);
                }
                debug!(count = stops.len(), capped, "Nearby stops fetched");
                StopFetchOutcome {
                    stops,
                    error: None,
                    capped,
                }
            },
            Err(e) => {
                warn!(error = %e, retryable = e.is_retryable(), "Nearby stop lookup failed");
                StopFetchOutcome {
                    stops: Vec::new(),
                    error: Some(STOP_FETCH_FAILED.to_string()),
                    capped: false,
                }
            },
        }
    }

    /// Check if the stop service is reachable
    pub async fn is_available(&self) -> bool {
        self.finder.is_available().await
    }
}
