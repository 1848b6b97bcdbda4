//! Search and selection state
//!
//! Holds what the user has picked (origin, destination, bus), the stops
//! loaded for the selection, and the advisories currently shown.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use domain::{BusDirectory, BusRoute, BusStop, DomainError, MatchMode, RouteId};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::services::geolocation::LocationState;
use crate::services::nearby_stops::{MAX_NEARBY_STOPS, StopFetchOutcome};

/// Shown when a stop lookup hit the cap
pub const TOO_MANY_STOPS: &str =
    "Zoom in to see more stops. Showing maximum of 30 stops in this area.";

/// Category of an advisory; at most one advisory per kind is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    /// Location fell back to the default coordinate
    Location,
    /// Nearby stops could not be loaded
    StopFetch,
    /// Stop list was truncated
    TooManyStops,
    /// Map failed; requires a refresh
    Map,
}

/// A dismissable message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    /// Advisory category
    pub kind: AdvisoryKind,
    /// Text to show
    pub message: String,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Identifies one stop lookup so stale results can be discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopFetchTicket {
    generation: u64,
    route_id: RouteId,
}

impl StopFetchTicket {
    /// The route whose stops are being fetched
    #[must_use]
    pub const fn route_id(&self) -> RouteId {
        self.route_id
    }
}

/// Search and selection view model
#[derive(Debug, Clone)]
pub struct NavigatorSession {
    directory: Arc<BusDirectory>,
    match_mode: MatchMode,
    origin: Option<String>,
    destination: Option<String>,
    results: Vec<RouteId>,
    selected: Option<RouteId>,
    stops: Vec<BusStop>,
    advisories: BTreeMap<AdvisoryKind, String>,
    generation: u64,
}

impl NavigatorSession {
    /// Create an empty session over a directory
    #[must_use]
    pub const fn new(directory: Arc<BusDirectory>, match_mode: MatchMode) -> Self {
        Self {
            directory,
            match_mode,
            origin: None,
            destination: None,
            results: Vec::new(),
            selected: None,
            stops: Vec::new(),
            advisories: BTreeMap::new(),
            generation: 0,
        }
    }

    /// The route directory
    #[must_use]
    pub fn directory(&self) -> &BusDirectory {
        &self.directory
    }

    /// Match mode used for searches
    #[must_use]
    pub const fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    /// Names offered in the origin and destination pickers
    #[must_use]
    pub fn locations(&self) -> Vec<&str> {
        self.directory.locations()
    }

    /// Choose the departure location
    pub fn set_origin(&mut self, origin: impl Into<String>) {
        self.origin = Some(origin.into());
    }

    /// Choose the destination location
    pub fn set_destination(&mut self, destination: impl Into<String>) {
        self.destination = Some(destination.into());
    }

    /// Chosen departure location
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Chosen destination location
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Whether both ends are chosen and differ
    #[must_use]
    pub fn can_search(&self) -> bool {
        match (self.origin.as_deref(), self.destination.as_deref()) {
            (Some(origin), Some(destination)) => {
                !origin.trim().is_empty()
                    && !destination.trim().is_empty()
                    && origin.trim() != destination.trim()
            },
            _ => false,
        }
    }

    /// Run the search and replace the result list
    ///
    /// Clears the current selection and its stops.
    ///
    /// # Errors
    ///
    /// Returns a validation error if [`Self::can_search`] is false.
    #[instrument(skip(self), fields(origin = ?self.origin, destination = ?self.destination))]
    pub fn search(&mut self) -> Result<Vec<&BusRoute>, DomainError> {
        if !self.can_search() {
            return Err(DomainError::ValidationError(
                "Choose a departure and a different destination".to_string(),
            ));
        }

        self.clear_selection();

        let origin = self.origin.as_deref().unwrap_or_default();
        let destination = self.destination.as_deref().unwrap_or_default();
        self.results = self
            .directory
            .find(origin, destination, self.match_mode)
            .into_iter()
            .map(|route| route.id)
            .collect();

        debug!(count = self.results.len(), "Search finished");
        Ok(self.results())
    }

    /// Routes from the last search, in directory order
    #[must_use]
    pub fn results(&self) -> Vec<&BusRoute> {
        self.results
            .iter()
            .filter_map(|id| self.directory.get(*id))
            .collect()
    }

    /// Select a bus and start a stop lookup for it
    ///
    /// Any lookup started for an earlier selection becomes stale.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no route has this ID.
    pub fn select(&mut self, id: RouteId) -> Result<StopFetchTicket, DomainError> {
        if self.directory.get(id).is_none() {
            return Err(DomainError::not_found("Bus route", id.to_string()));
        }

        self.selected = Some(id);
        self.reset_stops();
        debug!(route = %id, generation = self.generation, "Bus selected");
        Ok(StopFetchTicket {
            generation: self.generation,
            route_id: id,
        })
    }

    /// Drop the current selection and its stops
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.reset_stops();
    }

    /// The selected bus
    #[must_use]
    pub fn selected(&self) -> Option<&BusRoute> {
        self.selected.and_then(|id| self.directory.get(id))
    }

    /// Apply a finished stop lookup
    ///
    /// Returns false and changes nothing if the ticket is stale.
    pub fn apply_stop_fetch(&mut self, ticket: StopFetchTicket, outcome: StopFetchOutcome) -> bool {
        if ticket.generation != self.generation {
            debug!(
                route = %ticket.route_id,
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale stop lookup"
            );
            return false;
        }

        match outcome.error {
            Some(message) => self.raise(AdvisoryKind::StopFetch, message),
            None => self.dismiss(AdvisoryKind::StopFetch),
        }
        if outcome.capped {
            self.raise(AdvisoryKind::TooManyStops, TOO_MANY_STOPS);
        } else {
            self.dismiss(AdvisoryKind::TooManyStops);
        }

        self.stops = outcome.stops;
        self.stops.truncate(MAX_NEARBY_STOPS);
        true
    }

    /// Stops loaded for the selection
    #[must_use]
    pub fn stops(&self) -> &[BusStop] {
        &self.stops
    }

    /// Reflect a location update in the advisories
    pub fn apply_location(&mut self, state: &LocationState) {
        match &state.error {
            Some(message) => self.raise(AdvisoryKind::Location, message.clone()),
            None => self.dismiss(AdvisoryKind::Location),
        }
    }

    /// Show an advisory, replacing any of the same kind
    pub fn raise(&mut self, kind: AdvisoryKind, message: impl Into<String>) {
        self.advisories.insert(kind, message.into());
    }

    /// Hide an advisory
    pub fn dismiss(&mut self, kind: AdvisoryKind) {
        self.advisories.remove(&kind);
    }

    /// Advisories currently shown, ordered by kind
    #[must_use]
    pub fn advisories(&self) -> Vec<Advisory> {
        self.advisories
            .iter()
            .map(|(kind, message)| Advisory {
                kind: *kind,
                message: message.clone(),
            })
            .collect()
    }

    /// The advisory of a given kind, if shown
    #[must_use]
    pub fn advisory(&self, kind: AdvisoryKind) -> Option<&str> {
        self.advisories.get(&kind).map(String::as_str)
    }

    fn reset_stops(&mut self) {
        self.generation += 1;
        self.stops.clear();
        self.dismiss(AdvisoryKind::StopFetch);
        self.dismiss(AdvisoryKind::TooManyStops);
    }
}
