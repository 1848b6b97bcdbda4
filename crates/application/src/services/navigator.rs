//! Route navigator orchestration
//!
//! Wires the session, geolocation provider, stop lookup and map together:
//! search and select buses, fetch stops around the selected depot, and keep
//! the map in step with location updates.

use domain::{BusRoute, RouteId};
use tracing::{debug, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::MapPort;
use crate::services::geolocation::{GeolocationProvider, LocationState};
use crate::services::map_lifecycle::MapLifecycleManager;
use crate::services::nearby_stops::{NearbyStopService, StopFetchOutcome};
use crate::services::session::{AdvisoryKind, NavigatorSession, StopFetchTicket};

/// Drives one navigator view
#[derive(Debug)]
pub struct NavigatorService<M: MapPort> {
    session: NavigatorSession,
    location: GeolocationProvider,
    stops: NearbyStopService,
    map: MapLifecycleManager<M>,
}

impl<M: MapPort> NavigatorService<M> {
    /// Assemble a navigator from its parts
    #[must_use]
    pub fn new(
        session: NavigatorSession,
        location: GeolocationProvider,
        stops: NearbyStopService,
        map: MapLifecycleManager<M>,
    ) -> Self {
        Self {
            session,
            location,
            stops,
            map,
        }
    }

    /// Search and selection state
    #[must_use]
    pub const fn session(&self) -> &NavigatorSession {
        &self.session
    }

    /// Mutable search and selection state
    pub const fn session_mut(&mut self) -> &mut NavigatorSession {
        &mut self.session
    }

    /// The map manager
    #[must_use]
    pub const fn map(&self) -> &MapLifecycleManager<M> {
        &self.map
    }

    /// Mutable map manager, for hover and resize events
    pub const fn map_mut(&mut self) -> &mut MapLifecycleManager<M> {
        &mut self.map
    }

    /// Current location state
    #[must_use]
    pub fn location(&self) -> LocationState {
        self.location.state()
    }

    /// Create the map at the current location
    ///
    /// A bus selected before the map existed is drawn along with its stops.
    /// A failure is surfaced as a map advisory and is not retried.
    #[instrument(skip(self))]
    pub fn render(&mut self) {
        let state = self.location.state();
        self.session.apply_location(&state);

        if let Err(e) = self.map.initialize(state.coordinates) {
            warn!(error = %e, "Map could not be rendered");
            self.raise_map_error();
            return;
        }
        self.draw_selection();
    }

    /// Search for buses between two locations
    ///
    /// Clears any selection and removes its layers from the map.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the locations are missing or equal.
    pub fn search(
        &mut self,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Result<Vec<BusRoute>, ApplicationError> {
        self.session.set_origin(origin);
        self.session.set_destination(destination);

        let results: Vec<BusRoute> = self.session.search()?.into_iter().cloned().collect();

        self.map.clear_route();
        self.map.clear_stops();
        info!(count = results.len(), "Buses found");
        Ok(results)
    }

    /// Select a bus: draw its route and start a stop lookup
    ///
    /// Complete the lookup with [`Self::fetch_stops`] and
    /// [`Self::finish_stop_fetch`], or use [`Self::select`] to do all three.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown route ID.
    pub fn begin_selection(&mut self, id: RouteId) -> Result<StopFetchTicket, ApplicationError> {
        let ticket = self.session.select(id)?;
        self.map.clear_stops();

        if self.map.is_ready() {
            self.draw_route();
        }
        Ok(ticket)
    }

    /// Look up stops around the depot of the ticket's route
    pub async fn fetch_stops(&self, ticket: StopFetchTicket) -> StopFetchOutcome {
        match self.session.directory().get(ticket.route_id()) {
            Some(route) => self.stops.fetch(&route.depot).await,
            None => StopFetchOutcome::default(),
        }
    }

    /// Apply a stop lookup if it still belongs to the current selection
    ///
    /// Returns false when the result was stale and discarded.
    pub fn finish_stop_fetch(&mut self, ticket: StopFetchTicket, outcome: StopFetchOutcome) -> bool {
        if !self.session.apply_stop_fetch(ticket, outcome) {
            return false;
        }

        if self.map.is_ready() {
            self.draw_stops();
        }
        true
    }

    /// Select a bus and load its nearby stops
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown route ID. Stop lookup failures are
    /// reported as advisories, not errors.
    #[instrument(skip(self))]
    pub async fn select(&mut self, id: RouteId) -> Result<(), ApplicationError> {
        let ticket = self.begin_selection(id)?;
        let outcome = self.fetch_stops(ticket).await;
        self.finish_stop_fetch(ticket, outcome);
        Ok(())
    }

    /// Deselect the current bus
    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
        self.map.clear_route();
        self.map.clear_stops();
    }

    /// Wait for the next location update and apply it
    ///
    /// Returns `None` once the location watch has ended.
    pub async fn next_location_update(&mut self) -> Option<LocationState> {
        let state = self.location.changed().await?;
        self.apply_location(&state);
        Some(state)
    }

    /// Apply a location state to the advisories and map
    pub fn apply_location(&mut self, state: &LocationState) {
        self.session.apply_location(state);
        if let Err(e) = self.map.update_user_location(state.coordinates) {
            warn!(error = %e, "User marker could not be moved");
            self.raise_map_error();
        }
    }

    /// Release the location watch and destroy the map
    pub fn shutdown(&mut self) {
        self.location.stop();
        self.map.teardown();
        debug!("Navigator shut down");
    }

    fn draw_selection(&mut self) {
        if self.session.selected().is_some() {
            self.draw_route();
        }
        if !self.session.stops().is_empty() {
            self.draw_stops();
        }
    }

    fn draw_route(&mut self) {
        if let Some(route) = self.session.selected().cloned() {
            if let Err(e) = self.map.show_route(&route) {
                warn!(error = %e, route = %route.id, "Route could not be drawn");
                self.raise_map_error();
            }
        }
    }

    fn draw_stops(&mut self) {
        if let Err(e) = self.map.show_stops(self.session.stops()) {
            warn!(error = %e, "Stop markers could not be drawn");
            self.raise_map_error();
        }
    }

    fn raise_map_error(&mut self) {
        if let Some(message) = self.map.error_message() {
            self.session.raise(AdvisoryKind::Map, message);
        }
    }
}
