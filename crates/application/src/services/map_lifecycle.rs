//! Map lifecycle management
//!
//! Owns the single map instance for a container and every layer drawn on
//! it. Layers are always removed before their replacements are added, so a
//! selection change never leaves a stale depot marker or route line behind.

use std::collections::BTreeMap;

use domain::{BusRoute, BusStop, RouteId, value_objects::GeoLocation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::ports::{LayerId, ListenerId, MapError, MapLayer, MapPort, MapView, MarkerColor, TileLayer};
use crate::services::route::RouteInterpolator;

/// Popup text on the user marker
pub const USER_LOCATION_LABEL: &str = "Your Location";

/// Default radius of the circle drawn around the user marker
pub const DEFAULT_ACCURACY_RADIUS_METERS: f64 = 100.0;

/// Appended to every map failure shown to the user
pub const REFRESH_HINT: &str = "Please refresh the page.";

const ROUTE_LINE_WEIGHT: u8 = 3;
const ROUTE_LINE_DASH: &str = "5, 10";

/// Map display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    /// ID of the container hosting the map
    #[serde(default = "default_container_id")]
    pub container_id: String,

    /// Tile URL template
    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    /// Tile attribution (must be displayed)
    #[serde(default = "default_attribution")]
    pub attribution: String,

    /// Maximum zoom of the tile server
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,

    /// Zoom level when the map is created
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: u8,

    /// Radius of the circle around the user marker in meters
    #[serde(default = "default_accuracy_radius")]
    pub accuracy_radius_meters: f64,
}

fn default_container_id() -> String {
    "map-container".to_string()
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_attribution() -> String {
    "© OpenStreetMap contributors".to_string()
}

const fn default_max_zoom() -> u8 {
    19
}

const fn default_initial_zoom() -> u8 {
    13
}

const fn default_accuracy_radius() -> f64 {
    DEFAULT_ACCURACY_RADIUS_METERS
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            container_id: default_container_id(),
            tile_url: default_tile_url(),
            attribution: default_attribution(),
            max_zoom: default_max_zoom(),
            initial_zoom: default_initial_zoom(),
            accuracy_radius_meters: default_accuracy_radius(),
        }
    }
}

impl MapSettings {
    /// Base layer built from these settings
    #[must_use]
    pub fn tile_layer(&self) -> TileLayer {
        TileLayer {
            url_template: self.tile_url.clone(),
            attribution: self.attribution.clone(),
            max_zoom: self.max_zoom,
        }
    }

    /// Validate the settings
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.container_id.trim().is_empty() {
            return Err("container_id must not be empty".to_string());
        }

        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.tile_url.contains(placeholder) {
                return Err(format!("tile_url must contain {placeholder}"));
            }
        }

        if self.attribution.trim().is_empty() {
            return Err("attribution must not be empty".to_string());
        }

        if self.initial_zoom > self.max_zoom {
            return Err(format!(
                "initial_zoom {} exceeds max_zoom {}",
                self.initial_zoom, self.max_zoom
            ));
        }

        if !self.accuracy_radius_meters.is_finite() || self.accuracy_radius_meters < 0.0 {
            return Err("accuracy_radius_meters must be a non-negative number".to_string());
        }

        Ok(())
    }
}

/// Lifecycle phase of the map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapPhase {
    /// No map exists yet
    Uninitialized,
    /// Map with base layer and user marker
    Initialized,
    /// Map additionally shows a depot marker and route line
    RouteDisplayed,
    /// Map destroyed; the manager is finished
    TornDown,
    /// Map failed; nothing is retried
    Failed(MapError),
}

#[derive(Debug, Clone, Copy)]
struct RouteLayers {
    route_id: RouteId,
    depot: LayerId,
    line: LayerId,
}

/// Owns one map instance and its layers
#[derive(Debug)]
pub struct MapLifecycleManager<P: MapPort> {
    port: P,
    settings: MapSettings,
    interpolator: RouteInterpolator,
    phase: MapPhase,
    map_created: bool,
    user_location: Option<GeoLocation>,
    user_layers: Vec<LayerId>,
    selected: Option<BusRoute>,
    route_layers: Option<RouteLayers>,
    stop_markers: BTreeMap<LayerId, BusStop>,
    hovered: Option<LayerId>,
    resize_listener: Option<ListenerId>,
}

impl<P: MapPort> MapLifecycleManager<P> {
    /// Create a manager; no map exists until [`Self::initialize`]
    #[must_use]
    pub fn new(port: P, settings: MapSettings, interpolator: RouteInterpolator) -> Self {
        Self {
            port,
            settings,
            interpolator,
            phase: MapPhase::Uninitialized,
            map_created: false,
            user_location: None,
            user_layers: Vec::new(),
            selected: None,
            route_layers: None,
            stop_markers: BTreeMap::new(),
            hovered: None,
            resize_listener: None,
        }
    }

    /// Current lifecycle phase
    #[must_use]
    pub const fn phase(&self) -> &MapPhase {
        &self.phase
    }

    /// Whether layers can be drawn
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.phase, MapPhase::Initialized | MapPhase::RouteDisplayed)
    }

    /// User-facing error text once the map has failed
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match &self.phase {
            MapPhase::Failed(e) => Some(format!("{e}. {REFRESH_HINT}")),
            _ => None,
        }
    }

    /// The underlying map port
    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// Settings in use
    #[must_use]
    pub const fn settings(&self) -> &MapSettings {
        &self.settings
    }

    /// The route currently drawn, if any
    #[must_use]
    pub const fn selected_route(&self) -> Option<&BusRoute> {
        self.selected.as_ref()
    }

    /// Number of stop markers on the map
    #[must_use]
    pub fn stop_marker_count(&self) -> usize {
        self.stop_markers.len()
    }

    /// Create the map centred on the user and draw the base layers
    ///
    /// Does nothing if the map already exists.
    ///
    /// # Errors
    ///
    /// Returns the failure if the container is missing or the map library
    /// fails. The manager then stays in [`MapPhase::Failed`].
    #[instrument(skip(self), fields(container = %self.settings.container_id))]
    pub fn initialize(&mut self, user_location: GeoLocation) -> Result<(), MapError> {
        match &self.phase {
            MapPhase::Initialized | MapPhase::RouteDisplayed => {
                debug!("Map already initialized");
                return Ok(());
            },
            MapPhase::Failed(e) => return Err(e.clone()),
            MapPhase::TornDown => return Err(MapError::NotCreated),
            MapPhase::Uninitialized => {},
        }

        let container_id = self.settings.container_id.clone();
        if !self.port.container_exists(&container_id) {
            return Err(self.fail(MapError::ContainerMissing(container_id)));
        }

        let view = MapView {
            center: user_location,
            zoom: self.settings.initial_zoom,
        };
        if let Err(e) = self.port.create_map(&container_id, view) {
            return Err(self.fail(e));
        }
        self.map_created = true;

        if let Err(e) = self.port.add_layer(MapLayer::Tile(self.settings.tile_layer())) {
            return Err(self.fail(e));
        }

        self.user_location = Some(user_location);
        if let Err(e) = self.draw_user_layers(user_location) {
            return Err(self.fail(e));
        }

        self.resize_listener = Some(self.port.add_resize_listener());
        self.phase = MapPhase::Initialized;
        info!(%user_location, "Map initialized");
        Ok(())
    }

    /// Move the user marker and redraw the route from the new position
    ///
    /// Before initialization the location is only remembered.
    ///
    /// # Errors
    ///
    /// Returns an error if the map library rejects a layer.
    pub fn update_user_location(&mut self, location: GeoLocation) -> Result<(), MapError> {
        if self.user_location == Some(location) {
            return Ok(());
        }
        self.user_location = Some(location);
        if !self.is_ready() {
            return Ok(());
        }

        self.remove_user_layers();
        self.draw_user_layers(location)?;

        if let Some(route) = self.selected.clone() {
            self.show_route(&route)?;
        }
        Ok(())
    }

    /// Draw the depot marker and route line for a bus
    ///
    /// Any previously drawn route is removed first.
    ///
    /// # Errors
    ///
    /// Returns an error if the map is not ready or a layer is rejected.
    #[instrument(skip(self, route), fields(route = %route.id))]
    pub fn show_route(&mut self, route: &BusRoute) -> Result<(), MapError> {
        self.ensure_ready()?;
        let user_location = self.user_location.ok_or(MapError::NotCreated)?;

        self.remove_route_layers();

        let depot = match self.port.add_layer(MapLayer::Marker {
            position: route.depot,
            color: MarkerColor::Green,
            popup: route.depot_label(),
        }) {
            Ok(depot) => depot,
            Err(e) => {
                self.drop_selection();
                return Err(e);
            },
        };

        let points = self.interpolator.interpolate(&user_location, &route.depot);
        let line = match self.port.add_layer(MapLayer::Polyline {
            points,
            color: MarkerColor::Blue.hex().to_string(),
            weight: ROUTE_LINE_WEIGHT,
            dash_array: Some(ROUTE_LINE_DASH.to_string()),
        }) {
            Ok(line) => line,
            Err(e) => {
                self.port.remove_layer(depot);
                self.drop_selection();
                return Err(e);
            },
        };

        self.route_layers = Some(RouteLayers {
            route_id: route.id,
            depot,
            line,
        });
        self.selected = Some(route.clone());
        self.phase = MapPhase::RouteDisplayed;
        debug!("Route displayed");
        Ok(())
    }

    /// Remove the depot marker and route line
    pub fn clear_route(&mut self) {
        self.remove_route_layers();
        self.drop_selection();
    }

    /// Replace all stop markers
    ///
    /// Returns the number of markers drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if the map is not ready or a marker is rejected.
    pub fn show_stops(&mut self, stops: &[BusStop]) -> Result<usize, MapError> {
        self.ensure_ready()?;
        self.clear_stops();

        for stop in stops {
            let id = self.port.add_layer(MapLayer::Marker {
                position: stop.location,
                color: MarkerColor::Red,
                popup: stop.name.clone(),
            })?;
            self.stop_markers.insert(id, stop.clone());
        }

        debug!(count = self.stop_markers.len(), "Stop markers drawn");
        Ok(self.stop_markers.len())
    }

    /// Remove every stop marker
    pub fn clear_stops(&mut self) {
        for id in std::mem::take(&mut self.stop_markers).into_keys() {
            self.port.remove_layer(id);
        }
        self.hovered = None;
    }

    /// Pointer entered a marker; returns the stop now hovered
    pub fn hover_enter(&mut self, layer: LayerId) -> Option<&BusStop> {
        if self.stop_markers.contains_key(&layer) {
            self.hovered = Some(layer);
        }
        self.hovered_stop()
    }

    /// Pointer left a marker
    pub fn hover_leave(&mut self, layer: LayerId) {
        if self.hovered == Some(layer) {
            self.hovered = None;
        }
    }

    /// The stop under the pointer, if any
    #[must_use]
    pub fn hovered_stop(&self) -> Option<&BusStop> {
        self.hovered.and_then(|id| self.stop_markers.get(&id))
    }

    /// Stop markers ordered by layer ID
    pub fn stop_layers(&self) -> impl Iterator<Item = (LayerId, &BusStop)> {
        self.stop_markers.iter().map(|(id, stop)| (*id, stop))
    }

    /// The container was resized
    pub fn handle_resize(&mut self) {
        if self.is_ready() {
            self.port.invalidate_size();
        }
    }

    /// A tile failed to load; the map is marked failed
    pub fn report_tile_error(&mut self, detail: &str) {
        if matches!(self.phase, MapPhase::TornDown | MapPhase::Failed(_)) {
            return;
        }
        self.fail(MapError::TileLoad(detail.to_string()));
    }

    /// Remove listeners and destroy the map
    ///
    /// Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.phase == MapPhase::TornDown {
            return;
        }
        if let Some(listener) = self.resize_listener.take() {
            self.port.remove_resize_listener(listener);
        }
        if self.map_created {
            self.port.destroy_map();
            self.map_created = false;
        }
        self.user_layers.clear();
        self.route_layers = None;
        self.selected = None;
        self.stop_markers.clear();
        self.hovered = None;
        self.phase = MapPhase::TornDown;
        info!("Map torn down");
    }

    fn ensure_ready(&self) -> Result<(), MapError> {
        match &self.phase {
            MapPhase::Initialized | MapPhase::RouteDisplayed => Ok(()),
            MapPhase::Failed(e) => Err(e.clone()),
            MapPhase::Uninitialized | MapPhase::TornDown => Err(MapError::NotCreated),
        }
    }

    fn fail(&mut self, error: MapError) -> MapError {
        warn!(error = %error, "Map failed");
        self.phase = MapPhase::Failed(error.clone());
        error
    }

    fn draw_user_layers(&mut self, location: GeoLocation) -> Result<(), MapError> {
        let marker = self.port.add_layer(MapLayer::Marker {
            position: location,
            color: MarkerColor::Blue,
            popup: USER_LOCATION_LABEL.to_string(),
        })?;
        self.user_layers.push(marker);

        let circle = self.port.add_layer(MapLayer::Circle {
            center: location,
            radius_meters: self.settings.accuracy_radius_meters,
            color: MarkerColor::Blue.hex().to_string(),
        })?;
        self.user_layers.push(circle);
        Ok(())
    }

    fn remove_user_layers(&mut self) {
        for id in std::mem::take(&mut self.user_layers) {
            self.port.remove_layer(id);
        }
    }

    fn drop_selection(&mut self) {
        self.selected = None;
        if self.phase == MapPhase::RouteDisplayed {
            self.phase = MapPhase::Initialized;
        }
    }

    fn remove_route_layers(&mut self) {
        if let Some(layers) = self.route_layers.take() {
            debug!(route = %layers.route_id, "Removing route layers");
            self.port.remove_layer(layers.depot);
            self.port.remove_layer(layers.line);
        }
    }
}

impl<P: MapPort> Drop for MapLifecycleManager<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockMapPort;

    /// In-memory map that tracks live layers
    #[derive(Debug, Default)]
    struct RecordingMap {
        created: bool,
        next_id: u64,
        layers: BTreeMap<LayerId, MapLayer>,
        listeners: usize,
        invalidations: usize,
        destroyed: usize,
        reject_polylines: bool,
        reject_markers: bool,
    }

    impl RecordingMap {
        fn count(&self, kind: &str) -> usize {
            self.layers.values().filter(|l| l.kind() == kind).count()
        }

        fn markers(&self, color: MarkerColor) -> Vec<&MapLayer> {
            self.layers
                .values()
                .filter(|l| matches!(l, MapLayer::Marker { color: c, .. } if *c == color))
                .collect()
        }
    }

    impl MapPort for RecordingMap {
        fn container_exists(&self, container_id: &str) -> bool {
            container_id == "map-container"
        }

        fn create_map(&mut self, container_id: &str, _view: MapView) -> Result<(), MapError> {
            if self.created {
                return Err(MapError::AlreadyCreated(container_id.to_string()));
            }
            self.created = true;
            Ok(())
        }

        fn add_layer(&mut self, layer: MapLayer) -> Result<LayerId, MapError> {
            if !self.created {
                return Err(MapError::NotCreated);
            }
            if self.reject_polylines && layer.kind() == "polyline" {
                return Err(MapError::LibraryUnavailable("polyline".to_string()));
            }
            if self.reject_markers && layer.kind() == "marker" {
                return Err(MapError::LibraryUnavailable("marker".to_string()));
            }
            self.next_id += 1;
            let id = LayerId::new(self.next_id);
            self.layers.insert(id, layer);
            Ok(id)
        }

        fn remove_layer(&mut self, id: LayerId) {
            self.layers.remove(&id);
        }

        fn invalidate_size(&mut self) {
            self.invalidations += 1;
        }

        fn add_resize_listener(&mut self) -> ListenerId {
            self.listeners += 1;
            ListenerId::new(self.listeners as u64)
        }

        fn remove_resize_listener(&mut self, _id: ListenerId) {
            self.listeners -= 1;
        }

        fn destroy_map(&mut self) {
            self.created = false;
            self.layers.clear();
            self.destroyed += 1;
        }
    }

    fn manager() -> MapLifecycleManager<RecordingMap> {
        MapLifecycleManager::new(
            RecordingMap::default(),
            MapSettings::default(),
            RouteInterpolator::straight(),
        )
    }

    fn route(id: u32, depot: GeoLocation) -> BusRoute {
        BusRoute::new(
            id,
            format!("KSRTC {id}"),
            "Ernakulam",
            "Kozhikode",
            chrono::NaiveTime::MIN,
            depot,
        )
    }

    fn stop(id: &str) -> BusStop {
        BusStop::new(id, format!("Stop {id}"), GeoLocation::kochi())
    }

    #[test]
    fn initialize_draws_base_layers() {
        let mut map = manager();
        map.initialize(GeoLocation::kochi()).unwrap();

        assert_eq!(map.phase(), &MapPhase::Initialized);
        assert_eq!(map.port().count("tile"), 1);
        assert_eq!(map.port().count("circle"), 1);
        assert_eq!(map.port().markers(MarkerColor::Blue).len(), 1);
        assert_eq!(map.port().listeners, 1);
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut map = manager();
        map.initialize(GeoLocation::kochi()).unwrap();
        map.initialize(GeoLocation::kochi()).unwrap();

        assert_eq!(map.port().count("tile"), 1);
        assert_eq!(map.port().listeners, 1);
    }

    #[test]
    fn switching_routes_leaves_one_depot_and_one_line() {
        let mut map = manager();
        map.initialize(GeoLocation::kochi()).unwrap();

        map.show_route(&route(1, GeoLocation::kozhikode())).unwrap();
        map.show_route(&route(2, GeoLocation::trivandrum())).unwrap();

        assert_eq!(map.phase(), &MapPhase::RouteDisplayed);
        let depots = map.port().markers(MarkerColor::Green);
        assert_eq!(depots.len(), 1);
        assert!(matches!(
            depots[0],
            MapLayer::Marker { popup, position, .. }
                if popup == "KSRTC 2 Depot" && *position == GeoLocation::trivandrum()
        ));
        assert_eq!(map.port().count("polyline"), 1);
    }

    #[test]
    fn route_line_runs_from_user_to_depot() {
        let mut map = manager();
        map.initialize(GeoLocation::kochi()).unwrap();
        map.show_route(&route(1, GeoLocation::kozhikode())).unwrap();

        let line = map
            .port()
            .layers
            .values()
            .find_map(|l| match l {
                MapLayer::Polyline { points, dash_array, .. } => Some((points.clone(), dash_array.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(line.0.len(), 6);
        assert_eq!(line.0[0], GeoLocation::kochi());
        assert_eq!(line.0[5], GeoLocation::kozhikode());
        assert_eq!(line.1.as_deref(), Some("5, 10"));
    }

    #[test]
    fn clear_route_returns_to_initialized() {
        let mut map = manager();
        map.initialize(GeoLocation::kochi()).unwrap();
        map.show_route(&route(1, GeoLocation::kozhikode())).unwrap();
        map.clear_route();

        assert_eq!(map.phase(), &MapPhase::Initialized);
        assert!(map.port().markers(MarkerColor::Green).is_empty());
        assert_eq!(map.port().count("polyline"), 0);
        assert!(map.selected_route().is_none());
    }

    #[test]
    fn failed_polyline_does_not_leak_depot() {
        let mut map = manager();
        map.initialize(GeoLocation::kochi()).unwrap();
        map.port.reject_polylines = true;

        let result = map.show_route(&route(1, GeoLocation::kozhikode()));
        assert!(result.is_err());
        assert!(map.port().markers(MarkerColor::Green).is_empty());
        assert_eq!(map.phase(), &MapPhase::Initialized);
    }

    #[test]
    fn failed_depot_drops_replaced_route() {
        let mut map = manager();
        map.initialize(GeoLocation::kochi()).unwrap();
        map.show_route(&route(1, GeoLocation::kozhikode())).unwrap();

        map.port.reject_markers = true;
        let result = map.show_route(&route(2, GeoLocation::trivandrum()));
        assert!(result.is_err());
        assert_eq!(map.phase(), &MapPhase::Initialized);
        assert!(map.selected_route().is_none());
        assert_eq!(map.port().count("polyline"), 0);

        map.port.reject_markers = false;
        map.update_user_location(GeoLocation::new_unchecked(10.0, 76.3))
            .unwrap();
        assert!(map.port().markers(MarkerColor::Green).is_empty());
        assert_eq!(map.port().count("polyline"), 0);
    }

    #[test]
    fn user_location_update_moves_marker_and_route() {
        let mut map = manager();
        map.initialize(GeoLocation::kochi()).unwrap();
        map.show_route(&route(1, GeoLocation::kozhikode())).unwrap();

        let moved = GeoLocation::new_unchecked(10.0, 76.3);
        map.update_user_location(moved).unwrap();

        let users = map.port().markers(MarkerColor::Blue);
        assert_eq!(users.len(), 1);
        assert!(matches!(users[0], MapLayer::Marker { position, .. } if *position == moved));
        assert_eq!(map.port().count("circle"), 1);
        assert_eq!(map.port().count("polyline"), 1);
        assert_eq!(map.port().markers(MarkerColor::Green).len(), 1);
    }

    #[test]
    fn show_stops_replaces_markers() {
        let mut map = manager();
        map.initialize(GeoLocation::kochi()).unwrap();

        assert_eq!(map.show_stops(&[stop("a"), stop("b"), stop("c")]).unwrap(), 3);
        assert_eq!(map.show_stops(&[stop("d")]).unwrap(), 1);

        assert_eq!(map.port().markers(MarkerColor::Red).len(), 1);
        assert_eq!(map.stop_marker_count(), 1);
    }

    #[test]
    fn hover_tracks_a_single_stop() {
        let mut map = manager();
        map.initialize(GeoLocation::kochi()).unwrap();
        map.show_stops(&[stop("a"), stop("b")]).unwrap();
        let layers: Vec<LayerId> = map.stop_layers().map(|(id, _)| id).collect();

        assert_eq!(map.hover_enter(layers[0]).map(|s| s.id.as_str()), Some("a"));
        assert_eq!(map.hover_enter(layers[1]).map(|s| s.id.as_str()), Some("b"));

        // Leaving a marker that is no longer hovered changes nothing
        map.hover_leave(layers[0]);
        assert_eq!(map.hovered_stop().map(|s| s.id.as_str()), Some("b"));

        map.hover_leave(layers[1]);
        assert!(map.hovered_stop().is_none());
    }

    #[test]
    fn hover_cleared_when_stops_replaced() {
        let mut map = manager();
        map.initialize(GeoLocation::kochi()).unwrap();
        map.show_stops(&[stop("a")]).unwrap();
        let layer = map.stop_layers().next().unwrap().0;
        map.hover_enter(layer);

        map.show_stops(&[stop("b")]).unwrap();
        assert!(map.hovered_stop().is_none());
    }

    #[test]
    fn resize_invalidates_only_when_ready() {
        let mut map = manager();
        map.handle_resize();
        assert_eq!(map.port().invalidations, 0);

        map.initialize(GeoLocation::kochi()).unwrap();
        map.handle_resize();
        assert_eq!(map.port().invalidations, 1);
    }

    #[test]
    fn teardown_removes_listener_and_destroys_map() {
        let mut map = manager();
        map.initialize(GeoLocation::kochi()).unwrap();
        map.show_route(&route(1, GeoLocation::kozhikode())).unwrap();
        map.teardown();
        map.teardown();

        assert_eq!(map.phase(), &MapPhase::TornDown);
        assert_eq!(map.port().listeners, 0);
        assert_eq!(map.port().destroyed, 1);
        assert!(map.port().layers.is_empty());
        assert!(map.show_route(&route(1, GeoLocation::kozhikode())).is_err());
    }

    #[test]
    fn missing_container_fails_without_retry() {
        let mut mock = MockMapPort::new();
        mock.expect_container_exists().times(1).return_const(false);
        mock.expect_create_map().never();

        let mut map = MapLifecycleManager::new(
            mock,
            MapSettings::default(),
            RouteInterpolator::straight(),
        );

        let err = map.initialize(GeoLocation::kochi()).unwrap_err();
        assert_eq!(err, MapError::ContainerMissing("map-container".to_string()));
        assert!(matches!(map.phase(), MapPhase::Failed(_)));
        assert_eq!(
            map.error_message().as_deref(),
            Some("Map container #map-container not found. Please refresh the page.")
        );

        // Second attempt reports the same failure without touching the port
        assert!(map.initialize(GeoLocation::kochi()).is_err());
    }

    #[test]
    fn library_failure_is_reported() {
        let mut mock = MockMapPort::new();
        mock.expect_container_exists().return_const(true);
        mock.expect_create_map()
            .times(1)
            .returning(|_, _| Err(MapError::LibraryUnavailable("offline".to_string())));
        mock.expect_destroy_map().never();

        let mut map = MapLifecycleManager::new(
            mock,
            MapSettings::default(),
            RouteInterpolator::straight(),
        );

        assert!(map.initialize(GeoLocation::kochi()).is_err());
        assert!(map.error_message().unwrap().contains("offline"));
    }

    #[test]
    fn tile_error_marks_map_failed_and_blocks_rendering() {
        let mut map = manager();
        map.initialize(GeoLocation::kochi()).unwrap();
        map.report_tile_error("HTTP 503 for tile 13/5000/3000");

        assert!(matches!(map.phase(), MapPhase::Failed(MapError::TileLoad(_))));
        assert!(map.show_stops(&[stop("a")]).is_err());

        // The created map is still destroyed on teardown
        map.teardown();
        assert_eq!(map.port().destroyed, 1);
    }

    #[test]
    fn settings_validation() {
        assert!(MapSettings::default().validate().is_ok());

        let bad_zoom = MapSettings {
            initial_zoom: 20,
            ..MapSettings::default()
        };
        assert!(bad_zoom.validate().is_err());

        let bad_url = MapSettings {
            tile_url: "https://tiles.example.org/tile.png".to_string(),
            ..MapSettings::default()
        };
        assert!(bad_url.validate().is_err());
    }
}
