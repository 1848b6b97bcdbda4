//! Overpass stop adapter - Implements StopFinderPort using integration_overpass

use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::StopFinderPort;
use async_trait::async_trait;
use domain::{BusStop, UNNAMED_STOP, value_objects::GeoLocation};
use integration_overpass::{
    HttpOverpassClient, OverpassClient, OverpassConfig, OverpassError, OverpassNode,
};
use tracing::{debug, instrument, warn};

/// Adapter for bus stop lookup via the OpenStreetMap Overpass API
pub struct OverpassStopAdapter {
    client: Arc<dyn OverpassClient>,
}

impl std::fmt::Debug for OverpassStopAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverpassStopAdapter")
            .field("client", &"<OverpassClient>")
            .finish()
    }
}

impl OverpassStopAdapter {
    /// Create an adapter over an existing client
    #[must_use]
    pub fn new(client: Arc<dyn OverpassClient>) -> Self {
        Self { client }
    }

    /// Create an adapter with an HTTP client built from `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn from_config(config: &OverpassConfig) -> Result<Self, ApplicationError> {
        let client = HttpOverpassClient::new(config).map_err(|e| match e {
            OverpassError::ConfigurationError(msg) => ApplicationError::Configuration(msg),
            other => ApplicationError::ExternalService(format!(
                "Failed to create Overpass client: {other}"
            )),
        })?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Convert an Overpass node into a domain bus stop
    ///
    /// Returns `None` when the node's coordinates are out of range.
    fn convert_node(node: &OverpassNode) -> Option<BusStop> {
        let location = GeoLocation::new(node.latitude, node.longitude).ok()?;
        let name = node.name().unwrap_or(UNNAMED_STOP);
        Some(BusStop::new(node.id.to_string(), name, location).with_routes(node.route_refs()))
    }

    fn map_error(error: OverpassError) -> ApplicationError {
        match error {
            OverpassError::RateLimitExceeded { .. } => ApplicationError::RateLimited,
            other => ApplicationError::ExternalService(format!("Bus stop lookup failed: {other}")),
        }
    }
}

#[async_trait]
impl StopFinderPort for OverpassStopAdapter {
    #[instrument(skip(self), fields(location = %location))]
    async fn find_stops_near(
        &self,
        location: &GeoLocation,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<BusStop>, ApplicationError> {
        let nodes = self
            .client
            .find_bus_stops(
                location.latitude(),
                location.longitude(),
                radius_meters,
                limit,
            )
            .await
            .map_err(Self::map_error)?;

        let received = nodes.len();
        let stops: Vec<BusStop> = nodes.iter().filter_map(Self::convert_node).collect();

        if stops.len() < received {
            warn!(
                dropped = received - stops.len(),
                "Discarded stops with invalid coordinates"
            );
        }
        debug!(count = stops.len(), "Converted Overpass nodes to bus stops");

        Ok(stops)
    }

    async fn is_available(&self) -> bool {
        self.client.is_healthy().await
    }
}
