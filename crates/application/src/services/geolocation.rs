//! Geolocation provider
//!
//! Turns a [`LocationPort`] watch into an observable [`LocationState`]. The
//! state always holds a usable coordinate: the reported fix when there is
//! one, the configured fallback otherwise.

use std::sync::Arc;
use std::time::Duration;

use domain::value_objects::GeoLocation;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::ports::{LocationError, LocationPort, PositionUpdate, PositionWatch, WatchId, WatchOptions};

/// Message shown when the device has no location capability
pub const GEOLOCATION_UNSUPPORTED: &str = "Geolocation is not supported on this device";

/// Message shown when a fix could not be obtained
pub const GEOLOCATION_UNAVAILABLE: &str = "Could not access your location. Using default location.";

/// Snapshot of the user's location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationState {
    /// Current coordinate, or the fallback
    pub coordinates: GeoLocation,
    /// Advisory text when the fallback is in use
    pub error: Option<String>,
    /// True until the first fix or failure
    pub loading: bool,
}

impl LocationState {
    /// State before any fix has been reported
    #[must_use]
    pub const fn initial(fallback: GeoLocation) -> Self {
        Self {
            coordinates: fallback,
            error: None,
            loading: true,
        }
    }

    /// State after a successful fix
    #[must_use]
    pub const fn located(coordinates: GeoLocation) -> Self {
        Self {
            coordinates,
            error: None,
            loading: false,
        }
    }

    /// State after a failure, using the fallback coordinate
    #[must_use]
    pub fn failed(fallback: GeoLocation, error: &LocationError) -> Self {
        Self {
            coordinates: fallback,
            error: Some(failure_message(error).to_string()),
            loading: false,
        }
    }

    /// Whether the coordinate is a real fix rather than the fallback
    #[must_use]
    pub const fn has_fix(&self) -> bool {
        !self.loading && self.error.is_none()
    }
}

/// User-facing text for a location failure
#[must_use]
pub const fn failure_message(error: &LocationError) -> &'static str {
    match error {
        LocationError::Unsupported => GEOLOCATION_UNSUPPORTED,
        LocationError::PermissionDenied
        | LocationError::PositionUnavailable(_)
        | LocationError::Timeout => GEOLOCATION_UNAVAILABLE,
    }
}

/// Watches the device position and publishes [`LocationState`] updates
///
/// The platform watch is released when the provider is stopped or dropped.
pub struct GeolocationProvider {
    source: Arc<dyn LocationPort>,
    state: watch::Receiver<LocationState>,
    watch_id: Option<WatchId>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for GeolocationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeolocationProvider")
            .field("source", &"<LocationPort>")
            .field("state", &*self.state.borrow())
            .field("watch_id", &self.watch_id)
            .finish_non_exhaustive()
    }
}

impl GeolocationProvider {
    /// Start watching the device position
    ///
    /// Must be called from within a tokio runtime. If no fix or failure
    /// arrives within `options.timeout`, the state switches to the fallback
    /// with an advisory; a later fix still replaces it.
    #[instrument(skip(source))]
    pub fn start(source: Arc<dyn LocationPort>, options: WatchOptions, fallback: GeoLocation) -> Self {
        let (tx, rx) = watch::channel(LocationState::initial(fallback));

        match source.watch_position(&options) {
            Ok(PositionWatch { id, updates }) => {
                debug!(%id, "Location watch started");
                let task = tokio::spawn(run_watch(updates, tx, options.timeout, fallback));
                Self {
                    source,
                    state: rx,
                    watch_id: Some(id),
                    task: Some(task),
                }
            },
            Err(e) => {
                warn!(error = %e, "Location watch could not start, using fallback");
                tx.send_replace(LocationState::failed(fallback, &e));
                Self {
                    source,
                    state: rx,
                    watch_id: None,
                    task: None,
                }
            },
        }
    }

    /// Current location state
    #[must_use]
    pub fn state(&self) -> LocationState {
        self.state.borrow().clone()
    }

    /// A receiver that observes every future state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LocationState> {
        self.state.clone()
    }

    /// Wait for the next state change
    ///
    /// Returns `None` once the watch has ended and no further updates can
    /// arrive.
    pub async fn changed(&mut self) -> Option<LocationState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Whether the platform watch is still held
    #[must_use]
    pub const fn is_watching(&self) -> bool {
        self.watch_id.is_some()
    }

    /// Release the platform watch and stop listening for updates
    ///
    /// The last published state stays readable. Calling this twice is a
    /// no-op.
    pub fn stop(&mut self) {
        if let Some(id) = self.watch_id.take() {
            self.source.clear_watch(id);
            debug!(%id, "Location watch cleared");
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for GeolocationProvider {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_watch(
    mut updates: mpsc::Receiver<PositionUpdate>,
    tx: watch::Sender<LocationState>,
    first_fix_timeout: Duration,
    fallback: GeoLocation,
) {
    match tokio::time::timeout(first_fix_timeout, updates.recv()).await {
        Ok(Some(update)) => publish(&tx, update, fallback),
        Ok(None) => {
            warn!("Location source closed before reporting a position");
            tx.send_replace(LocationState::failed(fallback, &LocationError::Timeout));
            return;
        },
        Err(_) => {
            warn!(
                timeout_ms = first_fix_timeout.as_millis(),
                "No position fix within timeout, using fallback"
            );
            tx.send_replace(LocationState::failed(fallback, &LocationError::Timeout));
        },
    }

    while let Some(update) = updates.recv().await {
        publish(&tx, update, fallback);
    }
    debug!("Location source ended the watch");
}

fn publish(tx: &watch::Sender<LocationState>, update: PositionUpdate, fallback: GeoLocation) {
    match update {
        Ok(coordinates) => {
            info!(%coordinates, "Position fix received");
            tx.send_replace(LocationState::located(coordinates));
        },
        Err(e) => {
            warn!(error = %e, "Location error, using fallback");
            tx.send_replace(LocationState::failed(fallback, &e));
        },
    }
}
