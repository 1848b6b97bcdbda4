//! Device location port
//!
//! Defines the continuous-watch interface to whatever supplies the user's
//! position (a browser, a GPS daemon, a fixed coordinate).

use std::fmt;
use std::time::Duration;

use domain::value_objects::GeoLocation;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors reported by a location source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The device has no location capability
    #[error("Location capability is not supported")]
    Unsupported,

    /// The user refused access to their position
    #[error("Permission to access location was denied")]
    PermissionDenied,

    /// The position could not be determined
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    /// No fix arrived within the configured timeout
    #[error("Timed out waiting for a position fix")]
    Timeout,
}

/// Options for a position watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchOptions {
    /// Prefer a high-accuracy fix over a fast one
    pub high_accuracy: bool,
    /// How long to wait for a fix
    pub timeout: Duration,
    /// Maximum age of a cached position; zero disables reuse
    pub maximum_age: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(5),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Handle identifying an active watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

impl WatchId {
    /// Wrap a source-specific watch number
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw watch number
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

/// Result of a single watch callback
pub type PositionUpdate = Result<GeoLocation, LocationError>;

/// An active position watch
///
/// Updates arrive on `updates` until the source closes the channel or the
/// watch is cleared with [`LocationPort::clear_watch`].
#[derive(Debug)]
pub struct PositionWatch {
    /// Identifier used to clear the watch
    pub id: WatchId,
    /// Stream of fixes and failures
    pub updates: mpsc::Receiver<PositionUpdate>,
}

/// Port for continuous position updates
#[cfg_attr(test, automock)]
pub trait LocationPort: Send + Sync {
    /// Begin watching the device position
    ///
    /// # Errors
    ///
    /// Returns `LocationError::Unsupported` when the source has no location
    /// capability, or another `LocationError` when the watch cannot start.
    fn watch_position(&self, options: &WatchOptions) -> Result<PositionWatch, LocationError>;

    /// Release a watch previously returned by `watch_position`
    fn clear_watch(&self, id: WatchId);
}
