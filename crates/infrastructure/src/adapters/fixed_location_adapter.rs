//! Fixed location adapter - Implements LocationPort from configuration
//!
//! Hosts without a positioning device report a configured coordinate, or
//! report that geolocation is unsupported when none is configured. Further
//! positions can be pushed while a watch is active.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use application::ports::{
    LocationError, LocationPort, PositionUpdate, PositionWatch, WatchId, WatchOptions,
};
use domain::value_objects::GeoLocation;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Buffered updates per watch
const WATCH_BUFFER: usize = 16;

/// Location source backed by a configured coordinate
pub struct FixedLocationAdapter {
    position: Option<GeoLocation>,
    next_id: AtomicU64,
    watches: Mutex<HashMap<WatchId, mpsc::Sender<PositionUpdate>>>,
}

impl std::fmt::Debug for FixedLocationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedLocationAdapter")
            .field("position", &self.position)
            .field("active_watches", &self.watches.lock().len())
            .finish_non_exhaustive()
    }
}

impl FixedLocationAdapter {
    /// Create a source that reports `position`, or is unsupported when `None`
    #[must_use]
    pub fn new(position: Option<GeoLocation>) -> Self {
        Self {
            position,
            next_id: AtomicU64::new(1),
            watches: Mutex::new(HashMap::new()),
        }
    }

    /// A source that always reports `position`
    #[must_use]
    pub fn at(position: GeoLocation) -> Self {
        Self::new(Some(position))
    }

    /// A source without location capability
    #[must_use]
    pub fn unsupported() -> Self {
        Self::new(None)
    }

    /// Number of watches not yet cleared
    #[must_use]
    pub fn active_watches(&self) -> usize {
        self.watches.lock().len()
    }

    /// Deliver an update to every active watch
    ///
    /// Returns the number of watches that received it. Watches whose
    /// receiver is gone are released.
    pub fn push(&self, update: &PositionUpdate) -> usize {
        let mut watches = self.watches.lock();
        watches.retain(|id, tx| match tx.try_send(update.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(%id, "Watch buffer full, update dropped");
                true
            },
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
        watches.len()
    }
}

impl LocationPort for FixedLocationAdapter {
    #[instrument(skip(self))]
    fn watch_position(&self, options: &WatchOptions) -> Result<PositionWatch, LocationError> {
        let position = self.position.ok_or(LocationError::Unsupported)?;

        let id = WatchId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        tx.try_send(Ok(position))
            .map_err(|e| LocationError::PositionUnavailable(e.to_string()))?;

        self.watches.lock().insert(id, tx);
        debug!(%id, %position, "Fixed position watch started");

        Ok(PositionWatch { id, updates: rx })
    }

    fn clear_watch(&self, id: WatchId) {
        if self.watches.lock().remove(&id).is_some() {
            debug!(%id, "Fixed position watch cleared");
        }
    }
}
