//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod location_port;
mod map_port;
mod stop_finder_port;

#[cfg(test)]
pub use location_port::MockLocationPort;
pub use location_port::{LocationError, LocationPort, PositionUpdate, PositionWatch, WatchId, WatchOptions};
#[cfg(test)]
pub use map_port::MockMapPort;
pub use map_port::{
    LayerId, ListenerId, MapError, MapLayer, MapPort, MapView, MarkerColor, TileLayer,
};
#[cfg(test)]
pub use stop_finder_port::MockStopFinderPort;
pub use stop_finder_port::StopFinderPort;
