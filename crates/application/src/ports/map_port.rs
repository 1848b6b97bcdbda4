//! Map rendering port
//!
//! The map library is consumed only through these layer operations. One
//! implementation owns exactly one map instance bound to one container.

use std::fmt;

use domain::value_objects::GeoLocation;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by the map library
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// The target container does not exist
    #[error("Map container #{0} not found")]
    ContainerMissing(String),

    /// The map library could not be loaded
    #[error("Map library failed to load: {0}")]
    LibraryUnavailable(String),

    /// A tile could not be fetched
    #[error("Failed to load map tiles: {0}")]
    TileLoad(String),

    /// A layer operation was attempted before the map exists
    #[error("Map has not been created")]
    NotCreated,

    /// The map already exists on this container
    #[error("Map already created on #{0}")]
    AlreadyCreated(String),
}

/// Handle to a layer added to the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(u64);

impl LayerId {
    /// Wrap a library-specific layer number
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw layer number
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// Handle to a registered resize listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wrap a library-specific listener number
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw listener number
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Marker colours used by the legend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    /// The user's own position
    Blue,
    /// The selected bus depot
    Green,
    /// Nearby bus stops
    Red,
}

impl MarkerColor {
    /// CSS hex value
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Blue => "#3b82f6",
            Self::Green => "#22c55e",
            Self::Red => "#ef4444",
        }
    }
}

/// Initial camera position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// Map centre
    pub center: GeoLocation,
    /// Zoom level
    pub zoom: u8,
}

/// Base tile layer definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayer {
    /// URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders
    pub url_template: String,
    /// Attribution text that must be displayed
    pub attribution: String,
    /// Maximum zoom supported by the tile server
    pub max_zoom: u8,
}

/// A layer that can be drawn on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapLayer {
    /// Raster base layer
    Tile(TileLayer),
    /// Point marker with a popup
    Marker {
        /// Marker position
        position: GeoLocation,
        /// Marker colour
        color: MarkerColor,
        /// Popup text
        popup: String,
    },
    /// Connected line through points
    Polyline {
        /// Points in drawing order
        points: Vec<GeoLocation>,
        /// Stroke colour
        color: String,
        /// Stroke width in pixels
        weight: u8,
        /// Dash pattern, solid when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dash_array: Option<String>,
    },
    /// Circle of fixed ground radius
    Circle {
        /// Circle centre
        center: GeoLocation,
        /// Radius in meters
        radius_meters: f64,
        /// Stroke and fill colour
        color: String,
    },
}

impl MapLayer {
    /// Short name of the layer kind, for logging
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Tile(_) => "tile",
            Self::Marker { .. } => "marker",
            Self::Polyline { .. } => "polyline",
            Self::Circle { .. } => "circle",
        }
    }
}

/// Port for the map rendering library
#[cfg_attr(test, automock)]
pub trait MapPort: Send {
    /// Whether a container with this ID is available to host a map
    fn container_exists(&self, container_id: &str) -> bool;

    /// Create the map instance on a container
    ///
    /// # Errors
    ///
    /// Returns an error if the container is missing, the library cannot be
    /// loaded, or a map already exists.
    fn create_map(&mut self, container_id: &str, view: MapView) -> Result<(), MapError>;

    /// Add a layer and return its handle
    ///
    /// # Errors
    ///
    /// Returns an error if the map has not been created or the layer cannot
    /// be drawn.
    fn add_layer(&mut self, layer: MapLayer) -> Result<LayerId, MapError>;

    /// Remove a layer; unknown IDs are ignored
    fn remove_layer(&mut self, id: LayerId);

    /// Recompute the map size after the container changed
    fn invalidate_size(&mut self);

    /// Register for container resize notifications
    fn add_resize_listener(&mut self) -> ListenerId;

    /// Unregister a resize listener
    fn remove_resize_listener(&mut self, id: ListenerId);

    /// Destroy the map instance and every layer on it
    fn destroy_map(&mut self);
}
