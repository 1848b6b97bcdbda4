//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod fixed_location_adapter;
mod geojson_map_adapter;
mod overpass_stop_adapter;

pub use fixed_location_adapter::FixedLocationAdapter;
pub use geojson_map_adapter::GeoJsonMapAdapter;
pub use overpass_stop_adapter::OverpassStopAdapter;
