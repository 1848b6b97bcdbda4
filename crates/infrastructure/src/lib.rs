//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: the Overpass stop
//! finder, a fixed-position location source, and a GeoJSON map renderer.
//! Also owns configuration loading and tracing setup.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{
    AppConfig, DirectoryAppConfig, GeoLocationConfig, GeolocationAppConfig, RouteAppConfig,
};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
