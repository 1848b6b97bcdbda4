//! Value Objects - Immutable, identity-less domain primitives

mod geo_location;
mod route_id;

pub use geo_location::{GeoLocation, InvalidCoordinates};
pub use route_id::RouteId;
