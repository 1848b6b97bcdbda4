//! Domain entities - Objects with identity

mod bus_route;
mod bus_stop;

pub use bus_route::BusRoute;
pub use bus_stop::{BusStop, UNNAMED_STOP};
