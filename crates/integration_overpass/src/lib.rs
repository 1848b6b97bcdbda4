//! OpenStreetMap Overpass integration for Route Navigator
//!
//! Finds bus stops around a coordinate via the public
//! [Overpass API](https://overpass-api.de), which answers Overpass QL queries
//! over OpenStreetMap data.
//!
//! # Architecture
//!
//! [`OverpassClient`] defines the lookup interface and is implemented by
//! [`HttpOverpassClient`]. Responses are parsed into [`OverpassNode`]s; nodes
//! without a usable position never leave this crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_overpass::{HttpOverpassClient, OverpassClient, OverpassConfig};
//!
//! let client = HttpOverpassClient::new(&OverpassConfig::default())?;
//!
//! let nodes = client.find_bus_stops(
//!     9.9312, 76.2673, // Kochi
//!     2000,            // radius in meters
//!     30,              // max results
//! ).await?;
//! ```

mod client;
mod config;
mod error;
mod models;

pub use client::{HttpOverpassClient, OverpassClient, build_bus_stop_query};
pub use config::OverpassConfig;
pub use error::OverpassError;
pub use models::OverpassNode;
