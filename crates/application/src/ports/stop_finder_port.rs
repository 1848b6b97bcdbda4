//! Nearby stop lookup port
//!
//! Adapters in the infrastructure layer implement this port against a
//! points-of-interest service.

use async_trait::async_trait;
use domain::{BusStop, value_objects::GeoLocation};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for finding bus stops around a location
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StopFinderPort: Send + Sync {
    /// Find bus stops within `radius_meters` of `location`
    ///
    /// Returned stops carry validated coordinates. Implementations may
    /// return more than `limit` stops; callers enforce their own cap.
    async fn find_stops_near(
        &self,
        location: &GeoLocation,
        radius_meters: u32,
        limit: u32,
    ) -> Result<Vec<BusStop>, ApplicationError>;

    /// Check if the stop service is reachable
    async fn is_available(&self) -> bool;
}
