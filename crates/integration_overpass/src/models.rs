//! Typed Overpass response models

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A bus stop node with a known position
///
/// Only nodes that carried both `lat` and `lon` become an `OverpassNode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpassNode {
    /// OpenStreetMap node ID
    pub id: u64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Raw OpenStreetMap tags
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl OverpassNode {
    /// Stop name from the `name` tag, then `name:en`
    ///
    /// Returns `None` when neither tag carries a non-blank value.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        ["name", "name:en"]
            .iter()
            .filter_map(|key| self.tags.get(*key))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }

    /// Route references from the `route_ref` tag
    ///
    /// OpenStreetMap separates multiple refs with `;`.
    #[must_use]
    pub fn route_refs(&self) -> Vec<String> {
        self.tags
            .get("route_ref")
            .map(|refs| {
                refs.split(';')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}
