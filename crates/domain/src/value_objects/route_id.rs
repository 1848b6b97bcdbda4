//! Bus route identifier

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a scheduled bus route in the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(u32);

impl RouteId {
    /// Create a route ID from its numeric value
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the numeric value
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RouteId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl FromStr for RouteId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}
