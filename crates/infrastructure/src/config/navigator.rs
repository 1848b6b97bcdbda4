//! Directory and route display configuration

use application::services::{DEFAULT_JITTER_DEGREES, Jitter, RouteInterpolator};
use domain::MatchMode;
use serde::{Deserialize, Serialize};

/// Upper bound for the route jitter; larger values visibly distort the line
const MAX_JITTER_DEGREES: f64 = 0.01;

/// Bus directory configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryAppConfig {
    /// How origin and destination queries are matched
    #[serde(default)]
    pub match_mode: MatchMode,
}

/// Route line configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteAppConfig {
    /// Maximum per-axis offset of intermediate points in degrees (0 disables)
    #[serde(default = "default_jitter_degrees")]
    pub jitter_degrees: f64,

    /// Seed for reproducible jitter
    #[serde(default)]
    pub seed: Option<u64>,
}

const fn default_jitter_degrees() -> f64 {
    DEFAULT_JITTER_DEGREES
}

impl Default for RouteAppConfig {
    fn default() -> Self {
        Self {
            jitter_degrees: default_jitter_degrees(),
            seed: None,
        }
    }
}

impl RouteAppConfig {
    /// Jitter mode described by this configuration
    #[must_use]
    pub fn jitter(&self) -> Jitter {
        if self.jitter_degrees <= 0.0 {
            return Jitter::None;
        }
        match self.seed {
            Some(seed) => Jitter::Seeded {
                amplitude: self.jitter_degrees,
                seed,
            },
            None => Jitter::Random {
                amplitude: self.jitter_degrees,
            },
        }
    }

    /// Interpolator built from this configuration
    #[must_use]
    pub fn interpolator(&self) -> RouteInterpolator {
        RouteInterpolator::new(self.jitter())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the jitter is negative, not finite, or too large.
    pub fn validate(&self) -> Result<(), String> {
        if !self.jitter_degrees.is_finite() || self.jitter_degrees < 0.0 {
            return Err("route.jitter_degrees must be a non-negative number".to_string());
        }
        if self.jitter_degrees > MAX_JITTER_DEGREES {
            return Err(format!(
                "route.jitter_degrees must not exceed {MAX_JITTER_DEGREES}"
            ));
        }
        Ok(())
    }
}
