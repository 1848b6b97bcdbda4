//! Straight-line route interpolation
//!
//! Produces a short polyline between two points for display. This is not
//! routing: points are evenly spaced along the straight line, optionally
//! nudged by a small random offset so the line looks hand-drawn.

use domain::value_objects::GeoLocation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Interpolation fractions, start and end inclusive
pub const ROUTE_FRACTIONS: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

/// Default jitter amplitude in degrees
pub const DEFAULT_JITTER_DEGREES: f64 = 0.001;

/// Random offset applied to intermediate points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Jitter {
    /// No offset; output is fully deterministic
    None,
    /// Offset in `[0, amplitude)` degrees per axis from the thread RNG
    Random {
        /// Maximum offset in degrees
        amplitude: f64,
    },
    /// Offset from an RNG seeded per call, reproducible across runs
    Seeded {
        /// Maximum offset in degrees
        amplitude: f64,
        /// RNG seed
        seed: u64,
    },
}

impl Default for Jitter {
    fn default() -> Self {
        Self::Random {
            amplitude: DEFAULT_JITTER_DEGREES,
        }
    }
}

/// Builds display routes between two points
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RouteInterpolator {
    jitter: Jitter,
}

impl RouteInterpolator {
    /// Create an interpolator with the given jitter
    #[must_use]
    pub const fn new(jitter: Jitter) -> Self {
        Self { jitter }
    }

    /// Interpolator without jitter
    #[must_use]
    pub const fn straight() -> Self {
        Self::new(Jitter::None)
    }

    /// The configured jitter
    #[must_use]
    pub const fn jitter(&self) -> Jitter {
        self.jitter
    }

    /// Points from `start` to `end`, one per entry in [`ROUTE_FRACTIONS`]
    ///
    /// The first point is always `start` and the last always `end`.
    #[must_use]
    pub fn interpolate(&self, start: &GeoLocation, end: &GeoLocation) -> Vec<GeoLocation> {
        match self.jitter {
            Jitter::None => points(start, end, 0.0, &mut rand::rng()),
            Jitter::Random { amplitude } => points(start, end, amplitude, &mut rand::rng()),
            Jitter::Seeded { amplitude, seed } => {
                points(start, end, amplitude, &mut StdRng::seed_from_u64(seed))
            },
        }
    }
}

fn points<R: Rng + ?Sized>(
    start: &GeoLocation,
    end: &GeoLocation,
    amplitude: f64,
    rng: &mut R,
) -> Vec<GeoLocation> {
    let last = ROUTE_FRACTIONS.len() - 1;
    ROUTE_FRACTIONS
        .iter()
        .enumerate()
        .map(|(index, &fraction)| {
            if index == 0 {
                return *start;
            }
            if index == last {
                return *end;
            }
            let point = start.lerp(end, fraction);
            if amplitude > 0.0 {
                point.offset(
                    rng.random_range(0.0..amplitude),
                    rng.random_range(0.0..amplitude),
                )
            } else {
                point
            }
        })
        .collect()
}
