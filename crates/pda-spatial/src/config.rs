//! Validation tuning knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Thresholds and limits used by [`SpatialValidator`](crate::SpatialValidator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Precision of the geohash consistency check.
    pub geohash_precision: usize,
    /// Largest accepted distance between a point and its cell center.
    pub geohash_tolerance_m: f64,
    /// Overlapping zones listed in a failed overlap check.
    pub max_overlaps_reported: usize,
    /// Budget for each geometry engine round trip.
    pub engine_timeout_ms: u64,
    /// Geohash precision used to deduplicate coverage samples.
    pub gap_precision: usize,
    /// Sampling step of the coverage grid, in degrees.
    pub gap_step_deg: f64,
    /// Coverage gaps reported before sampling stops.
    pub max_gaps: usize,
    /// Default search radius of the nearest-zone lookup.
    pub nearest_zone_radius_m: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            geohash_precision: 9,
            geohash_tolerance_m: 10.0,
            max_overlaps_reported: 5,
            engine_timeout_ms: 2_000,
            gap_precision: 6,
            gap_step_deg: 0.01,
            max_gaps: 50,
            nearest_zone_radius_m: 5_000.0,
        }
    }
}

impl ValidationConfig {
    pub fn engine_timeout(&self) -> Duration {
        Duration::from_millis(self.engine_timeout_ms)
    }
}
