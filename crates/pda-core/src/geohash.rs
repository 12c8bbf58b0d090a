//! # Geohash Codec
//!
//! Bit-interleaved base-32 geohashes. Encoding alternates longitude and
//! latitude bisection (longitude first) over the half-open ranges
//! `[-180, 180)` and `[-90, 90)`, emitting one bit per step and one symbol
//! per five bits. Each additional symbol subdivides its parent cell, so a
//! prefix always names a cell that contains the longer hash's cell.
//!
//! Approximate cell sizes at the equator:
//!
//! ```text
//! precision  1       2        3      4     5    6      7     8    9
//! cell       5000km  1250km   156km  39km  5km  1.2km  150m  38m  5m
//! ```

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::coordinate::{BoundingBox, GeoPoint};
use crate::error::ValidationError;

/// The geohash alphabet: digits and lowercase letters without `a`, `i`, `l`, `o`.
pub const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Longest supported geohash.
pub const MAX_PRECISION: usize = 12;

/// Precision used for address-level hashes (~5m cells).
pub const ADDRESS_PRECISION: usize = 9;

/// Approximate cell size per precision, in meters.
const CELL_SIZES_M: [(usize, f64); 9] = [
    (1, 5_000_000.0),
    (2, 1_250_000.0),
    (3, 156_000.0),
    (4, 39_000.0),
    (5, 5_000.0),
    (6, 1_200.0),
    (7, 150.0),
    (8, 38.0),
    (9, 5.0),
];

/// Upper bound on cells visited by [`geohashes_in_radius`].
const RADIUS_CELL_BUDGET: usize = 4_096;

/// A validated geohash string (lowercase, 1..=12 symbols).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GeoHash(String);

impl_validating_deserialize!(GeoHash, GeoHash::new);

impl GeoHash {
    /// Validate and normalize a geohash string. Uppercase input is accepted
    /// and stored lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidGeohash`] for an empty string, a
    /// string longer than 12 symbols, or any symbol outside [`BASE32`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let normalized = raw.to_ascii_lowercase();
        if normalized.is_empty()
            || normalized.len() > MAX_PRECISION
            || !normalized.bytes().all(|b| symbol_value(b).is_some())
        {
            return Err(ValidationError::InvalidGeohash(raw));
        }
        Ok(Self(normalized))
    }

    /// Access the geohash string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of symbols.
    pub fn precision(&self) -> usize {
        self.0.len()
    }

    /// Whether this cell contains `other`'s cell (prefix relation).
    pub fn contains(&self, other: &GeoHash) -> bool {
        other.0.starts_with(&self.0)
    }

    /// The enclosing cell one precision level up, if any.
    pub fn parent(&self) -> Option<GeoHash> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_string()))
    }

    /// Bounding box of this cell.
    pub fn bounds(&self) -> BoundingBox {
        decode(self)
    }

    /// Center of this cell.
    pub fn center(&self) -> GeoPoint {
        decode_center(self)
    }
}

impl std::fmt::Display for GeoHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for GeoHash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

fn symbol_value(symbol: u8) -> Option<u8> {
    BASE32.iter().position(|&c| c == symbol).map(|i| i as u8)
}

/// Encode a coordinate at the given precision.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidCoordinate`] for out-of-range
/// coordinates and [`ValidationError::InvalidPrecision`] for a precision
/// outside 1..=12.
pub fn encode(lat: f64, lon: f64, precision: usize) -> Result<GeoHash, ValidationError> {
    let point = GeoPoint::new(lat, lon)?;
    if !(1..=MAX_PRECISION).contains(&precision) {
        return Err(ValidationError::InvalidPrecision(precision));
    }

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut out = String::with_capacity(precision);
    let mut bits: usize = 0;
    let mut bit_count = 0;
    let mut is_lon = true;

    while out.len() < precision {
        let (value, range) = if is_lon {
            (point.lon, &mut lon_range)
        } else {
            (point.lat, &mut lat_range)
        };
        let mid = (range.0 + range.1) / 2.0;
        if value >= mid {
            bits = (bits << 1) | 1;
            range.0 = mid;
        } else {
            bits <<= 1;
            range.1 = mid;
        }
        is_lon = !is_lon;
        bit_count += 1;

        if bit_count == 5 {
            out.push(BASE32[bits] as char);
            bits = 0;
            bit_count = 0;
        }
    }

    Ok(GeoHash(out))
}

/// Encode a [`GeoPoint`] at the given precision.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPrecision`] for a precision outside 1..=12.
pub fn encode_point(point: &GeoPoint, precision: usize) -> Result<GeoHash, ValidationError> {
    encode(point.lat, point.lon, precision)
}

/// Reconstruct the bounding box of a geohash cell.
pub fn decode(hash: &GeoHash) -> BoundingBox {
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut is_lon = true;

    for symbol in hash.0.bytes() {
        // Validated at construction.
        let value = symbol_value(symbol).unwrap_or(0);
        for shift in (0..5).rev() {
            let bit = (value >> shift) & 1;
            let range = if is_lon {
                &mut lon_range
            } else {
                &mut lat_range
            };
            let mid = (range.0 + range.1) / 2.0;
            if bit == 1 {
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            is_lon = !is_lon;
        }
    }

    BoundingBox {
        min_lat: lat_range.0,
        min_lon: lon_range.0,
        max_lat: lat_range.1,
        max_lon: lon_range.1,
    }
}

/// Center point of a geohash cell.
pub fn decode_center(hash: &GeoHash) -> GeoPoint {
    decode(hash).center()
}

/// The eight cells surrounding a geohash, at the same precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighbors {
    pub n: GeoHash,
    pub ne: GeoHash,
    pub e: GeoHash,
    pub se: GeoHash,
    pub s: GeoHash,
    pub sw: GeoHash,
    pub w: GeoHash,
    pub nw: GeoHash,
}

impl Neighbors {
    /// All eight neighbors in compass order, starting north, clockwise.
    pub fn to_vec(&self) -> Vec<GeoHash> {
        vec![
            self.n.clone(),
            self.ne.clone(),
            self.e.clone(),
            self.se.clone(),
            self.s.clone(),
            self.sw.clone(),
            self.w.clone(),
            self.nw.clone(),
        ]
    }
}

/// Compute the eight neighbors of a cell by offsetting its center by one cell
/// width/height and re-encoding at the same precision.
///
/// Longitude wraps across the antimeridian; latitude clamps at the poles, so
/// a polar cell's northern (or southern) neighbors may equal itself.
pub fn neighbors(hash: &GeoHash) -> Neighbors {
    let cell = decode(hash);
    let center = cell.center();
    let precision = hash.precision();
    let dlat = cell.height();
    let dlon = cell.width();

    let at = |lat_steps: f64, lon_steps: f64| -> GeoHash {
        let lat = (center.lat + lat_steps * dlat).clamp(-90.0, 90.0);
        let lon = wrap_longitude(center.lon + lon_steps * dlon);
        // Both coordinates are in range after clamp/wrap and precision came
        // from a valid hash, so encoding cannot fail.
        encode(lat, lon, precision).unwrap_or_else(|_| hash.clone())
    };

    Neighbors {
        n: at(1.0, 0.0),
        ne: at(1.0, 1.0),
        e: at(0.0, 1.0),
        se: at(-1.0, 1.0),
        s: at(-1.0, 0.0),
        sw: at(-1.0, -1.0),
        w: at(0.0, -1.0),
        nw: at(1.0, -1.0),
    }
}

fn wrap_longitude(lon: f64) -> f64 {
    if lon >= 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// The cell itself plus its eight neighbors, deduplicated, self first.
pub fn expand(hash: &GeoHash) -> Vec<GeoHash> {
    let mut out = vec![hash.clone()];
    for neighbor in neighbors(hash).to_vec() {
        if !out.contains(&neighbor) {
            out.push(neighbor);
        }
    }
    out
}

/// The smallest precision whose approximate cell size is at most
/// `distance_m`. Distances below the finest tabulated size map to 9.
pub fn precision_for_distance(distance_m: f64) -> usize {
    CELL_SIZES_M
        .iter()
        .find(|(_, size)| *size <= distance_m)
        .map(|(precision, _)| *precision)
        .unwrap_or(ADDRESS_PRECISION)
}

/// Cells whose centers lie within 1.5× `radius_m` of `center`, found by
/// breadth-first expansion over neighbors from the center's own cell.
///
/// The center cell is always included. The search stops after a fixed
/// budget of cells so that tiny precisions over huge radii stay bounded.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPrecision`] if an explicit precision is
/// outside 1..=12.
pub fn geohashes_in_radius(
    center: &GeoPoint,
    radius_m: f64,
    precision: Option<usize>,
) -> Result<Vec<GeoHash>, ValidationError> {
    let precision = precision.unwrap_or_else(|| precision_for_distance(radius_m));
    let start = encode_point(center, precision)?;
    let limit = radius_m.max(0.0) * 1.5;

    let mut result = vec![start.clone()];
    let mut seen: HashSet<GeoHash> = HashSet::from([start.clone()]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        if seen.len() >= RADIUS_CELL_BUDGET {
            break;
        }
        for neighbor in neighbors(&current).to_vec() {
            if !seen.insert(neighbor.clone()) {
                continue;
            }
            if center.distance_to(&decode_center(&neighbor)) <= limit {
                result.push(neighbor.clone());
                queue.push_back(neighbor);
            }
        }
    }

    Ok(result)
}
