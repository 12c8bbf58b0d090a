//! # Error Types
//!
//! Format-level errors shared across the workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - [`ValidationError`] rejects malformed inputs at construction time
//!   (codes, segments, geohashes, coordinates). Never retried.
//! - [`IdError`] covers the PDA-ID lifecycle: parsing, checksum verification,
//!   sequence exhaustion and counter contention. Only
//!   [`IdError::ConcurrencyConflict`] is the product of an internal retry
//!   loop; every other variant is returned to the immediate caller as-is.

use thiserror::Error;

/// A value failed format validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Primary zone code is not exactly four digits.
    #[error("invalid primary code {0:?}: expected 4 digits")]
    InvalidPrimaryCode(String),

    /// Delivery segment is not exactly three digits.
    #[error("invalid segment {0:?}: expected 3 digits")]
    InvalidSegment(String),

    /// Legacy flat zone code is not `XXXX-YYY`.
    #[error("invalid legacy zone code {0:?}: expected XXXX-YYY")]
    InvalidLegacyZoneCode(String),

    /// A hierarchy code component is outside its namespace.
    #[error("{level} code {value} outside {min}..={max}")]
    CodeOutOfRange {
        /// Hierarchy level ("region", "district", "zone").
        level: &'static str,
        /// The offending value.
        value: u32,
        /// Lowest permitted value.
        min: u32,
        /// Highest permitted value.
        max: u32,
    },

    /// Geohash contains a symbol outside the base-32 alphabet, or has a bad length.
    #[error("invalid geohash {0:?}")]
    InvalidGeohash(String),

    /// Requested geohash precision is outside 1..=12.
    #[error("geohash precision {0} outside 1..=12")]
    InvalidPrecision(usize),

    /// Latitude or longitude outside the WGS84 range (or not finite).
    #[error("coordinate ({lat}, {lon}) is outside the valid latitude/longitude range")]
    InvalidCoordinate {
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lon: f64,
    },

    /// Bounding box corners are inverted.
    #[error("bounding box min ({min_lat}, {min_lon}) exceeds max ({max_lat}, {max_lon})")]
    InvalidBoundingBox {
        /// South edge.
        min_lat: f64,
        /// West edge.
        min_lon: f64,
        /// North edge.
        max_lat: f64,
        /// East edge.
        max_lon: f64,
    },

    /// Input to the checksum codec contains a non-digit character.
    #[error("digit string {0:?} contains non-digit characters")]
    NonDigit(String),

    /// Opaque identifier was empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// Timestamp could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Errors in minting, parsing and verifying PDA-IDs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdError {
    /// Text does not match `SL-XXXX-YYY-NNNNNN-C`.
    #[error("invalid PDA-ID format: {0:?}")]
    InvalidFormat(String),

    /// Structure is correct but the check digit does not match the payload.
    #[error("PDA-ID {id} carries check digit {found}, expected {expected}")]
    ChecksumMismatch {
        /// The text as supplied.
        id: String,
        /// Check digit recomputed from the payload.
        expected: u8,
        /// Check digit found in the text.
        found: u8,
    },

    /// Sequence number outside 1..=999999.
    #[error("sequence {sequence} outside 1..={max}")]
    SequenceOutOfRange {
        /// The requested sequence.
        sequence: u64,
        /// Highest permitted sequence.
        max: u32,
    },

    /// The zone's sequence space is exhausted; operator intervention required.
    #[error("zone {zone} has exhausted its sequence space ({max} addresses)")]
    ZoneCapacityExceeded {
        /// Primary code of the exhausted zone.
        zone: String,
        /// Highest permitted sequence.
        max: u32,
    },

    /// No zone with the given identifier exists.
    #[error("zone not found: {0}")]
    ZoneNotFound(String),

    /// The sequence counter stayed contended after every retry.
    #[error("sequence counter {key} still contended after {attempts} attempts")]
    ConcurrencyConflict {
        /// Counter key.
        key: String,
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// The counter backend could not be reached.
    #[error("sequence counter {key} unavailable: {reason}")]
    CounterUnavailable {
        /// Counter key.
        key: String,
        /// Backend-reported reason.
        reason: String,
    },

    /// A component failed format validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
