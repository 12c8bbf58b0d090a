//! # pda-core: Foundational Types for the PDA Engine
//!
//! Leaf crate of the workspace. Defines the value types that every other
//! crate speaks in, plus the two pure codecs the rest of the engine is built
//! on:
//!
//! - [`checksum`]: Luhn mod-10 check digits over decimal strings.
//! - [`geohash`]: bit-interleaved base-32 geohash encode/decode, neighbors,
//!   precision selection and radius coverings.
//!
//! ## Key Design Principles
//!
//! 1. **Validated newtypes.** [`PrimaryCode`], [`Segment`], [`GeoHash`] and
//!    [`PdaId`] can only be constructed through checking constructors, and
//!    deserialization routes through the same constructors.
//!
//! 2. **Hierarchy is canonical.** The legacy flat zone code (`XXXX-YYY`) is a
//!    computed view ([`LegacyZoneCode`]), never stored independently.
//!
//! 3. **Typed errors.** Format problems surface as [`ValidationError`] or
//!    [`IdError`]; nothing in this crate retries or logs.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pda-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

/// Implement `Deserialize` for a string newtype by routing the raw string
/// through a validating constructor, so invalid values are rejected at
/// deserialization time.
macro_rules! impl_validating_deserialize {
    ($ty:ident, $ctor:path) => {
        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                $ctor(raw.as_str()).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub mod checksum;
pub mod coordinate;
pub mod error;
pub mod geohash;
pub mod identity;
pub mod pda_id;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use coordinate::{distance_meters, BoundingBox, GeoPoint, EARTH_RADIUS_M};
pub use error::{IdError, ValidationError};
pub use geohash::{GeoHash, Neighbors};
pub use identity::{
    DistrictId, GeometryId, LegacyZoneCode, PrimaryCode, RegionId, Segment, SegmentType, ZoneId,
};
pub use pda_id::{PdaId, COUNTRY_PREFIX, MAX_SEQUENCE};
pub use temporal::Timestamp;
