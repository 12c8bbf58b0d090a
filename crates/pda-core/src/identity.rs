//! # Identity Newtypes
//!
//! Identifiers for the Region → District → Zone hierarchy and the codes
//! derived from it. Each identifier is a distinct type: a [`DistrictId`]
//! cannot be passed where a [`ZoneId`] is expected.
//!
//! ## Validation
//!
//! String codes ([`PrimaryCode`], [`Segment`], [`LegacyZoneCode`],
//! [`GeometryId`]) validate at construction and on deserialization.
//! UUID-based node identifiers are always valid by construction.
//!
//! ## Code Layout
//!
//! ```text
//! primary code   R D ZZ        region 1-9, district 0-9, zone 00-99
//! segment        YYY           delivery segment 000-999
//! legacy code    RDZZ-YYY      computed view, never stored
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// UUID-based node identifiers (always valid by construction)
// ---------------------------------------------------------------------------

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Identifier of a region node.
    RegionId
);
uuid_identifier!(
    /// Identifier of a district node.
    DistrictId
);
uuid_identifier!(
    /// Identifier of a zone node.
    ZoneId
);

/// Opaque reference to a geometry owned by the external geometry engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GeometryId(String);

impl_validating_deserialize!(GeometryId, GeometryId::new);

impl GeometryId {
    /// Wrap an engine geometry reference.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Empty`] for an empty or blank reference.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(ValidationError::Empty("geometry id"));
        }
        Ok(Self(s))
    }

    /// Access the reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GeometryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Hierarchy codes
// ---------------------------------------------------------------------------

fn all_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// Four-digit primary zone code: region ‖ district ‖ two-digit zone number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PrimaryCode(String);

impl_validating_deserialize!(PrimaryCode, PrimaryCode::new);

impl PrimaryCode {
    /// Validate a primary code string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPrimaryCode`] unless the value is
    /// exactly four ASCII digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !all_digits(&s, 4) {
            return Err(ValidationError::InvalidPrimaryCode(s));
        }
        Ok(Self(s))
    }

    /// Compose a primary code from its hierarchy components.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::CodeOutOfRange`] if region is not 1-9,
    /// district not 0-9, or zone not 0-99.
    pub fn from_parts(region: u8, district: u8, zone: u8) -> Result<Self, ValidationError> {
        check_range("region", region, 1, 9)?;
        check_range("district", district, 0, 9)?;
        check_range("zone", zone, 0, 99)?;
        Ok(Self(format!("{region}{district}{zone:02}")))
    }

    /// Access the four-digit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The region digit.
    pub fn region_code(&self) -> u8 {
        self.0.as_bytes()[0] - b'0'
    }

    /// The district digit within its region.
    pub fn district_code(&self) -> u8 {
        self.0.as_bytes()[1] - b'0'
    }

    /// The two-digit zone number within its district.
    pub fn zone_number(&self) -> u8 {
        let b = self.0.as_bytes();
        (b[2] - b'0') * 10 + (b[3] - b'0')
    }
}

fn check_range(level: &'static str, value: u8, min: u8, max: u8) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::CodeOutOfRange {
            level,
            value: u32::from(value),
            min: u32::from(min),
            max: u32::from(max),
        });
    }
    Ok(())
}

impl std::fmt::Display for PrimaryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Three-digit delivery segment within a zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Segment(String);

impl_validating_deserialize!(Segment, Segment::new);

impl Segment {
    /// Validate a segment string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSegment`] unless the value is exactly
    /// three ASCII digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !all_digits(&s, 3) {
            return Err(ValidationError::InvalidSegment(s));
        }
        Ok(Self(s))
    }

    /// Build a segment from its number, zero-padded.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSegment`] for numbers above 999.
    pub fn from_number(number: u16) -> Result<Self, ValidationError> {
        if number > 999 {
            return Err(ValidationError::InvalidSegment(number.to_string()));
        }
        Ok(Self(format!("{number:03}")))
    }

    /// Access the three-digit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the segment.
    pub fn number(&self) -> u16 {
        self.0
            .bytes()
            .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'))
    }

    /// Usage class implied by the segment's numeric range.
    pub fn segment_type(&self) -> SegmentType {
        SegmentType::for_number(self.number())
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Usage class of a delivery segment, fixed by numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    /// 000: not yet assigned to a class.
    Unassigned,
    /// 001-499.
    Residential,
    /// 500-699.
    Commercial,
    /// 700-849.
    Industrial,
    /// 850-899.
    Government,
    /// 900-949.
    Reserved,
    /// 950-999.
    Special,
}

impl SegmentType {
    /// Classify a segment number.
    pub fn for_number(number: u16) -> Self {
        match number {
            0 => Self::Unassigned,
            1..=499 => Self::Residential,
            500..=699 => Self::Commercial,
            700..=849 => Self::Industrial,
            850..=899 => Self::Government,
            900..=949 => Self::Reserved,
            _ => Self::Special,
        }
    }

    /// Inclusive numeric range of this class.
    pub fn range(&self) -> (u16, u16) {
        match self {
            Self::Unassigned => (0, 0),
            Self::Residential => (1, 499),
            Self::Commercial => (500, 699),
            Self::Industrial => (700, 849),
            Self::Government => (850, 899),
            Self::Reserved => (900, 949),
            Self::Special => (950, 999),
        }
    }
}

impl std::fmt::Display for SegmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unassigned => "unassigned",
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Industrial => "industrial",
            Self::Government => "government",
            Self::Reserved => "reserved",
            Self::Special => "special",
        };
        f.write_str(s)
    }
}

/// The legacy flat zone code `XXXX-YYY`, derived from a primary code and a
/// segment. Exists for compatibility with consumers of the flat scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LegacyZoneCode {
    /// Primary zone code.
    pub primary_code: PrimaryCode,
    /// Delivery segment.
    pub segment: Segment,
}

impl LegacyZoneCode {
    /// Combine a primary code and segment.
    pub fn new(primary_code: PrimaryCode, segment: Segment) -> Self {
        Self {
            primary_code,
            segment,
        }
    }

    /// Parse `XXXX-YYY`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidLegacyZoneCode`] for any other shape.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidLegacyZoneCode(s.to_string());
        let (primary, segment) = s.split_once('-').ok_or_else(invalid)?;
        Ok(Self {
            primary_code: PrimaryCode::new(primary).map_err(|_| invalid())?,
            segment: Segment::new(segment).map_err(|_| invalid())?,
        })
    }
}

impl std::fmt::Display for LegacyZoneCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.primary_code, self.segment)
    }
}

impl Serialize for LegacyZoneCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl_validating_deserialize!(LegacyZoneCode, LegacyZoneCode::parse);
