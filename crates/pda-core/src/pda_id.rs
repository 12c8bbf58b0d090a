//! # PDA-ID: Permanent Digital Address Identifier
//!
//! Canonical text form: `SL-XXXX-YYY-NNNNNN-C`
//!
//! - `SL`: country prefix
//! - `XXXX`: primary zone code (region ‖ district ‖ zone)
//! - `YYY`: delivery segment
//! - `NNNNNN`: sequence within the zone, 000001-999999
//! - `C`: Luhn check digit over `XXXXYYYNNNNNN`
//!
//! A PDA-ID is immutable. It is minted once per (zone, sequence) pair and
//! never reissued, even after the address it named is deleted; minting is the
//! job of the registry, which owns the sequence counters. This module only
//! builds, formats and verifies the value.

use serde::Serialize;

use crate::checksum;
use crate::error::IdError;
use crate::identity::{LegacyZoneCode, PrimaryCode, Segment};

/// Country prefix of every PDA-ID.
pub const COUNTRY_PREFIX: &str = "SL";

/// Highest sequence number a zone can issue.
pub const MAX_SEQUENCE: u32 = 999_999;

/// A verified PDA-ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PdaId {
    primary_code: PrimaryCode,
    segment: Segment,
    sequence: u32,
    check_digit: u8,
}

impl_validating_deserialize!(PdaId, PdaId::parse);

impl PdaId {
    /// Build the PDA-ID for a zone code, segment and sequence number,
    /// computing its check digit.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::SequenceOutOfRange`] unless `1 <= sequence <= 999999`.
    pub fn generate(
        primary_code: &PrimaryCode,
        segment: &Segment,
        sequence: u32,
    ) -> Result<Self, IdError> {
        if !(1..=MAX_SEQUENCE).contains(&sequence) {
            return Err(IdError::SequenceOutOfRange {
                sequence: u64::from(sequence),
                max: MAX_SEQUENCE,
            });
        }
        let payload = format!("{}{}{:06}", primary_code, segment, sequence);
        let check_digit = checksum::compute_check_digit(&payload)?;
        Ok(Self {
            primary_code: primary_code.clone(),
            segment: segment.clone(),
            sequence,
            check_digit,
        })
    }

    /// Parse and verify the canonical text form.
    ///
    /// # Errors
    ///
    /// - [`IdError::InvalidFormat`] if the text is not `SL-dddd-ddd-dddddd-d`
    ///   or the sequence field is `000000`.
    /// - [`IdError::ChecksumMismatch`] if the check digit does not match.
    pub fn parse(text: &str) -> Result<Self, IdError> {
        let invalid = || IdError::InvalidFormat(text.to_string());

        let parts: Vec<&str> = text.split('-').collect();
        if parts.len() != 5 || parts[0] != COUNTRY_PREFIX {
            return Err(invalid());
        }
        let digits_of_len =
            |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
        if !digits_of_len(parts[1], 4)
            || !digits_of_len(parts[2], 3)
            || !digits_of_len(parts[3], 6)
            || !digits_of_len(parts[4], 1)
        {
            return Err(invalid());
        }

        let primary_code = PrimaryCode::new(parts[1]).map_err(|_| invalid())?;
        let segment = Segment::new(parts[2]).map_err(|_| invalid())?;
        let sequence: u32 = parts[3].parse().map_err(|_| invalid())?;
        if sequence == 0 {
            return Err(invalid());
        }
        let found = parts[4].as_bytes()[0] - b'0';

        let id = Self::generate(&primary_code, &segment, sequence)?;
        if id.check_digit != found {
            return Err(IdError::ChecksumMismatch {
                id: text.to_string(),
                expected: id.check_digit,
                found,
            });
        }
        Ok(id)
    }

    /// Whether `text` is a well-formed PDA-ID with a correct check digit.
    pub fn validate_format(text: &str) -> bool {
        Self::parse(text).is_ok()
    }

    /// Country prefix (always `SL`).
    pub fn country(&self) -> &'static str {
        COUNTRY_PREFIX
    }

    /// Primary zone code.
    pub fn primary_code(&self) -> &PrimaryCode {
        &self.primary_code
    }

    /// Delivery segment.
    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    /// Sequence number within the zone.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Luhn check digit.
    pub fn check_digit(&self) -> u8 {
        self.check_digit
    }

    /// The 13-digit numeric payload the check digit protects.
    pub fn payload(&self) -> String {
        format!("{}{}{:06}", self.primary_code, self.segment, self.sequence)
    }

    /// Legacy flat zone code (`XXXX-YYY`) of the owning zone.
    pub fn zone_code(&self) -> LegacyZoneCode {
        LegacyZoneCode::new(self.primary_code.clone(), self.segment.clone())
    }
}

impl std::fmt::Display for PdaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}-{:06}-{}",
            COUNTRY_PREFIX, self.primary_code, self.segment, self.sequence, self.check_digit
        )
    }
}

impl std::str::FromStr for PdaId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PdaId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// parse(generate(..)) returns the same components.
        #[test]
        fn generate_parse_roundtrip(
            primary in "[0-9]{4}",
            segment in "[0-9]{3}",
            sequence in 1u32..=MAX_SEQUENCE,
        ) {
            let id = PdaId::generate(
                &PrimaryCode::new(primary.as_str()).unwrap(),
                &Segment::new(segment.as_str()).unwrap(),
                sequence,
            ).unwrap();
            let text = id.to_string();
            let parsed = PdaId::parse(&text).unwrap();
            prop_assert_eq!(parsed.primary_code().as_str(), primary.as_str());
            prop_assert_eq!(parsed.sequence(), sequence);
            let full = format!("{}{}", id.payload(), id.check_digit());
            prop_assert!(checksum::validate(&full));
        }

        /// Changing any one payload digit makes the text fail verification.
        #[test]
        fn single_payload_digit_change_rejected(
            primary in "[0-9]{4}",
            sequence in 1u32..=MAX_SEQUENCE,
            position in 0usize..13,
            delta in 1u8..10,
        ) {
            let id = PdaId::generate(
                &PrimaryCode::new(primary.as_str()).unwrap(),
                &Segment::new("047").unwrap(),
                sequence,
            ).unwrap();
            let mut payload = id.payload().into_bytes();
            payload[position] = b'0' + (payload[position] - b'0' + delta) % 10;
            let payload = String::from_utf8(payload).unwrap();
            let full = format!("{}{}", payload, id.check_digit());
            prop_assert!(!checksum::validate(&full));
        }
    }
}
