//! # Address Identifier
//!
//! Mints PDA-IDs against zones. The next sequence number comes from an
//! [`AtomicCounter`] keyed per zone, so two concurrent mints in the same
//! zone can never receive the same number, and a number once issued is
//! never issued again, even if the address it named is later deleted.

use pda_core::{IdError, PdaId, MAX_SEQUENCE};

use crate::counter::{AtomicCounter, RetryPolicy};
use crate::error::CounterError;
use crate::node::Zone;

/// PDA-ID minting service.
#[derive(Debug)]
pub struct AddressIdentifier<C> {
    counter: C,
    retry: RetryPolicy,
}

impl<C: AtomicCounter> AddressIdentifier<C> {
    pub fn new(counter: C, retry: RetryPolicy) -> Self {
        Self { counter, retry }
    }

    /// The backing counter.
    pub fn counter(&self) -> &C {
        &self.counter
    }

    /// Build the PDA-ID for an explicit sequence number in a zone.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::SequenceOutOfRange`] unless `1 <= sequence <= 999999`.
    pub fn generate(zone: &Zone, sequence: u32) -> Result<PdaId, IdError> {
        PdaId::generate(&zone.primary_code, &zone.segment, sequence)
    }

    /// Mint the next PDA-ID in a zone.
    ///
    /// Contended increments are retried with exponential backoff.
    ///
    /// # Errors
    ///
    /// - [`IdError::ConcurrencyConflict`] if every attempt was contended.
    /// - [`IdError::CounterUnavailable`] if the backend failed.
    /// - [`IdError::ZoneCapacityExceeded`] once the zone passes 999999.
    pub fn generate_next(&self, zone: &Zone) -> Result<PdaId, IdError> {
        let key = zone.counter_key();
        let next = self.increment_with_retry(&key)?;
        let sequence = u32::try_from(next)
            .ok()
            .filter(|s| *s <= MAX_SEQUENCE)
            .ok_or_else(|| IdError::ZoneCapacityExceeded {
                zone: zone.primary_code.to_string(),
                max: MAX_SEQUENCE,
            })?;
        let id = Self::generate(zone, sequence)?;
        tracing::debug!(pda_id = %id, "address identifier minted");
        Ok(id)
    }

    fn increment_with_retry(&self, key: &str) -> Result<u64, IdError> {
        let attempts = self.retry.max_attempts;
        for attempt in 1..=attempts {
            match self.counter.atomic_increment(key) {
                Ok(value) => return Ok(value),
                Err(CounterError::Contended { .. }) => {
                    tracing::debug!(key, attempt, "sequence counter contended");
                    if attempt < attempts {
                        std::thread::sleep(self.retry.backoff(attempt));
                    }
                }
                Err(CounterError::Unavailable(reason)) => {
                    return Err(IdError::CounterUnavailable {
                        key: key.to_string(),
                        reason,
                    });
                }
            }
        }
        tracing::warn!(key, attempts, "sequence counter still contended, giving up");
        Err(IdError::ConcurrencyConflict {
            key: key.to_string(),
            attempts,
        })
    }

    /// Parse and verify a PDA-ID string.
    pub fn parse(text: &str) -> Result<PdaId, IdError> {
        PdaId::parse(text)
    }

    /// Whether `text` is a well-formed PDA-ID with a correct check digit.
    pub fn validate_format(text: &str) -> bool {
        PdaId::validate_format(text)
    }
}
