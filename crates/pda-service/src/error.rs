//! # Service Errors
//!
//! One error type for the facade. Each layer keeps its own taxonomy; this
//! enum only wraps them so a caller can still match on the layer and the
//! variant that failed.

use thiserror::Error;

use pda_core::IdError;
use pda_registry::AllocationError;
use pda_spatial::EngineError;

use crate::config::ConfigError;

/// Errors surfaced by [`PostalService`](crate::PostalService).
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Id(#[from] IdError),

    /// A lookup query failed. Validation checks never produce this; they
    /// degrade to unchecked warnings instead.
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ServiceError {
    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Allocation(AllocationError::ConcurrencyConflict { .. })
                | Self::Id(IdError::ConcurrencyConflict { .. })
                | Self::Id(IdError::CounterUnavailable { .. })
                | Self::Engine(EngineError::Unavailable(_))
                | Self::Engine(EngineError::Timeout { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pda_registry::HierarchyLevel;

    #[test]
    fn transient_classification() {
        let conflict: ServiceError = IdError::ConcurrencyConflict {
            key: "zone:x:sequence".into(),
            attempts: 5,
        }
        .into();
        assert!(conflict.is_transient());

        let locked: ServiceError = AllocationError::NodeLocked {
            level: HierarchyLevel::Region,
            code: "1".into(),
        }
        .into();
        assert!(!locked.is_transient());
        assert!(locked.to_string().contains("locked"));

        let checksum: ServiceError = IdError::ChecksumMismatch {
            id: "SL-2310-047-000142-7".into(),
            expected: 2,
            found: 7,
        }
        .into();
        assert!(!checksum.is_transient());
    }
}
