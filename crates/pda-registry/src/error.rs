//! # Registry Errors

use thiserror::Error;

use crate::node::HierarchyLevel;

/// Errors from hierarchy allocation and node mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// The level's code namespace under this parent is exhausted.
    #[error("{level} capacity exceeded under {parent}: at most {limit} allowed")]
    CapacityExceeded {
        /// Level being allocated.
        level: HierarchyLevel,
        /// Parent description ("root" for regions).
        parent: String,
        /// Size of the namespace.
        limit: u32,
    },

    /// A unique attribute is already taken.
    #[error("{level} with {field} {value:?} already exists")]
    Conflict {
        /// Level being allocated.
        level: HierarchyLevel,
        /// Name of the conflicting attribute.
        field: &'static str,
        /// The conflicting value.
        value: String,
    },

    /// The node has children and can no longer be renamed or deleted.
    #[error("{level} {code} is locked (has children) and cannot be modified")]
    NodeLocked {
        /// Level of the locked node.
        level: HierarchyLevel,
        /// Code of the locked node.
        code: String,
    },

    /// No node with the given identifier exists.
    #[error("{level} not found: {id}")]
    NotFound {
        /// Level looked up.
        level: HierarchyLevel,
        /// Identifier looked up.
        id: String,
    },

    /// A request field was empty or malformed.
    #[error("invalid {level} request: {reason}")]
    InvalidRequest {
        /// Level being allocated or modified.
        level: HierarchyLevel,
        /// What was wrong.
        reason: String,
    },

    /// The hierarchy lock stayed contended after every retry.
    #[error("allocation under {parent} still contended after {attempts} attempts")]
    ConcurrencyConflict {
        /// Parent whose children were being allocated.
        parent: String,
        /// Attempts made before giving up.
        attempts: u32,
    },
}

/// Errors reported by an [`AtomicCounter`](crate::AtomicCounter) backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CounterError {
    /// A concurrent update won the race; the caller may retry.
    #[error("counter {key} contended")]
    Contended {
        /// Counter key.
        key: String,
    },

    /// The backend could not be reached. Not retried.
    #[error("counter backend unavailable: {0}")]
    Unavailable(String),
}
