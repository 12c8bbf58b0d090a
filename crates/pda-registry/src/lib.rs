//! # pda-registry: Hierarchy Allocation and PDA-ID Minting
//!
//! The stateful half of the engine. Two operations here must be atomic
//! under concurrent callers:
//!
//! - **Sibling-code assignment** ([`ZoneHierarchy`]): the next region,
//!   district or zone code is `max(existing sibling codes) + 1`, computed and
//!   inserted under the hierarchy write lock. Lock acquisition is bounded and
//!   retried; exhaustion surfaces as [`AllocationError::ConcurrencyConflict`].
//!
//! - **Per-zone sequence increment** ([`AddressIdentifier`]): an atomic
//!   fetch-and-increment through the [`AtomicCounter`] capability, retried
//!   with backoff when the backend reports contention.
//!
//! ## Locking Rule
//!
//! A node becomes locked the moment it gains its first child (a district
//! for a region, a zone for a district, a minted address for a zone). A
//! locked node can never be renamed or deleted again. Locking does not
//! propagate downwards.
//!
//! ## Crate Policy
//!
//! - Node relationships are foreign-key identifiers resolved through
//!   [`ZoneHierarchy`] lookups; nodes never hold references to each other.
//! - Lookups return owned clones; no lock guard escapes this crate.

pub mod counter;
pub mod error;
pub mod hierarchy;
pub mod identifier;
pub mod node;

pub use counter::{AtomicCounter, InMemoryCounter, RetryPolicy};
pub use error::{AllocationError, CounterError};
pub use hierarchy::ZoneHierarchy;
pub use identifier::AddressIdentifier;
pub use node::{
    District, HierarchyLevel, NewDistrict, NewRegion, NewZone, NodeMutation, NodeRef, Region,
    Zone, ZoneLineage,
};
