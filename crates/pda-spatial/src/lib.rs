//! # pda-spatial: Spatial Validation
//!
//! Certifies an address point or a zone polygon before it is trusted. Each
//! check yields a [`ValidationResult`] with status `Passed`, `Failed` or
//! `Warning`; a subject is valid when no check failed.
//!
//! ## Point pipeline
//!
//! 1. `CoordinateBounds`: outside the national box fails and stops the run.
//! 2. `LandCheck`: inside any land polygon. No land data is a warning.
//! 3. `ZoneContainment`: inside some zone. A different zone than expected
//!    is a warning.
//! 4. `GeohashConsistency`: the precision-9 cell center lies within the
//!    tolerance of the point.
//!
//! ## Zone geometry pipeline
//!
//! `GeometryValid`, then `ZoneOverlap` (fails, listing the largest
//! overlaps), then `BoundaryCrossing` against ward polygons (warning only).
//!
//! ## Degraded Engine
//!
//! Geometry queries go through the [`GeometryEngine`] trait with a per-call
//! timeout. A failed or timed-out query turns its check into a `Warning`
//! whose details carry `"unchecked": true`, so "rule passed" and "rule not
//! evaluated" stay distinguishable.

pub mod config;
pub mod engine;
#[cfg(feature = "mock")]
pub mod mock;
pub mod result;
pub mod validator;

pub use config::ValidationConfig;
pub use engine::{EngineError, GeometryEngine, NearestZone, WardGeometry, ZoneMatch, ZoneOverlap};
#[cfg(feature = "mock")]
pub use mock::MockGeometryEngine;
pub use result::{Subject, ValidationKind, ValidationReport, ValidationResult, ValidationStatus};
pub use validator::{CoverageGap, SpatialValidator};
