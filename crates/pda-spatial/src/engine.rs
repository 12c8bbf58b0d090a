//! # Geometry Engine Boundary
//!
//! The spatial database (PostGIS or similar) is external. The validator
//! talks to it only through [`GeometryEngine`], so a real backend and the
//! in-crate mock are interchangeable.
//!
//! Geometries are referenced by opaque [`GeometryId`]s. Zones are
//! identified by their primary code.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pda_core::{BoundingBox, GeoPoint, GeometryId, PrimaryCode};

/// Failure of a geometry engine round trip.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The engine could not be reached.
    #[error("geometry engine unavailable: {0}")]
    Unavailable(String),

    /// The engine did not answer in time.
    #[error("geometry engine timed out after {after_ms} ms during {operation}")]
    Timeout {
        /// Query that timed out.
        operation: &'static str,
        /// Budget that was exceeded.
        after_ms: u64,
    },

    /// The engine rejected or failed the query.
    #[error("geometry query {operation} failed: {reason}")]
    Query {
        /// Query that failed.
        operation: &'static str,
        /// Engine-reported reason.
        reason: String,
    },
}

/// A zone found by a spatial query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneMatch {
    pub zone_code: PrimaryCode,
    pub zone_name: Option<String>,
    pub district_name: Option<String>,
}

/// Nearest zone to a point and its distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestZone {
    #[serde(flatten)]
    pub zone: ZoneMatch,
    pub distance_m: f64,
}

/// An existing zone overlapping a candidate geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneOverlap {
    pub zone_code: PrimaryCode,
    pub zone_name: Option<String>,
    /// Shared area in square metres.
    pub overlap_sq_m: f64,
}

/// An administrative ward polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardGeometry {
    pub ward_id: String,
    pub ward_name: Option<String>,
    pub geometry: GeometryId,
}

/// Spatial queries the validator depends on.
///
/// Implementations must be safe to call concurrently. Calls may block on
/// I/O; callers never hold allocator locks across them.
#[async_trait]
pub trait GeometryEngine: Send + Sync {
    /// Land polygons loaded in the engine. Empty when no land data exists.
    async fn land_geometries(&self) -> Result<Vec<GeometryId>, EngineError>;

    /// Whether `geometry` contains `point`.
    async fn contains_point(
        &self,
        geometry: &GeometryId,
        point: &GeoPoint,
    ) -> Result<bool, EngineError>;

    /// The zone whose polygon contains `point`, if any.
    async fn zone_at(&self, point: &GeoPoint) -> Result<Option<ZoneMatch>, EngineError>;

    /// The zone polygon closest to `point`, regardless of distance.
    async fn nearest_zone(&self, point: &GeoPoint) -> Result<Option<NearestZone>, EngineError>;

    /// Whether `geometry` is a well-formed polygon.
    async fn is_valid_geometry(&self, geometry: &GeometryId) -> Result<bool, EngineError>;

    /// Zones whose polygons overlap `geometry`, skipping `exclude`. Order is
    /// unspecified.
    async fn overlapping_zones(
        &self,
        geometry: &GeometryId,
        exclude: Option<&PrimaryCode>,
    ) -> Result<Vec<ZoneOverlap>, EngineError>;

    /// Ward polygons loaded in the engine.
    async fn ward_geometries(&self) -> Result<Vec<WardGeometry>, EngineError>;

    /// Whether `geometry` crosses the ward boundary `ward`.
    async fn crosses(&self, ward: &GeometryId, geometry: &GeometryId) -> Result<bool, EngineError>;

    /// Bounding box of all zone polygons, or of one district's zones.
    async fn zone_extent(&self, district: Option<&str>) -> Result<Option<BoundingBox>, EngineError>;

    /// Number of zone polygons intersecting `point`.
    async fn zones_intersecting(&self, point: &GeoPoint) -> Result<usize, EngineError>;
}
