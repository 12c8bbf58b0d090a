//! # Mock Geometry Engine
//!
//! Rectangle-based [`GeometryEngine`] for tests, demos and offline runs.
//! Every geometry is an axis-aligned [`BoundingBox`]; containment,
//! overlap and crossing are evaluated on the rectangles.
//!
//! Failures and latency can be injected to exercise the degraded paths of
//! the validator.
//!
//! ## Notice
//!
//! Rectangles are not polygons. Distances and areas are approximate. Do not
//! use this engine to certify real address data.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use pda_core::{BoundingBox, GeoPoint, GeometryId, PrimaryCode};

use crate::engine::{EngineError, GeometryEngine, NearestZone, WardGeometry, ZoneMatch, ZoneOverlap};

#[derive(Debug, Clone)]
struct Shape {
    bounds: BoundingBox,
    valid: bool,
}

#[derive(Debug, Clone)]
struct MockZone {
    code: PrimaryCode,
    name: Option<String>,
    district: Option<String>,
    geometry: GeometryId,
}

impl MockZone {
    fn to_match(&self) -> ZoneMatch {
        ZoneMatch {
            zone_code: self.code.clone(),
            zone_name: self.name.clone(),
            district_name: self.district.clone(),
        }
    }
}

/// In-memory rectangle geometry engine.
#[derive(Debug, Clone, Default)]
pub struct MockGeometryEngine {
    shapes: BTreeMap<GeometryId, Shape>,
    land: Vec<GeometryId>,
    zones: Vec<MockZone>,
    wards: Vec<WardGeometry>,
    failure: Option<EngineError>,
    latency: Option<Duration>,
}

impl MockGeometryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_shape(
        &mut self,
        raw: String,
        bounds: BoundingBox,
        valid: bool,
    ) -> Option<GeometryId> {
        let id = GeometryId::new(raw).ok()?;
        self.shapes.insert(id.clone(), Shape { bounds, valid });
        Some(id)
    }

    /// Register a standalone geometry, e.g. a candidate zone polygon. Blank
    /// ids are ignored by every builder method.
    pub fn with_geometry(mut self, id: &str, bounds: BoundingBox) -> Self {
        self.insert_shape(id.to_string(), bounds, true);
        self
    }

    /// Register a geometry the engine reports as invalid.
    pub fn with_invalid_geometry(mut self, id: &str, bounds: BoundingBox) -> Self {
        self.insert_shape(id.to_string(), bounds, false);
        self
    }

    /// Add a land polygon.
    pub fn with_land(mut self, id: &str, bounds: BoundingBox) -> Self {
        if let Some(id) = self.insert_shape(id.to_string(), bounds, true) {
            self.land.push(id);
        }
        self
    }

    /// Add a zone polygon. Its geometry id is `zone:<code>`.
    pub fn with_zone(
        mut self,
        code: PrimaryCode,
        name: &str,
        district: &str,
        bounds: BoundingBox,
    ) -> Self {
        if let Some(geometry) = self.insert_shape(format!("zone:{code}"), bounds, true) {
            self.zones.push(MockZone {
                code,
                name: Some(name.to_string()),
                district: Some(district.to_string()),
                geometry,
            });
        }
        self
    }

    /// Add a ward polygon. Its geometry id is `ward:<ward_id>`.
    pub fn with_ward(mut self, ward_id: &str, name: &str, bounds: BoundingBox) -> Self {
        if let Some(geometry) = self.insert_shape(format!("ward:{ward_id}"), bounds, true) {
            self.wards.push(WardGeometry {
                ward_id: ward_id.to_string(),
                ward_name: Some(name.to_string()),
                geometry,
            });
        }
        self
    }

    /// Make every query fail with `error`.
    pub fn failing(mut self, error: EngineError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Delay every query by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn round_trip(&self) -> Result<(), EngineError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn shape(&self, operation: &'static str, id: &GeometryId) -> Result<&Shape, EngineError> {
        self.shapes.get(id).ok_or_else(|| EngineError::Query {
            operation,
            reason: format!("unknown geometry {id}"),
        })
    }

    fn zone_shapes(&self) -> impl Iterator<Item = (&MockZone, &BoundingBox)> {
        self.zones.iter().filter_map(|z| {
            self.shapes
                .get(&z.geometry)
                .map(|shape| (z, &shape.bounds))
        })
    }
}

/// Distance from a point to the nearest edge of a box; zero inside.
fn distance_to_box(point: &GeoPoint, bounds: &BoundingBox) -> f64 {
    let lat = point.lat.clamp(bounds.min_lat, bounds.max_lat);
    let lon = point.lon.clamp(bounds.min_lon, bounds.max_lon);
    pda_core::distance_meters(point.lat, point.lon, lat, lon)
}

#[async_trait]
impl GeometryEngine for MockGeometryEngine {
    async fn land_geometries(&self) -> Result<Vec<GeometryId>, EngineError> {
        self.round_trip().await?;
        Ok(self.land.clone())
    }

    async fn contains_point(
        &self,
        geometry: &GeometryId,
        point: &GeoPoint,
    ) -> Result<bool, EngineError> {
        self.round_trip().await?;
        Ok(self.shape("contains_point", geometry)?.bounds.contains(point))
    }

    async fn zone_at(&self, point: &GeoPoint) -> Result<Option<ZoneMatch>, EngineError> {
        self.round_trip().await?;
        Ok(self
            .zone_shapes()
            .find(|(_, bounds)| bounds.contains(point))
            .map(|(zone, _)| zone.to_match()))
    }

    async fn nearest_zone(&self, point: &GeoPoint) -> Result<Option<NearestZone>, EngineError> {
        self.round_trip().await?;
        Ok(self
            .zone_shapes()
            .map(|(zone, bounds)| (zone, distance_to_box(point, bounds)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(zone, distance_m)| NearestZone {
                zone: zone.to_match(),
                distance_m,
            }))
    }

    async fn is_valid_geometry(&self, geometry: &GeometryId) -> Result<bool, EngineError> {
        self.round_trip().await?;
        Ok(self.shape("is_valid_geometry", geometry)?.valid)
    }

    async fn overlapping_zones(
        &self,
        geometry: &GeometryId,
        exclude: Option<&PrimaryCode>,
    ) -> Result<Vec<ZoneOverlap>, EngineError> {
        self.round_trip().await?;
        let candidate = self.shape("overlapping_zones", geometry)?.bounds;
        Ok(self
            .zone_shapes()
            .filter(|(zone, _)| Some(&zone.code) != exclude && zone.geometry != *geometry)
            .filter_map(|(zone, bounds)| {
                let shared = bounds.intersection(&candidate)?.area_sq_m();
                (shared > 0.0).then(|| ZoneOverlap {
                    zone_code: zone.code.clone(),
                    zone_name: zone.name.clone(),
                    overlap_sq_m: shared,
                })
            })
            .collect())
    }

    async fn ward_geometries(&self) -> Result<Vec<WardGeometry>, EngineError> {
        self.round_trip().await?;
        Ok(self.wards.clone())
    }

    async fn crosses(&self, ward: &GeometryId, geometry: &GeometryId) -> Result<bool, EngineError> {
        self.round_trip().await?;
        let ward = self.shape("crosses", ward)?.bounds;
        let geometry = self.shape("crosses", geometry)?.bounds;
        let shares_area = ward
            .intersection(&geometry)
            .is_some_and(|i| i.area_sq_m() > 0.0);
        Ok(shares_area && !ward.contains_box(&geometry) && !geometry.contains_box(&ward))
    }

    async fn zone_extent(
        &self,
        district: Option<&str>,
    ) -> Result<Option<BoundingBox>, EngineError> {
        self.round_trip().await?;
        Ok(self
            .zone_shapes()
            .filter(|(zone, _)| match district {
                Some(d) => zone
                    .district
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(d)),
                None => true,
            })
            .map(|(_, bounds)| *bounds)
            .reduce(|a, b| a.union(&b)))
    }

    async fn zones_intersecting(&self, point: &GeoPoint) -> Result<usize, EngineError> {
        self.round_trip().await?;
        Ok(self
            .zone_shapes()
            .filter(|(_, bounds)| bounds.contains(point))
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> BoundingBox {
        BoundingBox::new(min_lat, min_lon, max_lat, max_lon).unwrap()
    }

    #[tokio::test]
    async fn zone_lookup() {
        let engine = MockGeometryEngine::new().with_zone(
            PrimaryCode::new("1105").unwrap(),
            "Tower Hill",
            "Western Urban",
            bbox(8.475, -13.235, 8.49, -13.22),
        );
        let inside = GeoPoint::new(8.48, -13.23).unwrap();
        let outside = GeoPoint::new(8.40, -13.23).unwrap();
        let found = engine.zone_at(&inside).await.unwrap().unwrap();
        assert_eq!(found.zone_code.as_str(), "1105");
        assert!(engine.zone_at(&outside).await.unwrap().is_none());
        assert_eq!(engine.zones_intersecting(&inside).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_geometry_is_query_error() {
        let engine = MockGeometryEngine::new();
        let id = GeometryId::new("missing").unwrap();
        assert!(matches!(
            engine.is_valid_geometry(&id).await,
            Err(EngineError::Query { .. })
        ));
    }

    #[tokio::test]
    async fn contained_box_does_not_cross() {
        let engine = MockGeometryEngine::new()
            .with_ward("1", "Ward 1", bbox(0.0, 0.0, 1.0, 1.0))
            .with_geometry("inner", bbox(0.2, 0.2, 0.4, 0.4))
            .with_geometry("straddle", bbox(0.8, 0.8, 1.2, 1.2));
        let ward = GeometryId::new("ward:1").unwrap();
        assert!(!engine
            .crosses(&ward, &GeometryId::new("inner").unwrap())
            .await
            .unwrap());
        assert!(engine
            .crosses(&ward, &GeometryId::new("straddle").unwrap())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn injected_failure() {
        let engine = MockGeometryEngine::new().failing(EngineError::Unavailable("down".into()));
        assert!(engine.land_geometries().await.is_err());
    }
}
