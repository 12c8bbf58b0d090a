//! # Spatial Validator
//!
//! Runs the point and zone-geometry pipelines against a [`GeometryEngine`].
//! The validator holds no mutable state; one instance can serve any number
//! of concurrent requests.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use pda_core::geohash::{self, GeoHash};
use pda_core::{distance_meters, BoundingBox, GeoPoint, GeometryId, PrimaryCode};

use crate::config::ValidationConfig;
use crate::engine::{EngineError, GeometryEngine, NearestZone};
use crate::result::{Subject, ValidationKind, ValidationReport, ValidationResult};

/// A sampled grid cell with no zone coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageGap {
    pub geohash: GeoHash,
    pub center: GeoPoint,
    pub bounds: BoundingBox,
}

/// Point and zone-geometry validation pipelines.
#[derive(Clone)]
pub struct SpatialValidator {
    engine: Arc<dyn GeometryEngine>,
    bounds: BoundingBox,
    config: ValidationConfig,
}

impl std::fmt::Debug for SpatialValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialValidator")
            .field("bounds", &self.bounds)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SpatialValidator {
    pub fn new(
        engine: Arc<dyn GeometryEngine>,
        bounds: BoundingBox,
        config: ValidationConfig,
    ) -> Self {
        Self {
            engine,
            bounds,
            config,
        }
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Run one engine query under the configured timeout.
    async fn query<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, EngineError>>,
    ) -> Result<T, EngineError> {
        match tokio::time::timeout(self.config.engine_timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout {
                operation,
                after_ms: self.config.engine_timeout_ms,
            }),
        }
    }

    // ─── Point pipeline ──────────────────────────────────────────────

    /// Validate an address point, optionally against the zone it is
    /// expected to fall in.
    pub async fn validate_point(
        &self,
        lat: f64,
        lon: f64,
        expected_zone: Option<&PrimaryCode>,
    ) -> ValidationReport {
        let subject = Subject::Point { lat, lon };
        let mut report = ValidationReport::new();

        let point = match self.check_bounds(lat, lon, &subject) {
            Ok((point, passed)) => {
                report.push(passed);
                point
            }
            Err(failed) => {
                report.push(failed);
                return report;
            }
        };

        report.push(self.check_on_land(&point, &subject).await);
        report.push(
            self.check_zone_containment(&point, expected_zone, &subject)
                .await,
        );
        report.push(self.check_geohash_consistency(&point, &subject));

        tracing::debug!(
            lat,
            lon,
            valid = report.is_valid(),
            warnings = report.warnings().count(),
            "point validated"
        );
        report
    }

    /// [`validate_point`](Self::validate_point) returning the overall
    /// verdict alongside the results.
    pub async fn validate_address(
        &self,
        lat: f64,
        lon: f64,
        expected_zone: Option<&PrimaryCode>,
    ) -> (bool, ValidationReport) {
        let report = self.validate_point(lat, lon, expected_zone).await;
        (report.is_valid(), report)
    }

    fn check_bounds(
        &self,
        lat: f64,
        lon: f64,
        subject: &Subject,
    ) -> Result<(GeoPoint, ValidationResult), ValidationResult> {
        let kind = ValidationKind::CoordinateBounds;
        match GeoPoint::new(lat, lon) {
            Ok(point) if self.bounds.contains(&point) => Ok((
                point,
                ValidationResult::passed(kind, subject, "Coordinates within national bounds"),
            )),
            _ => Err(ValidationResult::failed(
                kind,
                subject,
                "Coordinates are outside national bounds",
            )
            .with_detail("latitude", lat)
            .with_detail("longitude", lon)
            .with_detail("bounds", json!(self.bounds))),
        }
    }

    async fn check_on_land(&self, point: &GeoPoint, subject: &Subject) -> ValidationResult {
        let kind = ValidationKind::LandCheck;
        let land = match self
            .query("land_geometries", self.engine.land_geometries())
            .await
        {
            Ok(land) => land,
            Err(e) => return unchecked(kind, subject, "land boundary", &e),
        };
        if land.is_empty() {
            return ValidationResult::warning(
                kind,
                subject,
                "Land boundary data not available for validation",
            );
        }
        for geometry in &land {
            match self
                .query("contains_point", self.engine.contains_point(geometry, point))
                .await
            {
                Ok(true) => {
                    return ValidationResult::passed(kind, subject, "Address point is on land")
                }
                Ok(false) => {}
                Err(e) => return unchecked(kind, subject, "land boundary", &e),
            }
        }
        ValidationResult::failed(
            kind,
            subject,
            "Address point is not on land (possibly water/ocean)",
        )
        .with_detail("latitude", point.lat)
        .with_detail("longitude", point.lon)
    }

    async fn check_zone_containment(
        &self,
        point: &GeoPoint,
        expected: Option<&PrimaryCode>,
        subject: &Subject,
    ) -> ValidationResult {
        let kind = ValidationKind::ZoneContainment;
        let found = match self.query("zone_at", self.engine.zone_at(point)).await {
            Ok(found) => found,
            Err(e) => return unchecked(kind, subject, "zone containment", &e),
        };
        let Some(found) = found else {
            return ValidationResult::failed(
                kind,
                subject,
                "Address point is not inside any postal zone",
            )
            .with_detail("latitude", point.lat)
            .with_detail("longitude", point.lon);
        };

        match expected {
            Some(expected) if *expected != found.zone_code => ValidationResult::warning(
                kind,
                subject,
                format!(
                    "Address is in zone {}, not expected zone {}",
                    found.zone_code, expected
                ),
            )
            .with_detail("found_zone", found.zone_code.as_str())
            .with_detail("expected_zone", expected.as_str())
            .with_detail("zone_name", json!(found.zone_name))
            .with_detail("district", json!(found.district_name)),
            _ => ValidationResult::passed(
                kind,
                subject,
                format!("Address is inside zone {}", found.zone_code),
            )
            .with_detail("zone_code", found.zone_code.as_str())
            .with_detail("zone_name", json!(found.zone_name))
            .with_detail("district", json!(found.district_name)),
        }
    }

    fn check_geohash_consistency(&self, point: &GeoPoint, subject: &Subject) -> ValidationResult {
        let kind = ValidationKind::GeohashConsistency;
        let hash = match geohash::encode_point(point, self.config.geohash_precision) {
            Ok(hash) => hash,
            Err(e) => {
                return ValidationResult::failed(kind, subject, format!("Cannot encode point: {e}"))
            }
        };
        let center = geohash::decode_center(&hash);
        let distance = distance_meters(point.lat, point.lon, center.lat, center.lon);
        if distance > self.config.geohash_tolerance_m {
            return ValidationResult::warning(
                kind,
                subject,
                format!("Geohash center is {distance:.1}m from coordinates"),
            )
            .with_detail("geohash", hash.as_str())
            .with_detail("decoded", json!({ "lat": center.lat, "lon": center.lon }))
            .with_detail("distance_meters", distance);
        }
        ValidationResult::passed(kind, subject, "Geohash is consistent with coordinates")
            .with_detail("geohash", hash.as_str())
    }

    // ─── Zone geometry pipeline ──────────────────────────────────────

    /// Validate a candidate geometry for a zone.
    pub async fn validate_zone_geometry(
        &self,
        zone_code: &PrimaryCode,
        geometry: &GeometryId,
    ) -> ValidationReport {
        let subject = Subject::Zone {
            zone_code: zone_code.clone(),
        };
        let mut report = ValidationReport::new();
        report.push(self.check_geometry_valid(zone_code, geometry, &subject).await);
        report.push(self.check_zone_overlaps(zone_code, geometry, &subject).await);
        report.push(self.check_ward_crossing(geometry, &subject).await);
        tracing::debug!(
            zone = %zone_code,
            valid = report.is_valid(),
            "zone geometry validated"
        );
        report
    }

    async fn check_geometry_valid(
        &self,
        zone_code: &PrimaryCode,
        geometry: &GeometryId,
        subject: &Subject,
    ) -> ValidationResult {
        let kind = ValidationKind::GeometryValid;
        match self
            .query("is_valid_geometry", self.engine.is_valid_geometry(geometry))
            .await
        {
            Ok(true) => ValidationResult::passed(kind, subject, "Zone geometry is valid"),
            Ok(false) => ValidationResult::failed(
                kind,
                subject,
                format!("Zone {zone_code} has invalid geometry"),
            )
            .with_detail("geometry", geometry.as_str()),
            Err(e) => unchecked(kind, subject, "geometry validity", &e),
        }
    }

    async fn check_zone_overlaps(
        &self,
        zone_code: &PrimaryCode,
        geometry: &GeometryId,
        subject: &Subject,
    ) -> ValidationResult {
        let kind = ValidationKind::ZoneOverlap;
        let mut overlaps = match self
            .query(
                "overlapping_zones",
                self.engine.overlapping_zones(geometry, Some(zone_code)),
            )
            .await
        {
            Ok(overlaps) => overlaps,
            Err(e) => return unchecked(kind, subject, "zone overlaps", &e),
        };
        if overlaps.is_empty() {
            return ValidationResult::passed(kind, subject, "Zone does not overlap other zones");
        }
        let total = overlaps.len();
        overlaps.sort_by(|a, b| b.overlap_sq_m.total_cmp(&a.overlap_sq_m));
        overlaps.truncate(self.config.max_overlaps_reported);
        ValidationResult::failed(
            kind,
            subject,
            format!("Zone overlaps with {total} other zone(s)"),
        )
        .with_detail("overlapping_zones", json!(overlaps))
    }

    async fn check_ward_crossing(
        &self,
        geometry: &GeometryId,
        subject: &Subject,
    ) -> ValidationResult {
        let kind = ValidationKind::BoundaryCrossing;
        let wards = match self
            .query("ward_geometries", self.engine.ward_geometries())
            .await
        {
            Ok(wards) => wards,
            Err(e) => return unchecked(kind, subject, "ward boundaries", &e),
        };
        let mut crossed = Vec::new();
        for ward in &wards {
            match self
                .query("crosses", self.engine.crosses(&ward.geometry, geometry))
                .await
            {
                Ok(true) => crossed.push(json!({
                    "ward_id": ward.ward_id,
                    "ward_name": ward.ward_name,
                })),
                Ok(false) => {}
                Err(e) => return unchecked(kind, subject, "ward boundaries", &e),
            }
        }
        if crossed.is_empty() {
            return ValidationResult::passed(kind, subject, "Zone does not cross ward boundaries");
        }
        ValidationResult::warning(
            kind,
            subject,
            format!("Zone crosses {} ward boundary(ies)", crossed.len()),
        )
        .with_detail("crossed_wards", crossed)
    }

    // ─── Lookups ─────────────────────────────────────────────────────

    /// The nearest zone to a point, or `None` if it lies farther than
    /// `max_distance_m` (default from config).
    pub async fn find_nearest_zone(
        &self,
        lat: f64,
        lon: f64,
        max_distance_m: Option<f64>,
    ) -> Result<Option<NearestZone>, EngineError> {
        let point = GeoPoint::new(lat, lon).map_err(|e| EngineError::Query {
            operation: "nearest_zone",
            reason: e.to_string(),
        })?;
        let limit = max_distance_m.unwrap_or(self.config.nearest_zone_radius_m);
        let nearest = self
            .query("nearest_zone", self.engine.nearest_zone(&point))
            .await?;
        Ok(nearest.filter(|n| n.distance_m <= limit))
    }

    /// Sample a grid over the extent of existing zones (optionally one
    /// district's) and report cells whose center no zone covers.
    pub async fn detect_coverage_gaps(
        &self,
        district: Option<&str>,
    ) -> Result<Vec<CoverageGap>, EngineError> {
        let Some(extent) = self
            .query("zone_extent", self.engine.zone_extent(district))
            .await?
        else {
            return Ok(Vec::new());
        };

        let step = self.config.gap_step_deg;
        if !(step.is_finite() && step > 0.0) {
            return Err(EngineError::Query {
                operation: "coverage_grid",
                reason: format!("invalid grid step {step}"),
            });
        }
        let rows = (extent.height() / step).floor() as usize;
        let cols = (extent.width() / step).floor() as usize;

        let mut seen = HashSet::new();
        let mut gaps = Vec::new();
        'grid: for row in 0..=rows {
            let lat = extent.min_lat + row as f64 * step;
            for col in 0..=cols {
                let lon = extent.min_lon + col as f64 * step;
                let Ok(cell) = geohash::encode(lat, lon, self.config.gap_precision) else {
                    continue;
                };
                if !seen.insert(cell.clone()) {
                    continue;
                }
                let center = cell.center();
                let covering = self
                    .query("zones_intersecting", self.engine.zones_intersecting(&center))
                    .await?;
                if covering == 0 {
                    gaps.push(CoverageGap {
                        bounds: cell.bounds(),
                        center,
                        geohash: cell,
                    });
                    if gaps.len() >= self.config.max_gaps {
                        break 'grid;
                    }
                }
            }
        }
        tracing::debug!(district, gaps = gaps.len(), cells = seen.len(), "coverage scanned");
        Ok(gaps)
    }
}

fn unchecked(
    kind: ValidationKind,
    subject: &Subject,
    what: &str,
    error: &EngineError,
) -> ValidationResult {
    tracing::warn!(error = %error, check = %kind, "geometry engine failed, check left unchecked");
    ValidationResult::warning(kind, subject, format!("Could not verify {what}: {error}"))
        .with_detail("unchecked", true)
        .with_detail("error", error.to_string())
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::mock::MockGeometryEngine;
    use crate::result::ValidationStatus;
    use std::time::Duration;

    fn bbox(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> BoundingBox {
        BoundingBox::new(min_lat, min_lon, max_lat, max_lon).unwrap()
    }

    fn code(s: &str) -> PrimaryCode {
        PrimaryCode::new(s).unwrap()
    }

    /// Freetown peninsula land with two zones side by side.
    fn freetown() -> MockGeometryEngine {
        MockGeometryEngine::new()
            .with_land("land:peninsula", bbox(8.20, -13.30, 8.55, -12.90))
            .with_zone(
                code("1100"),
                "Central Business",
                "Western Urban",
                bbox(8.47, -13.25, 8.478, -13.235),
            )
            .with_zone(
                code("1105"),
                "Tower Hill",
                "Western Urban",
                bbox(8.475, -13.235, 8.49, -13.22),
            )
    }

    fn validator(engine: MockGeometryEngine) -> SpatialValidator {
        SpatialValidator::new(
            Arc::new(engine),
            BoundingBox::SIERRA_LEONE,
            ValidationConfig::default(),
        )
    }

    #[tokio::test]
    async fn out_of_bounds_short_circuits() {
        let report = validator(freetown()).validate_point(51.5, -0.12, None).await;
        assert_eq!(report.len(), 1);
        let r = &report.results()[0];
        assert_eq!(r.kind, ValidationKind::CoordinateBounds);
        assert_eq!(r.status, ValidationStatus::Failed);
        assert!(!report.is_valid());
    }

    #[tokio::test]
    async fn non_finite_input_fails_bounds() {
        let report = validator(freetown()).validate_point(f64::NAN, -13.2, None).await;
        assert_eq!(report.len(), 1);
        assert!(!report.is_valid());
    }

    #[tokio::test]
    async fn point_in_expected_zone_passes_everything() {
        let report = validator(freetown())
            .validate_point(8.48, -13.228, Some(&code("1105")))
            .await;
        assert_eq!(report.len(), 4);
        assert!(report.is_valid());
        assert_eq!(report.warnings().count(), 0);
        let zone = report.get(ValidationKind::ZoneContainment).unwrap();
        assert_eq!(zone.detail("zone_code").unwrap(), "1105");
    }

    #[tokio::test]
    async fn point_in_other_zone_warns_with_both_codes() {
        let report = validator(freetown())
            .validate_point(8.479, -13.230, Some(&code("1100")))
            .await;
        let zone = report.get(ValidationKind::ZoneContainment).unwrap();
        assert_eq!(zone.status, ValidationStatus::Warning);
        assert_eq!(zone.detail("found_zone").unwrap(), "1105");
        assert_eq!(zone.detail("expected_zone").unwrap(), "1100");
        assert!(report.is_valid());
    }

    #[tokio::test]
    async fn point_outside_all_zones_fails() {
        let report = validator(freetown())
            .validate_point(8.40, -13.10, None)
            .await;
        let zone = report.get(ValidationKind::ZoneContainment).unwrap();
        assert_eq!(zone.status, ValidationStatus::Failed);
        assert!(!report.is_valid());
    }

    #[tokio::test]
    async fn water_point_fails_land_check() {
        let report = validator(freetown())
            .validate_point(8.0, -12.0, None)
            .await;
        let land = report.get(ValidationKind::LandCheck).unwrap();
        assert_eq!(land.status, ValidationStatus::Failed);
    }

    #[tokio::test]
    async fn missing_land_data_warns() {
        let engine = MockGeometryEngine::new().with_zone(
            code("1105"),
            "Tower Hill",
            "Western Urban",
            bbox(8.475, -13.235, 8.49, -13.22),
        );
        let report = validator(engine).validate_point(8.48, -13.228, None).await;
        let land = report.get(ValidationKind::LandCheck).unwrap();
        assert_eq!(land.status, ValidationStatus::Warning);
        assert!(!land.is_unchecked());
        assert!(report.is_valid());
    }

    #[tokio::test]
    async fn engine_failure_degrades_to_unchecked_warnings() {
        let engine = freetown().failing(EngineError::Unavailable("connection refused".into()));
        let report = validator(engine).validate_point(8.48, -13.228, None).await;
        assert_eq!(report.len(), 4);
        assert!(report.is_valid());
        for kind in [ValidationKind::LandCheck, ValidationKind::ZoneContainment] {
            let r = report.get(kind).unwrap();
            assert_eq!(r.status, ValidationStatus::Warning);
            assert!(r.is_unchecked());
        }
        assert_eq!(
            report.get(ValidationKind::GeohashConsistency).unwrap().status,
            ValidationStatus::Passed
        );
    }

    #[tokio::test]
    async fn slow_engine_times_out_to_warning() {
        let engine = freetown().with_latency(Duration::from_millis(200));
        let config = ValidationConfig {
            engine_timeout_ms: 20,
            ..ValidationConfig::default()
        };
        let v = SpatialValidator::new(Arc::new(engine), BoundingBox::SIERRA_LEONE, config);
        let report = v.validate_point(8.48, -13.228, None).await;
        let land = report.get(ValidationKind::LandCheck).unwrap();
        assert!(land.is_unchecked());
        assert!(land.message.contains("timed out"));
    }

    #[tokio::test]
    async fn validate_address_returns_verdict() {
        let (ok, report) = validator(freetown())
            .validate_address(8.48, -13.228, None)
            .await;
        assert!(ok);
        assert_eq!(report.len(), 4);
    }

    #[tokio::test]
    async fn overlapping_geometry_fails_ranked_by_area() {
        let engine = freetown().with_geometry("candidate", bbox(8.474, -13.240, 8.48, -13.230));
        let report = validator(engine)
            .validate_zone_geometry(&code("1199"), &GeometryId::new("candidate").unwrap())
            .await;
        assert_eq!(report.len(), 3);
        let overlap = report.get(ValidationKind::ZoneOverlap).unwrap();
        assert_eq!(overlap.status, ValidationStatus::Failed);
        let zones = overlap.detail("overlapping_zones").unwrap().as_array().unwrap();
        assert_eq!(zones.len(), 2);
        let first = zones[0]["overlap_sq_m"].as_f64().unwrap();
        let second = zones[1]["overlap_sq_m"].as_f64().unwrap();
        assert!(first >= second);
        assert!(!report.is_valid());
    }

    #[tokio::test]
    async fn own_zone_is_excluded_from_overlaps() {
        let engine =
            freetown().with_geometry("tower-hill-v2", bbox(8.476, -13.234, 8.489, -13.221));
        let report = validator(engine)
            .validate_zone_geometry(&code("1105"), &GeometryId::new("tower-hill-v2").unwrap())
            .await;
        assert_eq!(
            report.get(ValidationKind::ZoneOverlap).unwrap().status,
            ValidationStatus::Passed
        );
        assert!(report.is_valid());
    }

    #[tokio::test]
    async fn invalid_geometry_fails() {
        let engine = freetown().with_invalid_geometry("bowtie", bbox(8.30, -13.0, 8.31, -12.99));
        let report = validator(engine)
            .validate_zone_geometry(&code("1199"), &GeometryId::new("bowtie").unwrap())
            .await;
        assert_eq!(
            report.get(ValidationKind::GeometryValid).unwrap().status,
            ValidationStatus::Failed
        );
    }

    #[tokio::test]
    async fn ward_crossing_only_warns() {
        let engine = freetown()
            .with_ward("392", "Ward 392", bbox(8.30, -13.05, 8.35, -13.00))
            .with_geometry("straddler", bbox(8.34, -13.02, 8.36, -13.01));
        let report = validator(engine)
            .validate_zone_geometry(&code("1199"), &GeometryId::new("straddler").unwrap())
            .await;
        let ward = report.get(ValidationKind::BoundaryCrossing).unwrap();
        assert_eq!(ward.status, ValidationStatus::Warning);
        assert_eq!(ward.detail("crossed_wards").unwrap()[0]["ward_id"], "392");
        assert!(report.is_valid());
    }

    #[tokio::test]
    async fn engine_failure_in_geometry_checks_is_unchecked() {
        let engine = freetown().failing(EngineError::Unavailable("down".into()));
        let report = validator(engine)
            .validate_zone_geometry(&code("1199"), &GeometryId::new("anything").unwrap())
            .await;
        assert!(report.results().iter().all(|r| r.is_unchecked()));
        assert!(report.is_valid());
    }

    #[tokio::test]
    async fn nearest_zone_respects_radius() {
        let v = validator(freetown());
        let near = v.find_nearest_zone(8.46, -13.24, None).await.unwrap().unwrap();
        assert_eq!(near.zone.zone_code.as_str(), "1100");
        assert!(near.distance_m > 1_000.0 && near.distance_m < 1_200.0);

        assert!(v
            .find_nearest_zone(8.46, -13.24, Some(500.0))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn coverage_gaps_between_zones() {
        let west = bbox(8.40, -13.30, 8.45, -13.25);
        let east = bbox(8.40, -13.20, 8.45, -13.15);
        let engine = MockGeometryEngine::new()
            .with_zone(code("1100"), "West", "Western Urban", west)
            .with_zone(code("1101"), "East", "Western Urban", east);
        let gaps = validator(engine)
            .detect_coverage_gaps(Some("Western Urban"))
            .await
            .unwrap();
        assert!(!gaps.is_empty());
        assert!(gaps.len() <= 50);
        for gap in &gaps {
            assert!(!west.contains(&gap.center) && !east.contains(&gap.center));
            assert!(gap.bounds.contains(&gap.center));
            assert_eq!(gap.geohash.precision(), 6);
        }
        assert!(gaps
            .iter()
            .any(|g| g.center.lon > -13.25 && g.center.lon < -13.20));
    }

    #[tokio::test]
    async fn unknown_district_has_no_gaps() {
        let gaps = validator(freetown())
            .detect_coverage_gaps(Some("Bombali"))
            .await
            .unwrap();
        assert!(gaps.is_empty());
    }

    #[tokio::test]
    async fn coverage_gaps_capped() {
        let engine = MockGeometryEngine::new()
            .with_zone(code("1100"), "SW", "Bo", bbox(8.0, -12.5, 8.01, -12.49))
            .with_zone(code("1101"), "NE", "Bo", bbox(8.5, -12.0, 8.51, -11.99));
        let gaps = validator(engine).detect_coverage_gaps(None).await.unwrap();
        assert_eq!(gaps.len(), 50);
    }

    #[tokio::test]
    async fn no_zones_no_gaps() {
        let gaps = validator(MockGeometryEngine::new())
            .detect_coverage_gaps(None)
            .await
            .unwrap();
        assert!(gaps.is_empty());
    }
}
