//! # Postal Service Facade
//!
//! [`PostalService`] is the boundary the CRUD/HTTP layer calls. It owns one
//! instance of each component, wires them from an [`EngineConfig`], and
//! records metrics for every operation it performs.
//!
//! The service is cheap to clone; clones share the hierarchy, the sequence
//! counters and the geometry engine.

use std::sync::Arc;

use pda_confidence::{ConfidenceInputs, ConfidenceScore, ConfidenceScorer};
use pda_core::{
    DistrictId, GeometryId, IdError, PdaId, PrimaryCode, RegionId, Timestamp, ZoneId,
};
use pda_registry::{
    AddressIdentifier, AllocationError, AtomicCounter, District, HierarchyLevel,
    InMemoryCounter, NewDistrict, NewRegion, NewZone, NodeMutation, NodeRef, Region, Zone,
    ZoneHierarchy,
};
use pda_spatial::{
    CoverageGap, GeometryEngine, NearestZone, SpatialValidator, ValidationReport,
};

use crate::config::EngineConfig;
use crate::error::ServiceError;
use crate::metered::MeteredCounter;

type Identifier = AddressIdentifier<MeteredCounter<Arc<dyn AtomicCounter>>>;

/// Addressing engine entry point.
#[derive(Clone)]
pub struct PostalService {
    hierarchy: ZoneHierarchy,
    identifier: Arc<Identifier>,
    scorer: ConfidenceScorer,
    validator: SpatialValidator,
    config: EngineConfig,
}

impl std::fmt::Debug for PostalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostalService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PostalService {
    /// Build a service with an in-process sequence counter.
    pub fn new(config: EngineConfig, engine: Arc<dyn GeometryEngine>) -> Self {
        Self::with_counter(config, engine, Arc::new(InMemoryCounter::new()))
    }

    /// Build a service over an external sequence counter backend.
    pub fn with_counter(
        config: EngineConfig,
        engine: Arc<dyn GeometryEngine>,
        counter: Arc<dyn AtomicCounter>,
    ) -> Self {
        let retry = config.registry.retry_policy();
        let hierarchy = ZoneHierarchy::with_retry(retry, config.registry.lock_timeout());
        let identifier = AddressIdentifier::new(MeteredCounter::new(counter), retry);
        let validator = SpatialValidator::new(engine, config.bounds, config.validation.clone());
        tracing::debug!(?config, "postal service configured");
        Self {
            hierarchy,
            identifier: Arc::new(identifier),
            scorer: ConfidenceScorer::new(),
            validator,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read access to the hierarchy.
    pub fn hierarchy(&self) -> &ZoneHierarchy {
        &self.hierarchy
    }

    pub fn validator(&self) -> &SpatialValidator {
        &self.validator
    }

    // ─── Allocation ──────────────────────────────────────────────────

    pub fn allocate_region(&self, req: NewRegion) -> Result<Region, ServiceError> {
        let region = self.hierarchy.create_region(req)?;
        record_allocation(HierarchyLevel::Region);
        Ok(region)
    }

    pub fn allocate_district(
        &self,
        region_id: RegionId,
        req: NewDistrict,
    ) -> Result<District, ServiceError> {
        let district = self.hierarchy.create_district(region_id, req)?;
        record_allocation(HierarchyLevel::District);
        Ok(district)
    }

    pub fn allocate_zone(
        &self,
        district_id: DistrictId,
        req: NewZone,
    ) -> Result<Zone, ServiceError> {
        let zone = self.hierarchy.create_zone(district_id, req)?;
        record_allocation(HierarchyLevel::Zone);
        Ok(zone)
    }

    /// Rename or delete a node. Refused once the node is locked.
    pub fn rename_or_delete(
        &self,
        node: NodeRef,
        mutation: NodeMutation,
    ) -> Result<(), ServiceError> {
        let result = self.hierarchy.mutate(node, mutation);
        if let Err(AllocationError::NodeLocked { level, code }) = &result {
            tracing::info!(%level, %code, "mutation of locked node refused");
        }
        Ok(result?)
    }

    // ─── Identifiers ─────────────────────────────────────────────────

    /// Mint the next PDA-ID in a zone and lock the zone.
    ///
    /// A sequence number drawn from the counter is never handed out again,
    /// even when recording the mint fails afterwards.
    pub fn mint_pda_id(&self, zone_id: ZoneId) -> Result<PdaId, ServiceError> {
        let zone = self
            .hierarchy
            .zone(zone_id)
            .ok_or_else(|| IdError::ZoneNotFound(zone_id.to_string()))?;
        let id = self.identifier.generate_next(&zone)?;
        self.hierarchy.record_minted(zone_id, id.sequence())?;
        metrics::counter!("pda_ids_minted_total").increment(1);
        tracing::info!(pda_id = %id, zone = %zone.primary_code, "PDA-ID minted");
        Ok(id)
    }

    /// Parse and verify a PDA-ID string.
    pub fn parse_pda_id(&self, text: &str) -> Result<PdaId, IdError> {
        Identifier::parse(text)
    }

    // ─── Confidence ──────────────────────────────────────────────────

    pub fn score_confidence(&self, inputs: &ConfidenceInputs) -> ConfidenceScore {
        self.scorer.score(inputs)
    }

    pub fn score_confidence_at(
        &self,
        inputs: &ConfidenceInputs,
        now: &Timestamp,
    ) -> ConfidenceScore {
        self.scorer.score_at(inputs, now)
    }

    // ─── Validation ──────────────────────────────────────────────────

    pub async fn validate_point(
        &self,
        lat: f64,
        lon: f64,
        expected_zone: Option<&PrimaryCode>,
    ) -> ValidationReport {
        let report = self.validator.validate_point(lat, lon, expected_zone).await;
        record_results(&report);
        report
    }

    /// Validate a candidate geometry for an existing zone.
    pub async fn validate_zone_geometry(
        &self,
        zone_id: ZoneId,
        geometry: &GeometryId,
    ) -> Result<ValidationReport, ServiceError> {
        let zone = self.existing_zone(zone_id)?;
        let report = self
            .validator
            .validate_zone_geometry(&zone.primary_code, geometry)
            .await;
        record_results(&report);
        Ok(report)
    }

    /// Validate a geometry and attach it to the zone when every check ran
    /// and none failed. A check the engine could not evaluate blocks the
    /// assignment as well; the zone is left untouched and the report says
    /// which checks were skipped.
    pub async fn assign_zone_geometry(
        &self,
        zone_id: ZoneId,
        geometry: GeometryId,
    ) -> Result<ValidationReport, ServiceError> {
        let report = self.validate_zone_geometry(zone_id, &geometry).await?;
        if report.is_fully_checked() {
            self.hierarchy.set_zone_geometry(zone_id, Some(geometry))?;
        } else {
            tracing::info!(
                %zone_id,
                %geometry,
                failures = report.failures().count(),
                unchecked = report.unchecked().count(),
                "zone geometry not assigned"
            );
        }
        Ok(report)
    }

    pub async fn find_nearest_zone(
        &self,
        lat: f64,
        lon: f64,
        max_distance_m: Option<f64>,
    ) -> Result<Option<NearestZone>, ServiceError> {
        Ok(self
            .validator
            .find_nearest_zone(lat, lon, max_distance_m)
            .await?)
    }

    pub async fn detect_coverage_gaps(
        &self,
        district: Option<&str>,
    ) -> Result<Vec<CoverageGap>, ServiceError> {
        Ok(self.validator.detect_coverage_gaps(district).await?)
    }

    fn existing_zone(&self, zone_id: ZoneId) -> Result<Zone, AllocationError> {
        self.hierarchy
            .zone(zone_id)
            .ok_or_else(|| AllocationError::NotFound {
                level: HierarchyLevel::Zone,
                id: zone_id.to_string(),
            })
    }
}

fn record_allocation(level: HierarchyLevel) {
    metrics::counter!("pda_allocations_total", "level" => level.as_str()).increment(1);
}

fn record_results(report: &ValidationReport) {
    for result in report.results() {
        metrics::counter!(
            "pda_validation_results_total",
            "kind" => result.kind.as_str(),
            "status" => result.status.as_str()
        )
        .increment(1);
    }
}
