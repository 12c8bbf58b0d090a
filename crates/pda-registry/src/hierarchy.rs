//! # Zone Hierarchy Allocator
//!
//! Thread-safe, cloneable in-memory store of the Region → District → Zone
//! tree. Every mutation runs under a single `parking_lot` write lock, so
//! the read-validate-insert sequence of an allocation (find the highest
//! sibling code, check capacity, insert, lock the parent) cannot interleave
//! with another allocation.
//!
//! ## Code Assignment
//!
//! A new child receives `max(existing sibling codes) + 1`, starting at the
//! level's minimum (1 for regions, 0 otherwise). Deleting the highest
//! sibling frees its code for reuse; deleting any other sibling does not.
//!
//! ## Lock Acquisition
//!
//! Writers wait at most `lock_timeout` per attempt and retry according to
//! the configured [`RetryPolicy`]. When every attempt times out the call
//! fails with [`AllocationError::ConcurrencyConflict`] instead of blocking.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{RwLock, RwLockWriteGuard};

use pda_core::{DistrictId, GeometryId, PrimaryCode, RegionId, Timestamp, ZoneId};

use crate::counter::RetryPolicy;
use crate::error::AllocationError;
use crate::node::{
    District, HierarchyLevel, NewDistrict, NewRegion, NewZone, NodeMutation, NodeRef, Region,
    Zone, ZoneLineage,
};

#[derive(Debug, Default)]
struct Tables {
    regions: BTreeMap<RegionId, Region>,
    districts: BTreeMap<DistrictId, District>,
    zones: BTreeMap<ZoneId, Zone>,
}

/// The addressing hierarchy and its allocation rules.
#[derive(Debug, Clone)]
pub struct ZoneHierarchy {
    tables: Arc<RwLock<Tables>>,
    retry: RetryPolicy,
    lock_timeout: Duration,
}

impl Default for ZoneHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneHierarchy {
    /// Per-attempt wait for the write lock.
    pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(250);

    /// Create an empty hierarchy with the default retry policy.
    pub fn new() -> Self {
        Self::with_retry(RetryPolicy::default(), Self::DEFAULT_LOCK_TIMEOUT)
    }

    /// Create an empty hierarchy with explicit lock retry settings.
    pub fn with_retry(retry: RetryPolicy, lock_timeout: Duration) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            retry,
            lock_timeout,
        }
    }

    fn write_tables(&self, parent: &str) -> Result<RwLockWriteGuard<'_, Tables>, AllocationError> {
        let attempts = self.retry.max_attempts;
        for attempt in 1..=attempts {
            if let Some(guard) = self.tables.try_write_for(self.lock_timeout) {
                return Ok(guard);
            }
            tracing::debug!(parent, attempt, "hierarchy lock contended");
            if attempt < attempts {
                std::thread::sleep(self.retry.backoff(attempt));
            }
        }
        tracing::warn!(parent, attempts, "hierarchy lock not acquired, giving up");
        Err(AllocationError::ConcurrencyConflict {
            parent: parent.to_string(),
            attempts,
        })
    }

    // ─── Allocation ──────────────────────────────────────────────────

    /// Create a region with the next free region code.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::InvalidRequest`] for a blank name or short code.
    /// - [`AllocationError::Conflict`] if the name or short code is taken.
    /// - [`AllocationError::CapacityExceeded`] once code 9 is in use.
    pub fn create_region(&self, req: NewRegion) -> Result<Region, AllocationError> {
        let level = HierarchyLevel::Region;
        let name = required(level, "name", &req.name)?;
        let short_code = required(level, "short_code", &req.short_code)?.to_uppercase();

        let mut tables = self.write_tables("root")?;
        if tables
            .regions
            .values()
            .any(|r| r.name.eq_ignore_ascii_case(&name))
        {
            return Err(conflict(level, "name", name));
        }
        if tables.regions.values().any(|r| r.short_code == short_code) {
            return Err(conflict(level, "short_code", short_code));
        }
        let code = next_code(level, tables.regions.values().map(|r| r.code), "root")?;

        let region = Region {
            id: RegionId::new(),
            code,
            name,
            short_code,
            description: req.description,
            is_active: true,
            locked: false,
            created_at: Timestamp::now(),
            created_by: req.created_by,
        };
        tables.regions.insert(region.id, region.clone());
        tracing::info!(code, name = %region.name, "region allocated");
        Ok(region)
    }

    /// Create a district under a region with the next free district code.
    /// Locks the region.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::NotFound`] if the region does not exist.
    /// - [`AllocationError::Conflict`] if the region already has a district
    ///   with this name.
    /// - [`AllocationError::CapacityExceeded`] once code 9 is in use.
    pub fn create_district(
        &self,
        region_id: RegionId,
        req: NewDistrict,
    ) -> Result<District, AllocationError> {
        let level = HierarchyLevel::District;
        let name = required(level, "name", &req.name)?;
        let short_code = required(level, "short_code", &req.short_code)?.to_uppercase();

        let parent = format!("region {region_id}");
        let mut tables = self.write_tables(&parent)?;
        if !tables.regions.contains_key(&region_id) {
            return Err(not_found(HierarchyLevel::Region, region_id));
        }
        let siblings: Vec<&District> = tables
            .districts
            .values()
            .filter(|d| d.region_id == region_id)
            .collect();
        if siblings.iter().any(|d| d.name.eq_ignore_ascii_case(&name)) {
            return Err(conflict(level, "name", name));
        }
        let code = next_code(level, siblings.iter().map(|d| d.code), &parent)?;

        let district = District {
            id: DistrictId::new(),
            region_id,
            code,
            name,
            short_code,
            description: req.description,
            is_active: true,
            locked: false,
            created_at: Timestamp::now(),
            created_by: req.created_by,
        };
        tables.districts.insert(district.id, district.clone());
        if let Some(region) = tables.regions.get_mut(&region_id) {
            if !region.locked {
                tracing::debug!(region = region.code, "region locked");
            }
            region.locked = true;
        }
        tracing::info!(%region_id, code, name = %district.name, "district allocated");
        Ok(district)
    }

    /// Create a zone under a district with the next free zone number.
    /// Locks the district.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::NotFound`] if the district (or its region) does
    ///   not exist.
    /// - [`AllocationError::CapacityExceeded`] once zone number 99 is in use.
    pub fn create_zone(
        &self,
        district_id: DistrictId,
        req: NewZone,
    ) -> Result<Zone, AllocationError> {
        let level = HierarchyLevel::Zone;
        let name = match req.name {
            Some(n) => Some(required(level, "name", &n)?),
            None => None,
        };

        let parent = format!("district {district_id}");
        let mut tables = self.write_tables(&parent)?;
        let district = tables
            .districts
            .get(&district_id)
            .ok_or_else(|| not_found(HierarchyLevel::District, district_id))?;
        let region = tables
            .regions
            .get(&district.region_id)
            .ok_or_else(|| not_found(HierarchyLevel::Region, district.region_id))?;
        let zone_number = next_code(
            level,
            tables
                .zones
                .values()
                .filter(|z| z.district_id == district_id)
                .map(|z| z.zone_number),
            &parent,
        )?;
        let primary_code = PrimaryCode::from_parts(region.code, district.code, zone_number)
            .map_err(|e| AllocationError::InvalidRequest {
                level,
                reason: e.to_string(),
            })?;

        let zone = Zone {
            id: ZoneId::new(),
            district_id,
            zone_number,
            primary_code,
            segment: req.segment,
            name,
            ward: req.ward,
            geometry: req.geometry,
            address_sequence: 0,
            is_active: true,
            locked: false,
            created_at: Timestamp::now(),
            created_by: req.created_by,
        };
        tables.zones.insert(zone.id, zone.clone());
        if let Some(district) = tables.districts.get_mut(&district_id) {
            district.locked = true;
        }
        tracing::info!(
            primary_code = %zone.primary_code,
            segment = %zone.segment,
            "zone allocated"
        );
        Ok(zone)
    }

    // ─── Mutation ────────────────────────────────────────────────────

    /// Rename or delete a node.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::NotFound`] if the node does not exist.
    /// - [`AllocationError::NodeLocked`] if the node has ever had a child.
    /// - [`AllocationError::Conflict`] if a rename collides with a sibling.
    pub fn mutate(&self, node: NodeRef, mutation: NodeMutation) -> Result<(), AllocationError> {
        let new_name = match &mutation {
            NodeMutation::Rename(name) => Some(required(node.level(), "name", name)?),
            NodeMutation::Delete => None,
        };

        let mut tables = self.write_tables(&node.to_string())?;
        let tables = &mut *tables;
        match node {
            NodeRef::Region(id) => {
                let region = tables
                    .regions
                    .get(&id)
                    .ok_or_else(|| not_found(HierarchyLevel::Region, id))?;
                ensure_unlocked(HierarchyLevel::Region, region.locked, region.code.to_string())?;
                match new_name {
                    Some(name) => {
                        if tables
                            .regions
                            .values()
                            .any(|r| r.id != id && r.name.eq_ignore_ascii_case(&name))
                        {
                            return Err(conflict(HierarchyLevel::Region, "name", name));
                        }
                        if let Some(region) = tables.regions.get_mut(&id) {
                            region.name = name;
                        }
                    }
                    None => {
                        tables.regions.remove(&id);
                    }
                }
            }
            NodeRef::District(id) => {
                let district = tables
                    .districts
                    .get(&id)
                    .ok_or_else(|| not_found(HierarchyLevel::District, id))?;
                let code = tables
                    .regions
                    .get(&district.region_id)
                    .map(|r| district.full_code(r))
                    .unwrap_or_else(|| district.code.to_string());
                ensure_unlocked(HierarchyLevel::District, district.locked, code)?;
                let region_id = district.region_id;
                match new_name {
                    Some(name) => {
                        if tables.districts.values().any(|d| {
                            d.id != id
                                && d.region_id == region_id
                                && d.name.eq_ignore_ascii_case(&name)
                        }) {
                            return Err(conflict(HierarchyLevel::District, "name", name));
                        }
                        if let Some(district) = tables.districts.get_mut(&id) {
                            district.name = name;
                        }
                    }
                    None => {
                        tables.districts.remove(&id);
                    }
                }
            }
            NodeRef::Zone(id) => {
                let zone = tables
                    .zones
                    .get_mut(&id)
                    .ok_or_else(|| not_found(HierarchyLevel::Zone, id))?;
                ensure_unlocked(HierarchyLevel::Zone, zone.locked, zone.primary_code.to_string())?;
                match new_name {
                    Some(name) => zone.name = Some(name),
                    None => {
                        tables.zones.remove(&id);
                    }
                }
            }
        }
        tracing::info!(%node, ?mutation, "hierarchy node modified");
        Ok(())
    }

    /// Rename a node. See [`mutate`](Self::mutate).
    pub fn rename(&self, node: NodeRef, name: impl Into<String>) -> Result<(), AllocationError> {
        self.mutate(node, NodeMutation::Rename(name.into()))
    }

    /// Delete a node. See [`mutate`](Self::mutate).
    pub fn delete(&self, node: NodeRef) -> Result<(), AllocationError> {
        self.mutate(node, NodeMutation::Delete)
    }

    /// Attach or detach a zone's geometry. Allowed on locked zones; the
    /// zone's code is unaffected.
    pub fn set_zone_geometry(
        &self,
        zone_id: ZoneId,
        geometry: Option<GeometryId>,
    ) -> Result<Zone, AllocationError> {
        let mut tables = self.write_tables(&format!("zone {zone_id}"))?;
        let zone = tables
            .zones
            .get_mut(&zone_id)
            .ok_or_else(|| not_found(HierarchyLevel::Zone, zone_id))?;
        zone.geometry = geometry;
        Ok(zone.clone())
    }

    /// Record that `sequence` was minted in a zone: locks the zone and
    /// raises its recorded sequence high-water mark.
    pub fn record_minted(&self, zone_id: ZoneId, sequence: u32) -> Result<Zone, AllocationError> {
        let mut tables = self.write_tables(&format!("zone {zone_id}"))?;
        let zone = tables
            .zones
            .get_mut(&zone_id)
            .ok_or_else(|| not_found(HierarchyLevel::Zone, zone_id))?;
        if !zone.locked {
            tracing::debug!(primary_code = %zone.primary_code, "zone locked by first address");
        }
        zone.locked = true;
        zone.address_sequence = zone.address_sequence.max(sequence);
        Ok(zone.clone())
    }

    // ─── Lookup ──────────────────────────────────────────────────────

    pub fn region(&self, id: RegionId) -> Option<Region> {
        self.tables.read().regions.get(&id).cloned()
    }

    pub fn district(&self, id: DistrictId) -> Option<District> {
        self.tables.read().districts.get(&id).cloned()
    }

    pub fn zone(&self, id: ZoneId) -> Option<Zone> {
        self.tables.read().zones.get(&id).cloned()
    }

    /// All regions, ordered by code.
    pub fn regions(&self) -> Vec<Region> {
        let mut out: Vec<Region> = self.tables.read().regions.values().cloned().collect();
        out.sort_by_key(|r| r.code);
        out
    }

    /// Districts of a region, ordered by code.
    pub fn districts_of(&self, region_id: RegionId) -> Vec<District> {
        let mut out: Vec<District> = self
            .tables
            .read()
            .districts
            .values()
            .filter(|d| d.region_id == region_id)
            .cloned()
            .collect();
        out.sort_by_key(|d| d.code);
        out
    }

    /// Zones of a district, ordered by zone number.
    pub fn zones_of(&self, district_id: DistrictId) -> Vec<Zone> {
        let mut out: Vec<Zone> = self
            .tables
            .read()
            .zones
            .values()
            .filter(|z| z.district_id == district_id)
            .cloned()
            .collect();
        out.sort_by_key(|z| z.zone_number);
        out
    }

    pub fn find_zone_by_primary_code(&self, code: &PrimaryCode) -> Option<Zone> {
        self.tables
            .read()
            .zones
            .values()
            .find(|z| &z.primary_code == code)
            .cloned()
    }

    /// Resolve a zone's district and region.
    pub fn lineage(&self, zone_id: ZoneId) -> Option<ZoneLineage> {
        let tables = self.tables.read();
        let zone = tables.zones.get(&zone_id)?;
        let district = tables.districts.get(&zone.district_id)?;
        let region = tables.regions.get(&district.region_id)?;
        Some(ZoneLineage {
            region: region.clone(),
            district: district.clone(),
            zone: zone.clone(),
        })
    }

    /// Number of direct children of a node; for a zone, the recorded
    /// address sequence.
    pub fn child_count(&self, node: NodeRef) -> usize {
        let tables = self.tables.read();
        match node {
            NodeRef::Region(id) => tables.districts.values().filter(|d| d.region_id == id).count(),
            NodeRef::District(id) => tables.zones.values().filter(|z| z.district_id == id).count(),
            NodeRef::Zone(id) => tables
                .zones
                .get(&id)
                .map_or(0, |z| z.address_sequence as usize),
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn required(level: HierarchyLevel, field: &str, value: &str) -> Result<String, AllocationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AllocationError::InvalidRequest {
            level,
            reason: format!("{field} must not be empty"),
        });
    }
    Ok(trimmed.to_string())
}

fn next_code(
    level: HierarchyLevel,
    siblings: impl Iterator<Item = u8>,
    parent: &str,
) -> Result<u8, AllocationError> {
    let next = siblings
        .map(u32::from)
        .max()
        .map_or(level.min_code(), |max| max + 1);
    let capacity_exceeded = || AllocationError::CapacityExceeded {
        level,
        parent: parent.to_string(),
        limit: level.capacity(),
    };
    if next > level.max_code() {
        return Err(capacity_exceeded());
    }
    u8::try_from(next).map_err(|_| capacity_exceeded())
}

fn ensure_unlocked(
    level: HierarchyLevel,
    locked: bool,
    code: String,
) -> Result<(), AllocationError> {
    if locked {
        return Err(AllocationError::NodeLocked { level, code });
    }
    Ok(())
}

fn conflict(level: HierarchyLevel, field: &'static str, value: String) -> AllocationError {
    AllocationError::Conflict {
        level,
        field,
        value,
    }
}

fn not_found(level: HierarchyLevel, id: impl std::fmt::Display) -> AllocationError {
    AllocationError::NotFound {
        level,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pda_core::Segment;
    use std::collections::HashSet;
    use std::thread;

    fn seg(n: &str) -> Segment {
        Segment::new(n).unwrap()
    }

    fn western_area(h: &ZoneHierarchy) -> (Region, District) {
        let region = h.create_region(NewRegion::new("Western Area", "wa")).unwrap();
        let district = h
            .create_district(region.id, NewDistrict::new("Western Urban", "WU"))
            .unwrap();
        (region, district)
    }

    #[test]
    fn first_codes_start_at_level_minimum() {
        let h = ZoneHierarchy::new();
        let (region, district) = western_area(&h);
        assert_eq!(region.code, 1);
        assert_eq!(region.short_code, "WA");
        assert_eq!(district.code, 0);
        assert_eq!(district.full_code(&region), "10");

        let zone = h.create_zone(district.id, NewZone::new(seg("001"))).unwrap();
        assert_eq!(zone.zone_number, 0);
        assert_eq!(zone.primary_code.as_str(), "1000");
        assert_eq!(zone.legacy_zone_code().to_string(), "1000-001");
    }

    #[test]
    fn zone_code_from_parent_codes() {
        let h = ZoneHierarchy::new();
        let (_, district) = western_area(&h);
        for _ in 0..5 {
            h.create_zone(district.id, NewZone::new(seg("001"))).unwrap();
        }
        let sixth = h.create_zone(district.id, NewZone::new(seg("001"))).unwrap();
        assert_eq!(sixth.primary_code.as_str(), "1005");
        assert_eq!(sixth.primary_code.region_code(), 1);
        assert_eq!(sixth.primary_code.district_code(), 0);
        assert_eq!(sixth.primary_code.zone_number(), 5);
    }

    #[test]
    fn tenth_region_exceeds_capacity() {
        let h = ZoneHierarchy::new();
        for i in 1..=9 {
            let r = h
                .create_region(NewRegion::new(format!("Region {i}"), format!("R{i}")))
                .unwrap();
            assert_eq!(r.code, i);
        }
        let err = h
            .create_region(NewRegion::new("Region 10", "R10"))
            .unwrap_err();
        assert!(matches!(
            err,
            AllocationError::CapacityExceeded {
                level: HierarchyLevel::Region,
                limit: 9,
                ..
            }
        ));
    }

    #[test]
    fn eleventh_district_exceeds_capacity_and_codes_are_per_region() {
        let h = ZoneHierarchy::new();
        let region = h.create_region(NewRegion::new("Northern", "NP")).unwrap();
        for i in 0..=9u8 {
            let req = NewDistrict::new(format!("District {i}"), format!("D{i}"));
            let d = h.create_district(region.id, req).unwrap();
            assert_eq!(d.code, i);
        }
        let err = h
            .create_district(region.id, NewDistrict::new("District 10", "D10"))
            .unwrap_err();
        assert!(matches!(
            err,
            AllocationError::CapacityExceeded {
                level: HierarchyLevel::District,
                limit: 10,
                ..
            }
        ));

        let other = h.create_region(NewRegion::new("Southern", "SP")).unwrap();
        let first = h.create_district(other.id, NewDistrict::new("Bo", "BO")).unwrap();
        assert_eq!(first.code, 0);
        assert_eq!(first.full_code(&other), "20");
    }

    #[test]
    fn zone_capacity_is_one_hundred() {
        let h = ZoneHierarchy::new();
        let (_, district) = western_area(&h);
        for _ in 0..100 {
            h.create_zone(district.id, NewZone::new(seg("001"))).unwrap();
        }
        assert!(matches!(
            h.create_zone(district.id, NewZone::new(seg("001"))),
            Err(AllocationError::CapacityExceeded {
                level: HierarchyLevel::Zone,
                ..
            })
        ));
    }

    #[test]
    fn codes_follow_max_not_count() {
        let h = ZoneHierarchy::new();
        h.create_region(NewRegion::new("North", "N")).unwrap();
        let middle = h.create_region(NewRegion::new("South", "S")).unwrap();
        h.create_region(NewRegion::new("East", "E")).unwrap();

        h.delete(NodeRef::Region(middle.id)).unwrap();
        let next = h.create_region(NewRegion::new("West", "W")).unwrap();
        assert_eq!(next.code, 4);
    }

    #[test]
    fn duplicate_region_name_or_short_code_conflicts() {
        let h = ZoneHierarchy::new();
        h.create_region(NewRegion::new("Western Area", "WA")).unwrap();
        assert!(matches!(
            h.create_region(NewRegion::new("western area", "XX")),
            Err(AllocationError::Conflict { field: "name", .. })
        ));
        assert!(matches!(
            h.create_region(NewRegion::new("Other", "wa")),
            Err(AllocationError::Conflict {
                field: "short_code",
                ..
            })
        ));
    }

    #[test]
    fn duplicate_district_name_only_conflicts_within_region() {
        let h = ZoneHierarchy::new();
        let (region, _) = western_area(&h);
        assert!(matches!(
            h.create_district(region.id, NewDistrict::new("Western Urban", "X")),
            Err(AllocationError::Conflict { .. })
        ));
        let other = h.create_region(NewRegion::new("Northern", "NP")).unwrap();
        assert!(h
            .create_district(other.id, NewDistrict::new("Western Urban", "WU"))
            .is_ok());
    }

    #[test]
    fn blank_name_rejected() {
        let h = ZoneHierarchy::new();
        assert!(matches!(
            h.create_region(NewRegion::new("   ", "X")),
            Err(AllocationError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn unknown_parent_not_found() {
        let h = ZoneHierarchy::new();
        assert!(matches!(
            h.create_district(RegionId::new(), NewDistrict::new("A", "A")),
            Err(AllocationError::NotFound {
                level: HierarchyLevel::Region,
                ..
            })
        ));
        assert!(matches!(
            h.create_zone(DistrictId::new(), NewZone::new(seg("001"))),
            Err(AllocationError::NotFound {
                level: HierarchyLevel::District,
                ..
            })
        ));
    }

    #[test]
    fn parent_locks_on_first_child() {
        let h = ZoneHierarchy::new();
        let region = h.create_region(NewRegion::new("Western Area", "WA")).unwrap();
        assert!(!h.region(region.id).unwrap().locked);
        h.rename(NodeRef::Region(region.id), "Western Area Province")
            .unwrap();

        let district = h
            .create_district(region.id, NewDistrict::new("Western Urban", "WU"))
            .unwrap();
        assert!(h.region(region.id).unwrap().locked);
        assert!(!h.district(district.id).unwrap().locked);

        assert!(matches!(
            h.rename(NodeRef::Region(region.id), "Anything"),
            Err(AllocationError::NodeLocked {
                level: HierarchyLevel::Region,
                ..
            })
        ));
        assert!(matches!(
            h.delete(NodeRef::Region(region.id)),
            Err(AllocationError::NodeLocked { .. })
        ));
    }

    #[test]
    fn lock_survives_child_deletion() {
        let h = ZoneHierarchy::new();
        let (_, district) = western_area(&h);
        let zone = h.create_zone(district.id, NewZone::new(seg("001"))).unwrap();
        h.delete(NodeRef::Zone(zone.id)).unwrap();
        assert_eq!(h.child_count(NodeRef::District(district.id)), 0);
        assert!(h.district(district.id).unwrap().locked);
        assert!(h.delete(NodeRef::District(district.id)).is_err());
    }

    #[test]
    fn minted_zone_is_locked_but_geometry_editable() {
        let h = ZoneHierarchy::new();
        let (_, district) = western_area(&h);
        let zone = h.create_zone(district.id, NewZone::new(seg("001"))).unwrap();

        let zone = h.record_minted(zone.id, 1).unwrap();
        assert!(zone.locked);
        assert_eq!(zone.address_sequence, 1);
        assert!(matches!(
            h.rename(NodeRef::Zone(zone.id), "Renamed"),
            Err(AllocationError::NodeLocked { .. })
        ));

        let geometry = GeometryId::new("geom-1").unwrap();
        let updated = h.set_zone_geometry(zone.id, Some(geometry.clone())).unwrap();
        assert_eq!(updated.geometry, Some(geometry));
        assert_eq!(updated.primary_code, zone.primary_code);
    }

    #[test]
    fn record_minted_keeps_high_water_mark() {
        let h = ZoneHierarchy::new();
        let (_, district) = western_area(&h);
        let zone = h.create_zone(district.id, NewZone::new(seg("001"))).unwrap();
        h.record_minted(zone.id, 7).unwrap();
        let zone = h.record_minted(zone.id, 3).unwrap();
        assert_eq!(zone.address_sequence, 7);
    }

    #[test]
    fn lookups() {
        let h = ZoneHierarchy::new();
        let (region, district) = western_area(&h);
        let zone = h
            .create_zone(district.id, NewZone::new(seg("047")).named("Lumley"))
            .unwrap();

        let found = h.find_zone_by_primary_code(&zone.primary_code).unwrap();
        assert_eq!(found.id, zone.id);

        let lineage = h.lineage(zone.id).unwrap();
        assert_eq!(lineage.region.id, region.id);
        assert_eq!(lineage.district.id, district.id);

        assert_eq!(h.regions().len(), 1);
        assert_eq!(h.districts_of(region.id).len(), 1);
        assert_eq!(h.zones_of(district.id).len(), 1);
        assert_eq!(h.child_count(NodeRef::Region(region.id)), 1);
    }

    #[test]
    fn contended_lock_reports_concurrency_conflict() {
        let h = ZoneHierarchy::with_retry(
            RetryPolicy::new(2, Duration::from_millis(1)),
            Duration::from_millis(5),
        );
        let _reader = h.tables.read();
        assert!(matches!(
            h.create_region(NewRegion::new("Western Area", "WA")),
            Err(AllocationError::ConcurrencyConflict { attempts: 2, .. })
        ));
    }

    #[test]
    fn concurrent_zone_allocation_assigns_distinct_numbers() {
        let h = ZoneHierarchy::new();
        let (_, district) = western_area(&h);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let h = h.clone();
                thread::spawn(move || {
                    (0..20)
                        .filter_map(|_| h.create_zone(district.id, NewZone::new(seg("001"))).ok())
                        .map(|z| z.zone_number)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut numbers = HashSet::new();
        for handle in handles {
            for n in handle.join().unwrap() {
                assert!(numbers.insert(n), "zone number {n} assigned twice");
            }
        }
        assert_eq!(numbers.len(), 100);
        assert_eq!(h.zones_of(district.id).len(), 100);
    }
}
