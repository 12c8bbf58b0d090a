//! # Hierarchy Nodes
//!
//! Region → District → Zone records and the requests that create them.
//! Parents are referenced by identifier only; use
//! [`ZoneHierarchy`](crate::ZoneHierarchy) to resolve them.

use serde::{Deserialize, Serialize};

use pda_core::{
    DistrictId, GeometryId, LegacyZoneCode, PrimaryCode, RegionId, Segment, SegmentType,
    Timestamp, ZoneId,
};

/// One of the three levels of the addressing hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyLevel {
    /// Top level, codes 1-9.
    Region,
    /// Second level, codes 0-9 within a region.
    District,
    /// Third level, numbers 00-99 within a district.
    Zone,
}

impl HierarchyLevel {
    /// Smallest code a node at this level can receive.
    pub fn min_code(&self) -> u32 {
        match self {
            Self::Region => 1,
            Self::District | Self::Zone => 0,
        }
    }

    /// Largest code a node at this level can receive.
    pub fn max_code(&self) -> u32 {
        match self {
            Self::Region | Self::District => 9,
            Self::Zone => 99,
        }
    }

    /// Number of codes available under one parent.
    pub fn capacity(&self) -> u32 {
        self.max_code() - self.min_code() + 1
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::District => "district",
            Self::Zone => "zone",
        }
    }
}

impl std::fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Records ─────────────────────────────────────────────────────────

/// A top-level region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    /// Single digit, 1-9.
    pub code: u8,
    pub name: String,
    /// Uppercased abbreviation, unique across regions.
    pub short_code: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Set once the first district is created; never cleared.
    pub locked: bool,
    pub created_at: Timestamp,
    pub created_by: Option<String>,
}

/// A district within a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub id: DistrictId,
    pub region_id: RegionId,
    /// Single digit, 0-9, unique within the region.
    pub code: u8,
    pub name: String,
    pub short_code: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Set once the first zone is created; never cleared.
    pub locked: bool,
    pub created_at: Timestamp,
    pub created_by: Option<String>,
}

impl District {
    /// Two-digit code: region digit followed by district digit.
    pub fn full_code(&self, region: &Region) -> String {
        format!("{}{}", region.code, self.code)
    }
}

/// A zone within a district. Addresses are minted against zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub district_id: DistrictId,
    /// 0-99, unique within the district.
    pub zone_number: u8,
    pub primary_code: PrimaryCode,
    pub segment: Segment,
    pub name: Option<String>,
    pub ward: Option<String>,
    pub geometry: Option<GeometryId>,
    /// Highest sequence number recorded as minted in this zone.
    pub address_sequence: u32,
    pub is_active: bool,
    /// Set once the first address is minted; never cleared.
    pub locked: bool,
    pub created_at: Timestamp,
    pub created_by: Option<String>,
}

impl Zone {
    /// Usage class of the zone's delivery segment.
    pub fn zone_type(&self) -> SegmentType {
        self.segment.segment_type()
    }

    /// Legacy flat code (`XXXX-YYY`).
    pub fn legacy_zone_code(&self) -> LegacyZoneCode {
        LegacyZoneCode::new(self.primary_code.clone(), self.segment.clone())
    }

    /// Key of the zone's address sequence counter.
    pub fn counter_key(&self) -> String {
        format!("zone:{}:sequence", self.id)
    }
}

/// A zone together with its resolved parents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneLineage {
    pub region: Region,
    pub district: District,
    pub zone: Zone,
}

// ─── Requests ────────────────────────────────────────────────────────

/// Request to create a region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRegion {
    pub name: String,
    pub short_code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl NewRegion {
    pub fn new(name: impl Into<String>, short_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_code: short_code.into(),
            ..Self::default()
        }
    }

    pub fn created_by(mut self, actor: impl Into<String>) -> Self {
        self.created_by = Some(actor.into());
        self
    }
}

/// Request to create a district.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDistrict {
    pub name: String,
    pub short_code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl NewDistrict {
    pub fn new(name: impl Into<String>, short_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_code: short_code.into(),
            ..Self::default()
        }
    }

    pub fn created_by(mut self, actor: impl Into<String>) -> Self {
        self.created_by = Some(actor.into());
        self
    }
}

/// Request to create a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewZone {
    pub segment: Segment,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ward: Option<String>,
    #[serde(default)]
    pub geometry: Option<GeometryId>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl NewZone {
    pub fn new(segment: Segment) -> Self {
        Self {
            segment,
            name: None,
            ward: None,
            geometry: None,
            created_by: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn in_ward(mut self, ward: impl Into<String>) -> Self {
        self.ward = Some(ward.into());
        self
    }

    pub fn with_geometry(mut self, geometry: GeometryId) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn created_by(mut self, actor: impl Into<String>) -> Self {
        self.created_by = Some(actor.into());
        self
    }
}

// ─── Mutations ───────────────────────────────────────────────────────

/// A node of any level, by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", content = "id", rename_all = "lowercase")]
pub enum NodeRef {
    Region(RegionId),
    District(DistrictId),
    Zone(ZoneId),
}

impl NodeRef {
    pub fn level(&self) -> HierarchyLevel {
        match self {
            Self::Region(_) => HierarchyLevel::Region,
            Self::District(_) => HierarchyLevel::District,
            Self::Zone(_) => HierarchyLevel::Zone,
        }
    }
}

impl std::fmt::Display for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Region(id) => write!(f, "region {id}"),
            Self::District(id) => write!(f, "district {id}"),
            Self::Zone(id) => write!(f, "zone {id}"),
        }
    }
}

/// Change requested on an existing node. Both are refused once the node
/// is locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeMutation {
    Rename(String),
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_capacities() {
        assert_eq!(HierarchyLevel::Region.capacity(), 9);
        assert_eq!(HierarchyLevel::District.capacity(), 10);
        assert_eq!(HierarchyLevel::Zone.capacity(), 100);
    }

    #[test]
    fn node_ref_serializes_tagged() {
        let id = RegionId::new();
        let json = serde_json::to_value(NodeRef::Region(id)).unwrap();
        assert_eq!(json["level"], "region");
        assert_eq!(json["id"], id.to_string());
    }

    #[test]
    fn new_zone_builder() {
        let req = NewZone::new(Segment::new("001").unwrap())
            .named("Lumley Beach")
            .in_ward("Ward 392")
            .created_by("ops");
        assert_eq!(req.name.as_deref(), Some("Lumley Beach"));
        assert_eq!(req.ward.as_deref(), Some("Ward 392"));
        assert_eq!(req.created_by.as_deref(), Some("ops"));
    }
}
