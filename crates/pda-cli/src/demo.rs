//! # Demo Subcommand
//!
//! Runs the whole engine in memory: allocates a Western Area hierarchy,
//! mints PDA-IDs, validates sample points and a zone geometry against a
//! mock geometry engine, and prints everything as one JSON document.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde_json::{json, Value};

use pda_confidence::{CompletenessFields, ConfidenceInputs, VerificationMethod};
use pda_core::{BoundingBox, GeometryId, PrimaryCode, Segment, Timestamp};
use pda_registry::{NewDistrict, NewRegion, NewZone};
use pda_service::{EngineConfig, PostalService};
use pda_spatial::MockGeometryEngine;

/// Arguments for the `pda demo` subcommand.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// PDA-IDs to mint in the first zone.
    #[arg(long, default_value_t = 3)]
    pub count: u32,
}

pub fn run_demo(args: &DemoArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = match config_path {
        Some(path) => EngineConfig::from_yaml_file(path)?,
        None => EngineConfig::from_env()?,
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let report = runtime.block_on(demo(config, args.count))?;
    crate::print_json(&report)?;
    Ok(0)
}

fn bbox(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Result<BoundingBox> {
    Ok(BoundingBox::new(min_lat, min_lon, max_lat, max_lon)?)
}

fn freetown_engine() -> Result<MockGeometryEngine> {
    Ok(MockGeometryEngine::new()
        .with_land("land:western-area", bbox(8.20, -13.30, 8.55, -12.90)?)
        .with_zone(
            PrimaryCode::new("1000")?,
            "Central Business District",
            "Western Area Urban",
            bbox(8.47, -13.25, 8.478, -13.235)?,
        )
        .with_zone(
            PrimaryCode::new("1001")?,
            "Tower Hill",
            "Western Area Urban",
            bbox(8.475, -13.235, 8.49, -13.22)?,
        )
        .with_ward("392", "Ward 392", bbox(8.46, -13.26, 8.48, -13.24)?)
        .with_geometry("survey:1001", bbox(8.476, -13.234, 8.489, -13.221)?))
}

async fn demo(config: EngineConfig, count: u32) -> Result<Value> {
    let service = PostalService::new(config, Arc::new(freetown_engine()?));

    let region = service.allocate_region(NewRegion::new("Western Area", "WA").created_by("demo"))?;
    let district = service.allocate_district(
        region.id,
        NewDistrict::new("Western Area Urban", "WAU").created_by("demo"),
    )?;
    let cbd = service.allocate_zone(
        district.id,
        NewZone::new(Segment::new("500")?)
            .named("Central Business District")
            .created_by("demo"),
    )?;
    let tower_hill = service.allocate_zone(
        district.id,
        NewZone::new(Segment::new("001")?)
            .named("Tower Hill")
            .created_by("demo"),
    )?;

    let mut ids = Vec::new();
    for _ in 0..count {
        ids.push(service.mint_pda_id(cbd.id)?);
    }

    let mut points = Vec::new();
    for (label, lat, lon, expected) in [
        ("inside expected zone", 8.474, -13.242, Some(&cbd.primary_code)),
        ("inside neighbouring zone", 8.48, -13.228, Some(&cbd.primary_code)),
        ("outside every zone", 8.40, -13.10, None),
        ("at sea", 8.00, -13.40, None),
        ("outside the country", 51.5, -0.12, None),
    ] {
        let report = service.validate_point(lat, lon, expected).await;
        points.push(json!({
            "label": label,
            "valid": report.is_valid(),
            "results": report,
        }));
    }

    let geometry = service
        .assign_zone_geometry(tower_hill.id, GeometryId::new("survey:1001")?)
        .await?;
    let nearest = service.find_nearest_zone(8.46, -13.24, None).await?;
    let gaps = service.detect_coverage_gaps(Some("Western Area Urban")).await?;

    let record = ConfidenceInputs {
        gps_accuracy_m: Some(6.5),
        verification_method: Some(VerificationMethod::PhotoVerified),
        fields: CompletenessFields {
            street_name: Some("Siaka Stevens Street".into()),
            landmark_primary: Some("Cotton Tree".into()),
            ..Default::default()
        },
        updated_at: Some(Timestamp::now()),
        delivery_success_rate: None,
    };

    Ok(json!({
        "hierarchy": {
            "region": region,
            "district": district,
            "zones": service.hierarchy().zones_of(district.id),
        },
        "pda_ids": ids,
        "point_validation": points,
        "zone_geometry": {
            "zone": tower_hill.primary_code,
            "valid": geometry.is_valid(),
            "results": geometry,
        },
        "nearest_zone": nearest,
        "coverage_gaps": gaps.len(),
        "confidence": service.score_confidence(&record),
    }))
}
