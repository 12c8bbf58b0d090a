//! # Geohash Subcommand
//!
//! Encode coordinates, decode cells, list neighbors and cover a radius.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use pda_core::geohash::{self, GeoHash, ADDRESS_PRECISION};
use pda_core::GeoPoint;

/// Arguments for the `pda geohash` subcommand.
#[derive(Args, Debug)]
pub struct GeohashArgs {
    #[command(subcommand)]
    pub command: GeohashCommand,
}

#[derive(Subcommand, Debug)]
pub enum GeohashCommand {
    /// Encode a coordinate pair.
    Encode {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Characters in the hash (1-12).
        #[arg(long, default_value_t = ADDRESS_PRECISION)]
        precision: usize,
    },
    /// Decode a geohash to its center and cell bounds.
    Decode { geohash: String },
    /// List the eight surrounding cells.
    Neighbors { geohash: String },
    /// Cells whose centers lie within a radius of a point.
    Cover {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        radius_m: f64,
        /// Defaults to the coarsest precision finer than the radius.
        #[arg(long)]
        precision: Option<usize>,
    },
}

pub fn run_geohash(args: &GeohashArgs) -> Result<u8> {
    match &args.command {
        GeohashCommand::Encode {
            lat,
            lon,
            precision,
        } => {
            let hash = geohash::encode(*lat, *lon, *precision)?;
            crate::print_json(&json!({
                "geohash": hash,
                "precision": hash.precision(),
                "bounds": hash.bounds(),
            }))?;
        }
        GeohashCommand::Decode { geohash: raw } => {
            let hash = GeoHash::new(raw.as_str())?;
            crate::print_json(&json!({
                "geohash": hash,
                "center": geohash::decode_center(&hash),
                "bounds": geohash::decode(&hash),
            }))?;
        }
        GeohashCommand::Neighbors { geohash: raw } => {
            let hash = GeoHash::new(raw.as_str())?;
            crate::print_json(&geohash::neighbors(&hash))?;
        }
        GeohashCommand::Cover {
            lat,
            lon,
            radius_m,
            precision,
        } => {
            let center = GeoPoint::new(*lat, *lon)?;
            let cells = geohash::geohashes_in_radius(&center, *radius_m, *precision)?;
            tracing::debug!(cells = cells.len(), "radius covered");
            crate::print_json(&json!({ "count": cells.len(), "geohashes": cells }))?;
        }
    }
    Ok(0)
}
