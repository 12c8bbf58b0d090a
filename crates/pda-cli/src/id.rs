//! # Id Subcommand
//!
//! Build PDA-IDs from their parts and take them apart again.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::{json, Value};

use pda_core::{PdaId, PrimaryCode, Segment};

/// Arguments for the `pda id` subcommand.
#[derive(Args, Debug)]
pub struct IdArgs {
    #[command(subcommand)]
    pub command: IdCommand,
}

#[derive(Subcommand, Debug)]
pub enum IdCommand {
    /// Build the PDA-ID for a zone, segment and sequence number.
    Generate {
        /// 4-digit primary code, e.g. 2310.
        #[arg(long)]
        zone: String,
        /// 3-digit delivery segment, e.g. 047.
        #[arg(long)]
        segment: String,
        /// Sequence number, 1-999999.
        #[arg(long)]
        sequence: u32,
    },
    /// Parse and verify a PDA-ID.
    Parse { text: String },
}

pub fn run_id(args: &IdArgs) -> Result<u8> {
    match &args.command {
        IdCommand::Generate {
            zone,
            segment,
            sequence,
        } => {
            let zone = PrimaryCode::new(zone.as_str())?;
            let segment = Segment::new(segment.as_str())?;
            let id = PdaId::generate(&zone, &segment, *sequence)?;
            crate::print_json(&describe(&id))?;
            Ok(0)
        }
        IdCommand::Parse { text } => match PdaId::parse(text) {
            Ok(id) => {
                crate::print_json(&describe(&id))?;
                Ok(0)
            }
            Err(e) => {
                tracing::debug!(error = %e, "PDA-ID rejected");
                crate::print_json(&json!({
                    "input": text,
                    "valid": false,
                    "error": e.to_string(),
                }))?;
                Ok(1)
            }
        },
    }
}

fn describe(id: &PdaId) -> Value {
    json!({
        "pda_id": id,
        "valid": true,
        "country": id.country(),
        "primary_code": id.primary_code(),
        "region_code": id.primary_code().region_code(),
        "district_code": id.primary_code().district_code(),
        "zone_number": id.primary_code().zone_number(),
        "segment": id.segment(),
        "segment_type": id.segment().segment_type(),
        "zone_code": id.zone_code().to_string(),
        "sequence": id.sequence(),
        "check_digit": id.check_digit(),
    })
}
