//! # Score Subcommand
//!
//! Confidence score of one address record, from flags or a JSON file.
//! Flags override values read from the file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pda_confidence::{ConfidenceInputs, ConfidenceScorer, VerificationMethod};
use pda_core::Timestamp;

/// Arguments for the `pda score` subcommand.
#[derive(Args, Debug, Default)]
pub struct ScoreArgs {
    /// JSON file holding the record's inputs.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// GPS accuracy in metres.
    #[arg(long)]
    pub gps_accuracy_m: Option<f64>,

    /// field_survey, photo_verified, user_submitted, crowdsourced or imported.
    #[arg(long)]
    pub method: Option<String>,

    #[arg(long)]
    pub street_name: Option<String>,

    #[arg(long)]
    pub landmark: Option<String>,

    #[arg(long)]
    pub block: Option<String>,

    #[arg(long)]
    pub house_number: Option<String>,

    #[arg(long)]
    pub building_name: Option<String>,

    #[arg(long)]
    pub delivery_instructions: Option<String>,

    /// Last update, RFC 3339.
    #[arg(long)]
    pub updated_at: Option<String>,

    /// Historical delivery success rate, 0-1.
    #[arg(long)]
    pub delivery_success_rate: Option<f64>,

    /// Score as of this instant (RFC 3339) instead of now.
    #[arg(long)]
    pub now: Option<String>,
}

pub fn run_score(args: &ScoreArgs) -> Result<u8> {
    let inputs = build_inputs(args)?;
    let scorer = ConfidenceScorer::new();
    let score = match &args.now {
        Some(now) => scorer.score_at(&inputs, &Timestamp::parse(now)?),
        None => scorer.score(&inputs),
    };
    tracing::debug!(score = score.score, rating = %score.rating.as_str(), "record scored");
    crate::print_json(&score)?;
    Ok(0)
}

fn build_inputs(args: &ScoreArgs) -> Result<ConfidenceInputs> {
    let mut inputs = match &args.input {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ConfidenceInputs::default(),
    };

    if args.gps_accuracy_m.is_some() {
        inputs.gps_accuracy_m = args.gps_accuracy_m;
    }
    if let Some(method) = &args.method {
        inputs.verification_method = Some(VerificationMethod::from_label(method));
    }
    let fields = &mut inputs.fields;
    for (flag, slot) in [
        (&args.street_name, &mut fields.street_name),
        (&args.landmark, &mut fields.landmark_primary),
        (&args.block, &mut fields.block),
        (&args.house_number, &mut fields.house_number),
        (&args.building_name, &mut fields.building_name),
        (&args.delivery_instructions, &mut fields.delivery_instructions),
    ] {
        if flag.is_some() {
            slot.clone_from(flag);
        }
    }
    if let Some(updated_at) = &args.updated_at {
        inputs.updated_at = Some(Timestamp::parse(updated_at)?);
    }
    if args.delivery_success_rate.is_some() {
        inputs.delivery_success_rate = args.delivery_success_rate;
    }
    Ok(inputs)
}
