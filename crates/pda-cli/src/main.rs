//! # pda CLI entry point
//!
//! Parses command-line arguments, installs logging, and dispatches to the
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pda_cli::checksum::{run_checksum, ChecksumArgs};
use pda_cli::demo::{run_demo, DemoArgs};
use pda_cli::geohash::{run_geohash, GeohashArgs};
use pda_cli::id::{run_id, IdArgs};
use pda_cli::score::{run_score, ScoreArgs};

/// Postal Digital Address toolkit for Sierra Leone.
///
/// Geohash and PDA-ID codecs, Luhn check digits, address confidence
/// scoring, and an in-memory demo of the addressing engine.
#[derive(Parser, Debug)]
#[command(name = "pda", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Engine configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode, decode and explore geohash cells.
    Geohash(GeohashArgs),

    /// Generate or parse PDA-IDs.
    Id(IdArgs),

    /// Compute or validate Luhn check digits.
    Checksum(ChecksumArgs),

    /// Score the confidence of an address record.
    Score(ScoreArgs),

    /// Run the engine end to end against a mock geometry engine.
    Demo(DemoArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let result = match &cli.command {
        Commands::Geohash(args) => run_geohash(args),
        Commands::Id(args) => run_id(args),
        Commands::Checksum(args) => run_checksum(args),
        Commands::Score(args) => run_score(args),
        Commands::Demo(args) => run_demo(args, cli.config.as_deref()),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pda_cli::geohash::GeohashCommand;
    use pda_cli::id::IdCommand;

    #[test]
    fn parse_geohash_encode_with_negative_longitude() {
        let cli = Cli::try_parse_from([
            "pda", "geohash", "encode", "--lat", "8.4657", "--lon", "-13.2317",
        ])
        .unwrap();
        let Commands::Geohash(args) = cli.command else {
            panic!("expected geohash");
        };
        match args.command {
            GeohashCommand::Encode {
                lat,
                lon,
                precision,
            } => {
                assert_eq!(lat, 8.4657);
                assert_eq!(lon, -13.2317);
                assert_eq!(precision, 9);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_id_generate() {
        let cli = Cli::try_parse_from([
            "pda", "id", "generate", "--zone", "2310", "--segment", "047", "--sequence", "142",
        ])
        .unwrap();
        let Commands::Id(args) = cli.command else {
            panic!("expected id");
        };
        assert!(matches!(
            args.command,
            IdCommand::Generate { sequence: 142, .. }
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["pda", "demo", "-vv", "--log-json", "--count", "5"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        let Commands::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(args.count, 5);
    }

    #[test]
    fn score_flags() {
        let cli = Cli::try_parse_from([
            "pda",
            "score",
            "--gps-accuracy-m",
            "4.5",
            "--method",
            "field_survey",
            "--street-name",
            "Wilkinson Road",
        ])
        .unwrap();
        let Commands::Score(args) = cli.command else {
            panic!("expected score");
        };
        assert_eq!(args.gps_accuracy_m, Some(4.5));
        assert_eq!(args.method.as_deref(), Some("field_survey"));
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["pda"]).is_err());
    }
}
