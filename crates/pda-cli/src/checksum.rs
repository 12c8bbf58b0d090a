//! # Checksum Subcommand
//!
//! Luhn check digits over raw digit strings.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use pda_core::checksum;

/// Arguments for the `pda checksum` subcommand.
#[derive(Args, Debug)]
pub struct ChecksumArgs {
    #[command(subcommand)]
    pub command: ChecksumCommand,
}

#[derive(Subcommand, Debug)]
pub enum ChecksumCommand {
    /// Compute the check digit of a payload.
    Compute {
        /// Decimal digits, e.g. 2310047000142.
        digits: String,
    },
    /// Validate a digit string whose last digit is the check digit.
    Validate {
        /// Payload followed by its check digit.
        digits: String,
    },
}

pub fn run_checksum(args: &ChecksumArgs) -> Result<u8> {
    match &args.command {
        ChecksumCommand::Compute { digits } => {
            let check_digit = checksum::compute_check_digit(digits)?;
            crate::print_json(&json!({
                "payload": digits,
                "check_digit": check_digit,
                "full": format!("{digits}{check_digit}"),
            }))?;
            Ok(0)
        }
        ChecksumCommand::Validate { digits } => {
            let valid = checksum::validate(digits);
            crate::print_json(&json!({ "digits": digits, "valid": valid }))?;
            Ok(if valid { 0 } else { 1 })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(command: ChecksumCommand) -> Result<u8> {
        run_checksum(&ChecksumArgs { command })
    }

    #[test]
    fn exit_codes() {
        assert_eq!(run(ChecksumCommand::Validate { digits: "23100470001422".into() }).unwrap(), 0);
        assert_eq!(run(ChecksumCommand::Validate { digits: "23100470001427".into() }).unwrap(), 1);
        assert_eq!(run(ChecksumCommand::Compute { digits: "2310047000142".into() }).unwrap(), 0);
        assert!(run(ChecksumCommand::Compute { digits: "23a0".into() }).is_err());
    }
}
