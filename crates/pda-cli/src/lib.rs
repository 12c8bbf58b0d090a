//! # pda-cli: Command-Line Interface for the PDA Engine
//!
//! Offline access to the codecs and the scorer, plus a self-contained demo
//! of the full allocation, minting and validation flow.
//!
//! ## Subcommands
//!
//! - `pda geohash`: Encode, decode, neighbors and radius cover.
//! - `pda id`: Generate and parse PDA-IDs.
//! - `pda checksum`: Luhn check digit computation and validation.
//! - `pda score`: Confidence score of an address record.
//! - `pda demo`: In-memory hierarchy and mock geometry engine, end to end.
//!
//! ```bash
//! pda geohash encode --lat 8.4657 --lon -13.2317
//! pda id generate --zone 2310 --segment 047 --sequence 142
//! pda id parse SL-2310-047-000142-2
//! pda score --gps-accuracy-m 4 --method field_survey --street-name "Siaka Stevens Street"
//! ```
//!
//! ## Crate Policy
//!
//! - Results go to stdout as pretty JSON; logs go to stderr.
//! - Handlers return the process exit code: 0 on success, 1 when the input
//!   was rejected (an invalid ID, a failed checksum). Errors exit with 2.
//! - Business logic lives in the library crates, not here.

pub mod checksum;
pub mod demo;
pub mod geohash;
pub mod id;
pub mod score;

use serde::Serialize;

/// Print a value to stdout as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
