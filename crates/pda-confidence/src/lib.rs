//! # pda-confidence: Address Confidence Scoring
//!
//! Rates how far an address record can be trusted for delivery. Five factor
//! scores, each in `[0, 1]`, are combined with fixed weights:
//!
//! | Factor | Weight |
//! |---|---|
//! | GPS accuracy | 0.25 |
//! | Verification method | 0.25 |
//! | Completeness | 0.20 |
//! | Recency | 0.15 |
//! | Delivery success | 0.15 |
//!
//! The aggregate is rounded to two decimals and bucketed into a [`Rating`]
//! and a [`DeliveryRecommendation`]. Everything here is pure: no I/O, no
//! shared state, safe on any thread.

pub mod factors;
pub mod method;
pub mod rating;
pub mod scorer;

pub use factors::{CompletenessFields, Factors};
pub use method::VerificationMethod;
pub use rating::{DeliveryRecommendation, Rating};
pub use scorer::{ConfidenceInputs, ConfidenceScore, ConfidenceScorer, Weights};
