//! # Confidence Scorer
//!
//! Combines the five factor scores into a rounded aggregate.
//! [`ConfidenceScorer::score_at`] is deterministic for a given `now`;
//! [`ConfidenceScorer::score`] reads the clock.

use serde::{Deserialize, Serialize};

use pda_core::Timestamp;

use crate::factors::{self, CompletenessFields, Factors};
use crate::method::VerificationMethod;
use crate::rating::{DeliveryRecommendation, Rating};

/// Everything the scorer looks at. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceInputs {
    pub gps_accuracy_m: Option<f64>,
    pub verification_method: Option<VerificationMethod>,
    #[serde(flatten)]
    pub fields: CompletenessFields,
    pub updated_at: Option<Timestamp>,
    pub delivery_success_rate: Option<f64>,
}

/// Factor weights. They sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub gps_accuracy: f64,
    pub verification_method: f64,
    pub completeness: f64,
    pub recency: f64,
    pub delivery_success: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            gps_accuracy: 0.25,
            verification_method: 0.25,
            completeness: 0.20,
            recency: 0.15,
            delivery_success: 0.15,
        }
    }
}

impl Weights {
    fn apply(&self, f: &Factors) -> f64 {
        f.gps_accuracy * self.gps_accuracy
            + f.verification_method * self.verification_method
            + f.completeness * self.completeness
            + f.recency * self.recency
            + f.delivery_success * self.delivery_success
    }
}

/// Result of scoring one address record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    /// Weighted aggregate, rounded to two decimals, in `[0, 1]`.
    pub score: f64,
    pub rating: Rating,
    pub recommendation: DeliveryRecommendation,
    pub factors: Factors,
}

/// Stateless scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfidenceScorer {
    weights: Weights,
}

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Compute the five factor scores as of `now`.
    pub fn factors_at(&self, inputs: &ConfidenceInputs, now: &Timestamp) -> Factors {
        Factors {
            gps_accuracy: factors::gps_accuracy(inputs.gps_accuracy_m),
            verification_method: factors::verification_method(inputs.verification_method.as_ref()),
            completeness: factors::completeness(&inputs.fields),
            recency: factors::recency(inputs.updated_at.as_ref(), now),
            delivery_success: factors::delivery_success(inputs.delivery_success_rate),
        }
    }

    /// Score a record as of `now`.
    pub fn score_at(&self, inputs: &ConfidenceInputs, now: &Timestamp) -> ConfidenceScore {
        let factors = self.factors_at(inputs, now);
        let score = round2(self.weights.apply(&factors)).clamp(0.0, 1.0);
        let rating = Rating::for_score(score);
        ConfidenceScore {
            score,
            rating,
            recommendation: rating.recommendation(),
            factors,
        }
    }

    /// Score a record as of the current time.
    pub fn score(&self, inputs: &ConfidenceInputs) -> ConfidenceScore {
        self.score_at(inputs, &Timestamp::now())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn opt_text() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[ a-z]{0,8}")
    }

    proptest! {
        /// The aggregate and every factor stay in [0, 1] for any input.
        #[test]
        fn score_is_bounded(
            gps in proptest::option::of(proptest::num::f64::ANY),
            rate in proptest::option::of(proptest::num::f64::ANY),
            days in proptest::option::of(-1000i64..5000),
            label in proptest::option::of("[a-z_]{0,14}"),
            street in opt_text(),
            landmark in opt_text(),
            block in opt_text(),
        ) {
            let now = Timestamp::parse("2026-06-01T00:00:00Z").unwrap();
            let inputs = ConfidenceInputs {
                gps_accuracy_m: gps,
                verification_method: label.map(|l| VerificationMethod::from_label(&l)),
                fields: CompletenessFields {
                    street_name: street,
                    landmark_primary: landmark,
                    block,
                    ..CompletenessFields::default()
                },
                updated_at: days.map(|d| now.days_before(d)),
                delivery_success_rate: rate,
            };
            let s = ConfidenceScorer::new().score_at(&inputs, &now);
            prop_assert!((0.0..=1.0).contains(&s.score));
            for f in [
                s.factors.gps_accuracy,
                s.factors.verification_method,
                s.factors.completeness,
                s.factors.recency,
                s.factors.delivery_success,
            ] {
                prop_assert!((0.0..=1.0).contains(&f));
            }
            prop_assert_eq!(s.rating, Rating::for_score(s.score));
        }
    }
}
