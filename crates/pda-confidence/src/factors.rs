//! Individual factor scores. Each function returns a value in `[0, 1]`.

use serde::{Deserialize, Serialize};

use pda_core::Timestamp;

use crate::method::VerificationMethod;

/// Score used when an input is missing or unusable.
pub const UNKNOWN_SCORE: f64 = 0.3;

/// Delivery-success score when there is no delivery history.
pub const NO_HISTORY_SCORE: f64 = 0.5;

/// The five factor scores behind an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Factors {
    pub gps_accuracy: f64,
    pub verification_method: f64,
    pub completeness: f64,
    pub recency: f64,
    pub delivery_success: f64,
}

/// Descriptive address fields considered for completeness. Blank values
/// count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletenessFields {
    pub street_name: Option<String>,
    pub landmark_primary: Option<String>,
    pub block: Option<String>,
    pub house_number: Option<String>,
    pub building_name: Option<String>,
    pub delivery_instructions: Option<String>,
}

impl CompletenessFields {
    fn required(&self) -> [&Option<String>; 2] {
        [&self.street_name, &self.landmark_primary]
    }

    fn optional(&self) -> [&Option<String>; 4] {
        [
            &self.block,
            &self.house_number,
            &self.building_name,
            &self.delivery_instructions,
        ]
    }
}

fn present_fraction(fields: &[&Option<String>]) -> f64 {
    let present = fields
        .iter()
        .filter(|f| f.as_deref().is_some_and(|v| !v.trim().is_empty()))
        .count();
    present as f64 / fields.len() as f64
}

/// GPS accuracy in metres: ≤5 → 1.0, ≤10 → 0.8, ≤25 → 0.5, worse → 0.2.
/// Unknown, negative or non-finite accuracy → 0.3.
pub fn gps_accuracy(accuracy_m: Option<f64>) -> f64 {
    match accuracy_m {
        Some(a) if a.is_finite() && a >= 0.0 => {
            if a <= 5.0 {
                1.0
            } else if a <= 10.0 {
                0.8
            } else if a <= 25.0 {
                0.5
            } else {
                0.2
            }
        }
        _ => UNKNOWN_SCORE,
    }
}

/// Verification method lookup; no method recorded → 0.3.
pub fn verification_method(method: Option<&VerificationMethod>) -> f64 {
    method.map_or(UNKNOWN_SCORE, VerificationMethod::score)
}

/// 60% for the required group, 40% for the optional group, each the
/// fraction of its fields present.
pub fn completeness(fields: &CompletenessFields) -> f64 {
    present_fraction(&fields.required()) * 0.6 + present_fraction(&fields.optional()) * 0.4
}

/// Age of the record at `now`: ≤180 days → 1.0, ≤365 → 0.8, ≤730 → 0.5,
/// older → 0.3. Unknown → 0.3. Future timestamps count as fresh.
pub fn recency(updated_at: Option<&Timestamp>, now: &Timestamp) -> f64 {
    let Some(updated_at) = updated_at else {
        return UNKNOWN_SCORE;
    };
    let age = updated_at.age_at(now);
    if age <= chrono::Duration::days(180) {
        1.0
    } else if age <= chrono::Duration::days(365) {
        0.8
    } else if age <= chrono::Duration::days(730) {
        0.5
    } else {
        0.3
    }
}

/// Historical delivery success rate, clamped to `[0, 1]`. No history or a
/// non-finite rate → 0.5.
pub fn delivery_success(rate: Option<f64>) -> f64 {
    match rate {
        Some(r) if r.is_finite() => r.clamp(0.0, 1.0),
        _ => NO_HISTORY_SCORE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gps_tiers() {
        assert_eq!(gps_accuracy(Some(0.0)), 1.0);
        assert_eq!(gps_accuracy(Some(5.0)), 1.0);
        assert_eq!(gps_accuracy(Some(5.1)), 0.8);
        assert_eq!(gps_accuracy(Some(10.0)), 0.8);
        assert_eq!(gps_accuracy(Some(25.0)), 0.5);
        assert_eq!(gps_accuracy(Some(25.5)), 0.2);
        assert_eq!(gps_accuracy(None), 0.3);
        assert_eq!(gps_accuracy(Some(f64::NAN)), 0.3);
        assert_eq!(gps_accuracy(Some(-1.0)), 0.3);
    }

    #[test]
    fn completeness_weights_groups() {
        let mut f = CompletenessFields::default();
        assert_eq!(completeness(&f), 0.0);

        f.street_name = Some("Wilkinson Road".into());
        assert!((completeness(&f) - 0.3).abs() < 1e-9);

        f.landmark_primary = Some("Near Lumley roundabout".into());
        f.house_number = Some("12".into());
        assert!((completeness(&f) - 0.7).abs() < 1e-9);

        f.block = Some(" ".into());
        assert!((completeness(&f) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn recency_tiers() {
        let now = Timestamp::parse("2026-06-01T00:00:00Z").unwrap();
        assert_eq!(recency(Some(&now.days_before(10)), &now), 1.0);
        assert_eq!(recency(Some(&now.days_before(180)), &now), 1.0);
        assert_eq!(recency(Some(&now.days_before(181)), &now), 0.8);
        assert_eq!(recency(Some(&now.days_before(365)), &now), 0.8);
        assert_eq!(recency(Some(&now.days_before(700)), &now), 0.5);
        assert_eq!(recency(Some(&now.days_before(731)), &now), 0.3);
        assert_eq!(recency(None, &now), 0.3);
        assert_eq!(recency(Some(&now.days_before(-5)), &now), 1.0);
    }

    #[test]
    fn delivery_rate_is_clamped() {
        assert_eq!(delivery_success(None), 0.5);
        assert_eq!(delivery_success(Some(0.92)), 0.92);
        assert_eq!(delivery_success(Some(1.7)), 1.0);
        assert_eq!(delivery_success(Some(-0.2)), 0.0);
        assert_eq!(delivery_success(Some(f64::INFINITY)), 0.5);
    }
}
