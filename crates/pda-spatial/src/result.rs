//! # Validation Results
//!
//! One [`ValidationResult`] per check, collected in run order into a
//! [`ValidationReport`]. Results are self-describing (subject plus
//! timestamp) so a caller can persist them as validation log rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pda_core::{PrimaryCode, Timestamp};

/// Which rule a result reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    CoordinateBounds,
    LandCheck,
    ZoneContainment,
    GeohashConsistency,
    GeometryValid,
    ZoneOverlap,
    BoundaryCrossing,
}

impl ValidationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoordinateBounds => "coordinate_bounds",
            Self::LandCheck => "land_check",
            Self::ZoneContainment => "zone_containment",
            Self::GeohashConsistency => "geohash_consistency",
            Self::GeometryValid => "geometry_valid",
            Self::ZoneOverlap => "zone_overlap",
            Self::BoundaryCrossing => "boundary_crossing",
        }
    }
}

impl std::fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Passed,
    Failed,
    /// Suspicious, or not evaluated. Never makes the subject invalid.
    Warning,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Warning => "warning",
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What was validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Subject {
    /// An address point. Raw inputs are kept, even when out of range.
    Point { lat: f64, lon: f64 },
    /// A zone geometry, by zone code.
    Zone { zone_code: PrimaryCode },
}

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub kind: ValidationKind,
    pub status: ValidationStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
    pub subject: Subject,
    pub validated_at: Timestamp,
}

impl ValidationResult {
    fn new(
        kind: ValidationKind,
        status: ValidationStatus,
        subject: &Subject,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            details: Map::new(),
            subject: subject.clone(),
            validated_at: Timestamp::now(),
        }
    }

    pub fn passed(kind: ValidationKind, subject: &Subject, message: impl Into<String>) -> Self {
        Self::new(kind, ValidationStatus::Passed, subject, message)
    }

    pub fn failed(kind: ValidationKind, subject: &Subject, message: impl Into<String>) -> Self {
        Self::new(kind, ValidationStatus::Failed, subject, message)
    }

    pub fn warning(kind: ValidationKind, subject: &Subject, message: impl Into<String>) -> Self {
        Self::new(kind, ValidationStatus::Warning, subject, message)
    }

    /// Attach a detail entry.
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    /// Whether the check could not be evaluated because the geometry engine
    /// failed.
    pub fn is_unchecked(&self) -> bool {
        self.details.get("unchecked") == Some(&Value::Bool(true))
    }
}

/// Ordered results of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ValidationResult) {
        self.results.push(result);
    }

    /// True when no check failed.
    pub fn is_valid(&self) -> bool {
        !self
            .results
            .iter()
            .any(|r| r.status == ValidationStatus::Failed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ValidationResult> {
        self.with_status(ValidationStatus::Failed)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationResult> {
        self.with_status(ValidationStatus::Warning)
    }

    /// Results the geometry engine could not evaluate.
    pub fn unchecked(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| r.is_unchecked())
    }

    /// True when no check failed and every check was actually evaluated.
    pub fn is_fully_checked(&self) -> bool {
        self.is_valid() && self.unchecked().next().is_none()
    }

    fn with_status(&self, status: ValidationStatus) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(move |r| r.status == status)
    }

    /// The result of a given check, if it ran.
    pub fn get(&self, kind: ValidationKind) -> Option<&ValidationResult> {
        self.results.iter().find(|r| r.kind == kind)
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<ValidationResult> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl IntoIterator for ValidationReport {
    type Item = ValidationResult;
    type IntoIter = std::vec::IntoIter<ValidationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> Subject {
        Subject::Point {
            lat: 8.4657,
            lon: -13.2317,
        }
    }

    #[test]
    fn warnings_do_not_invalidate() {
        let mut report = ValidationReport::new();
        report.push(ValidationResult::passed(
            ValidationKind::CoordinateBounds,
            &point(),
            "ok",
        ));
        report.push(ValidationResult::warning(
            ValidationKind::LandCheck,
            &point(),
            "no data",
        ));
        assert!(report.is_valid());
        assert_eq!(report.warnings().count(), 1);

        report.push(ValidationResult::failed(
            ValidationKind::ZoneContainment,
            &point(),
            "outside",
        ));
        assert!(!report.is_valid());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(
            report.get(ValidationKind::ZoneContainment).unwrap().status,
            ValidationStatus::Failed
        );
    }

    #[test]
    fn unchecked_flag() {
        let r = ValidationResult::warning(ValidationKind::LandCheck, &point(), "engine down")
            .with_detail("unchecked", true);
        assert!(r.is_unchecked());
        let r = ValidationResult::warning(ValidationKind::LandCheck, &point(), "no data");
        assert!(!r.is_unchecked());
    }

    #[test]
    fn unchecked_results_are_not_fully_checked() {
        let mut report = ValidationReport::new();
        report.push(ValidationResult::passed(ValidationKind::CoordinateBounds, &point(), "ok"));
        report.push(ValidationResult::warning(ValidationKind::LandCheck, &point(), "no data"));
        assert!(report.is_fully_checked());

        report.push(
            ValidationResult::warning(ValidationKind::ZoneContainment, &point(), "engine down")
                .with_detail("unchecked", true),
        );
        assert!(report.is_valid());
        assert!(!report.is_fully_checked());
        assert_eq!(report.unchecked().count(), 1);
    }

    #[test]
    fn serialized_shape() {
        let r = ValidationResult::warning(ValidationKind::ZoneContainment, &point(), "moved")
            .with_detail("found_zone", "1105");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["kind"], "zone_containment");
        assert_eq!(json["status"], "warning");
        assert_eq!(json["details"]["found_zone"], "1105");
        assert_eq!(json["subject"]["type"], "point");

        let passed = ValidationResult::passed(ValidationKind::LandCheck, &point(), "ok");
        let json = serde_json::to_value(&passed).unwrap();
        assert!(json.get("details").is_none());
    }
}
