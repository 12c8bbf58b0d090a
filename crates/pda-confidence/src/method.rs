//! How an address was verified.

use serde::{Deserialize, Serialize};

/// Verification method recorded for an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// Visited and confirmed by a surveyor.
    FieldSurvey,
    /// Confirmed from a geotagged photo.
    PhotoVerified,
    /// Entered by the resident.
    UserSubmitted,
    /// Aggregated from community reports.
    Crowdsourced,
    /// Bulk-imported from an external dataset.
    Imported,
    /// Any other label; scored like an unknown method.
    #[serde(untagged)]
    Other(String),
}

impl VerificationMethod {
    /// Parse a stored label. Unrecognised labels become [`Self::Other`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "field_survey" => Self::FieldSurvey,
            "photo_verified" => Self::PhotoVerified,
            "user_submitted" => Self::UserSubmitted,
            "crowdsourced" => Self::Crowdsourced,
            "imported" => Self::Imported,
            _ => Self::Other(label.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::FieldSurvey => "field_survey",
            Self::PhotoVerified => "photo_verified",
            Self::UserSubmitted => "user_submitted",
            Self::Crowdsourced => "crowdsourced",
            Self::Imported => "imported",
            Self::Other(label) => label,
        }
    }

    /// Factor score for this method.
    pub fn score(&self) -> f64 {
        match self {
            Self::FieldSurvey => 1.0,
            Self::PhotoVerified => 0.8,
            Self::UserSubmitted => 0.5,
            Self::Imported => 0.4,
            Self::Crowdsourced | Self::Other(_) => 0.3,
        }
    }
}

impl std::fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VerificationMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}
