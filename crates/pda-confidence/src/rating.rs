//! Discrete rating buckets and the delivery guidance attached to them.

use serde::{Deserialize, Serialize};

/// Rating bucket for an aggregate confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rating {
    /// Below 0.30.
    Unverified,
    /// 0.30 to 0.49.
    Uncertain,
    /// 0.50 to 0.69.
    Probable,
    /// 0.70 to 0.89.
    Reliable,
    /// 0.90 and above.
    Verified,
}

impl Rating {
    pub fn for_score(score: f64) -> Self {
        if score >= 0.90 {
            Self::Verified
        } else if score >= 0.70 {
            Self::Reliable
        } else if score >= 0.50 {
            Self::Probable
        } else if score >= 0.30 {
            Self::Uncertain
        } else {
            Self::Unverified
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::Reliable => "RELIABLE",
            Self::Probable => "PROBABLE",
            Self::Uncertain => "UNCERTAIN",
            Self::Unverified => "UNVERIFIED",
        }
    }

    /// What a courier should do with an address in this bucket.
    pub fn recommendation(&self) -> DeliveryRecommendation {
        let (can_deliver, call_before_delivery, additional_verification, message) = match self {
            Self::Verified => (true, false, false, "Full confidence - proceed with delivery"),
            Self::Reliable => (true, false, false, "Standard delivery"),
            Self::Probable => (true, true, false, "Customer callback recommended"),
            Self::Uncertain => (true, true, true, "Agent verification required"),
            Self::Unverified => (false, true, true, "Hold for manual review"),
        };
        DeliveryRecommendation {
            can_deliver,
            call_before_delivery,
            additional_verification,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery guidance derived from a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecommendation {
    pub can_deliver: bool,
    pub call_before_delivery: bool,
    pub additional_verification: bool,
    pub message: String,
}

impl DeliveryRecommendation {
    pub fn for_score(score: f64) -> Self {
        Rating::for_score(score).recommendation()
    }
}
