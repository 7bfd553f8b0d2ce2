use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CredenceError, Result};

/// Source category of an evidence item.
///
/// The base weight reflects conventional source reliability; `Unknown`
/// carries the documented 0.6 default for unrecognized types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    PrimarySource,
    PeerReviewed,
    GovernmentDocument,
    SecondarySource,
    TertiarySource,
    Opinion,
    SocialMedia,
    Unknown,
}

impl EvidenceType {
    pub fn base_weight(&self) -> f64 {
        match self {
            Self::PrimarySource => 1.0,
            Self::PeerReviewed => 0.9,
            Self::GovernmentDocument => 0.85,
            Self::SecondarySource => 0.7,
            Self::TertiarySource => 0.6,
            Self::Opinion => 0.4,
            Self::SocialMedia => 0.3,
            Self::Unknown => 0.6,
        }
    }
}

/// A single piece of evidence entering the aggregation loop.
///
/// Immutable once created; the controller retains it read-only in the
/// per-item records after consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    pub content: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub claimed_reliability: f64,
    pub evidence_type: EvidenceType,
    #[serde(default)]
    pub domain: Option<String>,
}

impl Evidence {
    pub fn new(id: impl Into<String>, content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            source: source.into(),
            timestamp: Utc::now(),
            claimed_reliability: 0.5,
            evidence_type: EvidenceType::Unknown,
            domain: None,
        }
    }

    pub fn with_type(mut self, evidence_type: EvidenceType) -> Self {
        self.evidence_type = evidence_type;
        self
    }

    pub fn with_reliability(mut self, reliability: f64) -> Self {
        self.claimed_reliability = reliability;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Age in fractional days relative to a caller-pinned reference time.
    /// Future-dated evidence counts as age zero.
    pub fn age_days(&self, reference: DateTime<Utc>) -> f64 {
        let secs = (reference - self.timestamp).num_seconds();
        (secs.max(0) as f64) / 86_400.0
    }

    /// Structural validation at the ingestion boundary. A failure here is a
    /// `Data` error: the controller degrades the record, it never aborts
    /// the batch.
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(CredenceError::Data(format!(
                "evidence '{}' has empty content",
                self.id
            )));
        }
        if !self.claimed_reliability.is_finite()
            || !(0.0..=1.0).contains(&self.claimed_reliability)
        {
            return Err(CredenceError::Data(format!(
                "evidence '{}' claimed_reliability {} outside [0, 1]",
                self.id, self.claimed_reliability
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_type_weights_in_range() {
        for t in [
            EvidenceType::PrimarySource,
            EvidenceType::PeerReviewed,
            EvidenceType::GovernmentDocument,
            EvidenceType::SecondarySource,
            EvidenceType::TertiarySource,
            EvidenceType::Opinion,
            EvidenceType::SocialMedia,
            EvidenceType::Unknown,
        ] {
            let w = t.base_weight();
            assert!((0.0..=1.0).contains(&w));
        }
        assert!((EvidenceType::Unknown.base_weight() - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_age_days() {
        let now = Utc::now();
        let e = Evidence::new("e1", "text", "src").with_timestamp(now - Duration::days(365));
        assert!((e.age_days(now) - 365.0).abs() < 0.01);

        // Future-dated evidence is not negative-aged
        let future = Evidence::new("e2", "text", "src").with_timestamp(now + Duration::days(10));
        assert_eq!(future.age_days(now), 0.0);
    }

    #[test]
    fn test_validate_rejects_empty_content() {
        let e = Evidence::new("e1", "   ", "src");
        assert!(e.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_reliability() {
        let e = Evidence::new("e1", "text", "src").with_reliability(f64::NAN);
        assert!(e.validate().is_err());
        let e = Evidence::new("e2", "text", "src").with_reliability(1.5);
        assert!(e.validate().is_err());
    }

    #[test]
    fn test_serde_snake_case_type() {
        let e = Evidence::new("e1", "text", "src").with_type(EvidenceType::PeerReviewed);
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("peer_reviewed"));
    }
}
