//! Collaborator seams for the external quality and likelihood assessors.
//!
//! Both are dependency-injected into the controller; there is no shared
//! global client. Implementations are expected to validate their own model
//! output and surface malformed responses as `AssessorError::Malformed`.

use async_trait::async_trait;

use crate::assessment::{LikelihoodAssessment, QualityAssessment};
use crate::error::AssessorError;
use crate::evidence::Evidence;

/// Judges the quality of a raw evidence item.
#[async_trait]
pub trait EvidenceQualityAssessor: Send + Sync {
    async fn assess(&self, evidence: &Evidence) -> Result<QualityAssessment, AssessorError>;
}

/// Estimates how likely an evidence item is under a hypothesis vs its
/// negation.
#[async_trait]
pub trait LikelihoodEstimator: Send + Sync {
    async fn estimate(
        &self,
        evidence: &Evidence,
        hypothesis: &str,
    ) -> Result<LikelihoodAssessment, AssessorError>;
}
