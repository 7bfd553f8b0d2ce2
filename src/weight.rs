use chrono::{DateTime, Utc};

use crate::assessment::QualityAssessment;
use crate::evidence::Evidence;

pub const MIN_WEIGHT: f64 = 0.01;
pub const MAX_WEIGHT: f64 = 2.0;

// Quality dimension coefficients; sum to 1.0.
const W_FACTUAL_ACCURACY: f64 = 0.25;
const W_SOURCE_CREDIBILITY: f64 = 0.20;
const W_METHODOLOGICAL_RIGOR: f64 = 0.15;
const W_LOGICAL_CONSISTENCY: f64 = 0.15;
const W_BIAS_LEVEL: f64 = 0.15;
const W_COMPLETENESS: f64 = 0.10;

const TEMPORAL_DECAY_DAYS: f64 = 365.0;
const TEMPORAL_FLOOR: f64 = 0.3;

/// Turns a quality assessment plus evidence metadata into one scalar
/// weight in [`MIN_WEIGHT`, `MAX_WEIGHT`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EvidenceWeightCalculator;

impl EvidenceWeightCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Compute the weight against a caller-pinned reference time. The
    /// controller pins this at run start so identical inputs always yield
    /// identical weights.
    pub fn compute_at(
        &self,
        evidence: &Evidence,
        quality: &QualityAssessment,
        reference: DateTime<Utc>,
    ) -> f64 {
        let quality_weight = self.quality_weight(quality);
        let temporal_weight = self.temporal_weight(evidence.age_days(reference));
        let type_weight = evidence.evidence_type.base_weight();

        // The floor keeps very old evidence at some baseline relevance
        // rather than decaying it to nothing.
        let weight = quality_weight * (TEMPORAL_FLOOR + (1.0 - TEMPORAL_FLOOR) * temporal_weight)
            * type_weight;
        weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
    }

    pub fn compute(&self, evidence: &Evidence, quality: &QualityAssessment) -> f64 {
        self.compute_at(evidence, quality, Utc::now())
    }

    fn quality_weight(&self, q: &QualityAssessment) -> f64 {
        q.factual_accuracy * W_FACTUAL_ACCURACY
            + q.source_credibility * W_SOURCE_CREDIBILITY
            + q.methodological_rigor * W_METHODOLOGICAL_RIGOR
            + q.logical_consistency * W_LOGICAL_CONSISTENCY
            + q.bias_level * W_BIAS_LEVEL
            + q.completeness * W_COMPLETENESS
    }

    fn temporal_weight(&self, age_days: f64) -> f64 {
        (-age_days / TEMPORAL_DECAY_DAYS).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::EvidenceType;
    use chrono::Duration;

    fn perfect_quality() -> QualityAssessment {
        QualityAssessment {
            factual_accuracy: 1.0,
            source_credibility: 1.0,
            methodological_rigor: 1.0,
            completeness: 1.0,
            bias_level: 1.0,
            relevance: 1.0,
            logical_consistency: 1.0,
            overall_quality: 1.0,
            confidence_in_assessment: 1.0,
            notes: String::new(),
        }
    }

    #[test]
    fn test_fresh_perfect_primary_source() {
        let now = Utc::now();
        let calc = EvidenceWeightCalculator::new();
        let e = Evidence::new("e1", "text", "src")
            .with_type(EvidenceType::PrimarySource)
            .with_timestamp(now);

        // quality_weight 1.0, temporal 1.0, type 1.0 => 1.0
        let w = calc.compute_at(&e, &perfect_quality(), now);
        assert!((w - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_old_evidence_keeps_baseline() {
        let now = Utc::now();
        let calc = EvidenceWeightCalculator::new();
        let e = Evidence::new("e1", "text", "src")
            .with_type(EvidenceType::PrimarySource)
            .with_timestamp(now - Duration::days(36_500));

        // temporal ~ 0, so the 0.3 floor dominates
        let w = calc.compute_at(&e, &perfect_quality(), now);
        assert!((w - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_weight_clamp_invariant() {
        let now = Utc::now();
        let calc = EvidenceWeightCalculator::new();

        // Worst case: all-zero quality, social media, ancient
        let zero = QualityAssessment {
            factual_accuracy: 0.0,
            source_credibility: 0.0,
            methodological_rigor: 0.0,
            completeness: 0.0,
            bias_level: 0.0,
            relevance: 0.0,
            logical_consistency: 0.0,
            overall_quality: 0.0,
            confidence_in_assessment: 0.0,
            notes: String::new(),
        };
        let e = Evidence::new("e1", "text", "src")
            .with_type(EvidenceType::SocialMedia)
            .with_timestamp(now - Duration::days(10_000));
        let w = calc.compute_at(&e, &zero, now);
        assert!((MIN_WEIGHT..=MAX_WEIGHT).contains(&w));
        assert!((w - MIN_WEIGHT).abs() < f64::EPSILON);

        // Best case stays under the cap
        let e = Evidence::new("e2", "text", "src")
            .with_type(EvidenceType::PrimarySource)
            .with_timestamp(now);
        let w = calc.compute_at(&e, &perfect_quality(), now);
        assert!((MIN_WEIGHT..=MAX_WEIGHT).contains(&w));
    }

    #[test]
    fn test_neutral_quality_never_raises() {
        let now = Utc::now();
        let calc = EvidenceWeightCalculator::new();
        let e = Evidence::new("e1", "text", "src");
        let w = calc.compute_at(&e, &QualityAssessment::neutral(), now);
        assert!((MIN_WEIGHT..=MAX_WEIGHT).contains(&w));
    }
}
