//! Assessment value objects produced by the external LLM-backed assessors.
//!
//! Both types are validated at the assessor boundary: malformed model output
//! becomes an `AssessorError::Malformed` there instead of propagating
//! undefined values downstream. Missing dimensions deserialize to neutral
//! defaults rather than failing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn neutral_half() -> f64 {
    0.5
}

fn neutral_bias() -> f64 {
    0.7
}

fn neutral_relevance() -> f64 {
    0.7
}

fn neutral_consistency() -> f64 {
    0.6
}

fn validate_score(value: f64, name: &str) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be in [0.0, 1.0], got {}", name, value))
    }
}

/// Per-dimension quality scores for one evidence item, all in [0, 1].
///
/// `bias_level` follows the "1.0 = least biased" convention.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QualityAssessment {
    #[serde(default = "neutral_half")]
    pub factual_accuracy: f64,
    #[serde(default = "neutral_half")]
    pub source_credibility: f64,
    #[serde(default = "neutral_half")]
    pub methodological_rigor: f64,
    #[serde(default = "neutral_half")]
    pub completeness: f64,
    #[serde(default = "neutral_bias")]
    pub bias_level: f64,
    #[serde(default = "neutral_relevance")]
    pub relevance: f64,
    #[serde(default = "neutral_consistency")]
    pub logical_consistency: f64,
    #[serde(default = "neutral_half")]
    pub overall_quality: f64,
    #[serde(default = "neutral_half")]
    pub confidence_in_assessment: f64,
    #[serde(default)]
    pub notes: String,
}

impl Default for QualityAssessment {
    fn default() -> Self {
        Self::neutral()
    }
}

impl QualityAssessment {
    /// The documented neutral assessment, used verbatim when an assessor
    /// call fails and the record is degraded.
    pub fn neutral() -> Self {
        Self {
            factual_accuracy: neutral_half(),
            source_credibility: neutral_half(),
            methodological_rigor: neutral_half(),
            completeness: neutral_half(),
            bias_level: neutral_bias(),
            relevance: neutral_relevance(),
            logical_consistency: neutral_consistency(),
            overall_quality: neutral_half(),
            confidence_in_assessment: neutral_half(),
            notes: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_score(self.factual_accuracy, "factual_accuracy")?;
        validate_score(self.source_credibility, "source_credibility")?;
        validate_score(self.methodological_rigor, "methodological_rigor")?;
        validate_score(self.completeness, "completeness")?;
        validate_score(self.bias_level, "bias_level")?;
        validate_score(self.relevance, "relevance")?;
        validate_score(self.logical_consistency, "logical_consistency")?;
        validate_score(self.overall_quality, "overall_quality")?;
        validate_score(self.confidence_in_assessment, "confidence_in_assessment")?;
        Ok(())
    }
}

/// Likelihood pair for one evidence item under a hypothesis and its
/// negation, plus how sharply the item discriminates between them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LikelihoodAssessment {
    pub likelihood_given_hypothesis: f64,
    pub likelihood_given_not_hypothesis: f64,
    #[serde(default)]
    pub diagnosticity: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default = "neutral_half")]
    pub confidence_in_likelihood: f64,
}

impl LikelihoodAssessment {
    /// Uninformative likelihoods: the Bayesian update leaves the belief
    /// unchanged. Used verbatim for degraded records.
    pub fn neutral() -> Self {
        Self {
            likelihood_given_hypothesis: 0.5,
            likelihood_given_not_hypothesis: 0.5,
            diagnosticity: 0.0,
            reasoning: String::new(),
            confidence_in_likelihood: neutral_half(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_score(
            self.likelihood_given_hypothesis,
            "likelihood_given_hypothesis",
        )?;
        validate_score(
            self.likelihood_given_not_hypothesis,
            "likelihood_given_not_hypothesis",
        )?;
        validate_score(self.diagnosticity, "diagnosticity")?;
        validate_score(self.confidence_in_likelihood, "confidence_in_likelihood")?;
        Ok(())
    }
}
