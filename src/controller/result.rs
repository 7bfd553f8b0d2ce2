use serde::{Deserialize, Serialize};

use crate::assessment::{LikelihoodAssessment, QualityAssessment};
use crate::bayes::BeliefUpdate;
use crate::error::Result;
use crate::evidence::Evidence;
use crate::stopping::{DecisionTrace, StoppingDecision};

/// Full per-item audit record: the consumed evidence, both assessments,
/// the computed weight, and the applied update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub evidence: Evidence,
    pub quality: QualityAssessment,
    pub likelihood: LikelihoodAssessment,
    pub weight: f64,
    pub update: BeliefUpdate,
    /// True when an assessor call failed or the evidence was malformed and
    /// the neutral defaults were substituted.
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
}

/// Pointer to the evidence item that maximized one summary metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceHighlight {
    pub evidence_id: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationSummary {
    /// Max Bayes factor.
    pub strongest_evidence: Option<EvidenceHighlight>,
    /// Max diagnosticity.
    pub most_diagnostic: Option<EvidenceHighlight>,
    /// Max absolute single belief change.
    pub largest_update: Option<EvidenceHighlight>,
}

impl AggregationSummary {
    pub fn from_records(records: &[EvidenceRecord]) -> Self {
        let best_by = |metric: fn(&EvidenceRecord) -> f64| {
            records
                .iter()
                .max_by(|a, b| {
                    metric(a)
                        .partial_cmp(&metric(b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|r| EvidenceHighlight {
                    evidence_id: r.evidence.id.clone(),
                    value: metric(r),
                })
        };

        Self {
            strongest_evidence: best_by(|r| r.update.bayes_factor),
            most_diagnostic: best_by(|r| r.update.diagnosticity),
            largest_update: best_by(|r| r.update.belief_change.abs()),
        }
    }
}

/// Aggregated output of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationResult {
    pub hypothesis: String,
    pub prior_belief: f64,
    pub final_belief: f64,
    pub total_belief_change: f64,
    pub num_evidence_pieces: usize,
    pub degraded_count: usize,
    pub average_diagnosticity: f64,
    /// Mean of diagnosticity × overall_quality across items.
    pub confidence_in_result: f64,
    pub early_stop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_decision: Option<StoppingDecision>,
    pub update_history: Vec<BeliefUpdate>,
    pub records: Vec<EvidenceRecord>,
    pub summary: AggregationSummary,
}

impl AggregationResult {
    pub fn degraded_fraction(&self) -> f64 {
        if self.num_evidence_pieces == 0 {
            0.0
        } else {
            self.degraded_count as f64 / self.num_evidence_pieces as f64
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut report = String::new();

        report.push_str("# Aggregation Report\n\n");
        report.push_str(&format!("**Hypothesis**: {}\n\n", self.hypothesis));
        report.push_str(&format!(
            "**Belief**: {:.4} → {:.4} (change {:+.4})\n",
            self.prior_belief, self.final_belief, self.total_belief_change
        ));
        report.push_str(&format!(
            "**Evidence**: {} pieces ({} degraded)\n",
            self.num_evidence_pieces, self.degraded_count
        ));
        report.push_str(&format!(
            "**Avg Diagnosticity**: {:.2} | **Confidence in Result**: {:.2}\n\n",
            self.average_diagnosticity, self.confidence_in_result
        ));

        if self.early_stop {
            report.push_str("**Stopped early**");
            if let Some(decision) = &self.stop_decision {
                let reasons: Vec<&str> = decision
                    .triggered()
                    .map(|s| s.reason.as_str())
                    .collect();
                report.push_str(&format!(": {}", reasons.join("; ")));
            }
            report.push_str("\n\n");
        }

        let highlights = [
            ("Strongest evidence (Bayes factor)", &self.summary.strongest_evidence),
            ("Most diagnostic", &self.summary.most_diagnostic),
            ("Largest belief change", &self.summary.largest_update),
        ];
        report.push_str("## Highlights\n\n");
        for (label, highlight) in highlights {
            if let Some(h) = highlight {
                report.push_str(&format!(
                    "- **{}**: `{}` ({:.3})\n",
                    label, h.evidence_id, h.value
                ));
            }
        }

        if !self.records.is_empty() {
            report.push_str("\n## Updates\n\n");
            for record in &self.records {
                let flag = if record.degraded { " ⚠ degraded" } else { "" };
                report.push_str(&format!(
                    "- `{}`: {:.4} → {:.4} (weight {:.2}, BF {:.2}){}\n",
                    record.evidence.id,
                    record.update.prior,
                    record.update.posterior,
                    record.weight,
                    record.update.bayes_factor,
                    flag
                ));
            }
        }

        report
    }
}

/// How a run ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AggregationOutcome {
    /// Normal completion (including early stops).
    Completed(AggregationResult),
    /// Too many degraded records to trust the belief; the partial result is
    /// attached so the audit trail survives.
    PartialFailure {
        result: AggregationResult,
        degraded_fraction: f64,
    },
}

impl AggregationOutcome {
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, Self::PartialFailure { .. })
    }

    pub fn result(&self) -> &AggregationResult {
        match self {
            Self::Completed(result) => result,
            Self::PartialFailure { result, .. } => result,
        }
    }

    pub fn into_result(self) -> AggregationResult {
        match self {
            Self::Completed(result) => result,
            Self::PartialFailure { result, .. } => result,
        }
    }
}

/// Everything a run produces: the outcome plus the stopping-engine trace,
/// which is a separate audit artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationRun {
    pub outcome: AggregationOutcome,
    pub decision_trace: DecisionTrace,
}
