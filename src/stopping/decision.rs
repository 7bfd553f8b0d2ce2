use serde::{Deserialize, Serialize};

use crate::collection::CollectionState;
use crate::config::{CombinationStrategy, RuleKind};
use crate::error::Result;

/// Outcome of one rule evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSignal {
    pub rule: RuleKind,
    pub triggered: bool,
    pub reason: String,
}

impl RuleSignal {
    pub fn stop(rule: RuleKind, reason: impl Into<String>) -> Self {
        Self {
            rule,
            triggered: true,
            reason: reason.into(),
        }
    }

    pub fn keep_going(rule: RuleKind, reason: impl Into<String>) -> Self {
        Self {
            rule,
            triggered: false,
            reason: reason.into(),
        }
    }
}

/// The collection metrics a decision was computed from, frozen at
/// evaluation time so the trace can be replayed without the live state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub evidence_count: usize,
    pub elapsed_secs: f64,
    pub confidence: f64,
    pub cumulative_cost: f64,
    pub expected_benefit: f64,
    pub recent_info_mean: Option<f64>,
    pub latest_probabilities: Option<Vec<f64>>,
}

impl MetricsSnapshot {
    pub fn capture(state: &CollectionState, window: usize) -> Self {
        Self {
            evidence_count: state.evidence_count,
            elapsed_secs: state.time_elapsed.as_secs_f64(),
            confidence: state.confidence,
            cumulative_cost: state.cumulative_cost,
            expected_benefit: state.expected_benefit,
            recent_info_mean: state.recent_info_mean(window),
            latest_probabilities: state.latest_probabilities().map(|p| p.to_vec()),
        }
    }
}

/// One full evaluation of the stopping policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoppingDecision {
    pub stop: bool,
    pub strategy: CombinationStrategy,
    pub signals: Vec<RuleSignal>,
    pub metrics: MetricsSnapshot,
}

impl StoppingDecision {
    /// The signals that voted to stop.
    pub fn triggered(&self) -> impl Iterator<Item = &RuleSignal> {
        self.signals.iter().filter(|s| s.triggered)
    }
}

/// Append-only record of every stopping evaluation in a run. A first-class
/// audit artifact, not a debugging side effect: entries are never mutated
/// or removed once pushed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionTrace {
    decisions: Vec<StoppingDecision>,
}

impl DecisionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decision: StoppingDecision) {
        self.decisions.push(decision);
    }

    pub fn decisions(&self) -> &[StoppingDecision] {
        &self.decisions
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.decisions)?)
    }
}
