//! Multi-criteria stopping policy over accumulated collection state.

use tracing::debug;

use crate::collection::CollectionState;
use crate::config::{CombinationStrategy, StoppingConstraints};
use crate::error::Result;

mod decision;
mod rules;

pub use decision::{DecisionTrace, MetricsSnapshot, RuleSignal, StoppingDecision};

/// Evaluates the active stopping criteria and merges their signals per the
/// configured combination strategy. Every evaluation lands in the
/// append-only decision trace.
#[derive(Debug, Clone)]
pub struct StoppingRuleEngine {
    constraints: StoppingConstraints,
    trace: DecisionTrace,
}

impl StoppingRuleEngine {
    /// Build the engine from validated constraints. Invalid constraints are
    /// a `Configuration` error before anything is evaluated.
    pub fn new(constraints: StoppingConstraints) -> Result<Self> {
        constraints.validate()?;
        Ok(Self {
            constraints,
            trace: DecisionTrace::new(),
        })
    }

    pub fn constraints(&self) -> &StoppingConstraints {
        &self.constraints
    }

    /// Evaluate all active rules against the collection state, record the
    /// decision, and return it.
    pub fn evaluate(&mut self, state: &CollectionState) -> StoppingDecision {
        let signals: Vec<RuleSignal> = self
            .constraints
            .active_rules
            .iter()
            .map(|rule| rules::evaluate_rule(*rule, state, &self.constraints))
            .collect();

        let triggered = signals.iter().filter(|s| s.triggered).count();
        let stop = match self.constraints.combination_strategy {
            CombinationStrategy::Any => triggered > 0,
            // An empty active set evaluates to false, not vacuous truth.
            CombinationStrategy::All => !signals.is_empty() && triggered == signals.len(),
            CombinationStrategy::Majority => triggered * 2 > signals.len(),
        };

        debug!(
            stop,
            triggered,
            active = signals.len(),
            strategy = self.constraints.combination_strategy.name(),
            "Stopping evaluation"
        );

        let decision = StoppingDecision {
            stop,
            strategy: self.constraints.combination_strategy,
            signals,
            metrics: MetricsSnapshot::capture(state, self.constraints.window_size),
        };
        self.trace.push(decision.clone());
        decision
    }

    /// The audit trace of every evaluation so far.
    pub fn trace(&self) -> &DecisionTrace {
        &self.trace
    }

    /// Hand the trace over at end of run.
    pub fn into_trace(self) -> DecisionTrace {
        self.trace
    }
}
