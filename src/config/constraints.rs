use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{CredenceError, Result};

fn validate_ratio(value: f64, name: &str, errors: &mut Vec<String>) {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        errors.push(format!("{} must be between 0.0 and 1.0, got {}", name, value));
    }
}

/// The six stopping criteria, addressable by name in `active_rules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    DiminishingReturns,
    ConfidenceThreshold,
    CostBenefit,
    TimeConstraint,
    Convergence,
    SufficientDiscrimination,
}

impl RuleKind {
    pub const ALL: [RuleKind; 6] = [
        RuleKind::DiminishingReturns,
        RuleKind::ConfidenceThreshold,
        RuleKind::CostBenefit,
        RuleKind::TimeConstraint,
        RuleKind::Convergence,
        RuleKind::SufficientDiscrimination,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::DiminishingReturns => "diminishing_returns",
            Self::ConfidenceThreshold => "confidence_threshold",
            Self::CostBenefit => "cost_benefit",
            Self::TimeConstraint => "time_constraint",
            Self::Convergence => "convergence",
            Self::SufficientDiscrimination => "sufficient_discrimination",
        }
    }
}

/// Boolean policy for merging the active rule signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationStrategy {
    /// Stop as soon as any active rule signals.
    #[default]
    Any,
    /// Stop only when every active rule signals. An empty active set never
    /// stops.
    All,
    /// Stop when a strict majority of active rules signal.
    Majority,
}

impl CombinationStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::All => "all",
            Self::Majority => "majority",
        }
    }
}

/// Declarative stopping policy: which rules run, how their signals merge,
/// and the per-rule thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoppingConstraints {
    pub combination_strategy: CombinationStrategy,
    /// Rules evaluated on each consultation. Defaults to all six.
    pub active_rules: BTreeSet<RuleKind>,
    pub confidence_threshold: f64,
    pub time_limit_secs: u64,
    pub cost_benefit_ratio: f64,
    pub convergence_threshold: f64,
    pub discrimination_gap: f64,
    pub diminishing_threshold: f64,
    pub window_size: usize,
}

impl Default for StoppingConstraints {
    fn default() -> Self {
        Self {
            combination_strategy: CombinationStrategy::Any,
            active_rules: RuleKind::ALL.into_iter().collect(),
            confidence_threshold: 0.95,
            time_limit_secs: 300,
            cost_benefit_ratio: 1.0,
            convergence_threshold: 0.01,
            discrimination_gap: 0.3,
            diminishing_threshold: 0.1,
            window_size: 5,
        }
    }
}

impl StoppingConstraints {
    /// Validate all fields, collecting every violation into one
    /// configuration error. Called at run start, before any evidence is
    /// processed.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        validate_ratio(self.confidence_threshold, "confidence_threshold", &mut errors);
        validate_ratio(self.convergence_threshold, "convergence_threshold", &mut errors);
        validate_ratio(self.discrimination_gap, "discrimination_gap", &mut errors);
        validate_ratio(self.diminishing_threshold, "diminishing_threshold", &mut errors);

        if !self.cost_benefit_ratio.is_finite() || self.cost_benefit_ratio <= 0.0 {
            errors.push(format!(
                "cost_benefit_ratio must be positive, got {}",
                self.cost_benefit_ratio
            ));
        }
        if self.time_limit_secs == 0 {
            errors.push("time_limit_secs must be greater than 0".to_string());
        }
        if self.window_size == 0 {
            errors.push("window_size must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CredenceError::Configuration(errors.join("; ")))
        }
    }
}
