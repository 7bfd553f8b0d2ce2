use serde::{Deserialize, Serialize};

use crate::bayes::DEFAULT_MAX_LOG_BAYES_FACTOR;
use crate::error::{CredenceError, Result};

/// When the controller consults the stopping-rule engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationMode {
    /// After every item; the run halts as soon as the engine signals stop.
    #[default]
    Streaming,
    /// Once, after the full stream is exhausted.
    Batch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub mode: ConsultationMode,
    /// Upper bound on concurrently in-flight assessor calls. Updates are
    /// still applied strictly in input order.
    pub max_concurrent_assessments: usize,
    pub assessor_timeout_secs: u64,
    /// Retries for transient assessor failures before the record degrades.
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    /// Degraded-record fraction above which the run is a PartialFailure.
    pub fatal_degraded_fraction: f64,
    /// Maximum single-evidence strength in log-odds (the guarded fallback
    /// when a likelihood denominator is zero, and the clamp on any
    /// log-Bayes-factor).
    pub max_log_bayes_factor: f64,
    /// Cost charged per consumed item. 0.0 disables cost tracking, so the
    /// cost_benefit rule never fires even when active.
    pub per_item_cost: f64,
    pub expected_benefit: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            mode: ConsultationMode::Streaming,
            max_concurrent_assessments: 4,
            assessor_timeout_secs: 60,
            max_retries: 2,
            retry_base_delay_ms: 500,
            fatal_degraded_fraction: 0.5,
            max_log_bayes_factor: DEFAULT_MAX_LOG_BAYES_FACTOR,
            per_item_cost: 0.0,
            expected_benefit: 0.0,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.max_concurrent_assessments == 0 {
            errors.push("max_concurrent_assessments must be greater than 0".to_string());
        }
        if self.assessor_timeout_secs == 0 {
            errors.push("assessor_timeout_secs must be greater than 0".to_string());
        }
        if !self.fatal_degraded_fraction.is_finite()
            || !(0.0..=1.0).contains(&self.fatal_degraded_fraction)
        {
            errors.push(format!(
                "fatal_degraded_fraction must be between 0.0 and 1.0, got {}",
                self.fatal_degraded_fraction
            ));
        }
        if !self.max_log_bayes_factor.is_finite() || self.max_log_bayes_factor <= 0.0 {
            errors.push(format!(
                "max_log_bayes_factor must be positive, got {}",
                self.max_log_bayes_factor
            ));
        }
        if !self.per_item_cost.is_finite() || self.per_item_cost < 0.0 {
            errors.push(format!(
                "per_item_cost must be non-negative, got {}",
                self.per_item_cost
            ));
        }
        if !self.expected_benefit.is_finite() || self.expected_benefit < 0.0 {
            errors.push(format!(
                "expected_benefit must be non-negative, got {}",
                self.expected_benefit
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CredenceError::Configuration(errors.join("; ")))
        }
    }
}
