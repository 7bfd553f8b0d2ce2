//! Log-odds-space Bayesian updating.
//!
//! The update is pure and deterministic: identical inputs always produce
//! identical outputs, which the audit trail depends on.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CredenceError, Result};

/// Hard floor/ceiling on any belief the engine emits.
pub const BELIEF_FLOOR: f64 = 0.01;
pub const BELIEF_CEILING: f64 = 0.99;

/// Default cap on the strength of a single piece of evidence, in log-odds.
pub const DEFAULT_MAX_LOG_BAYES_FACTOR: f64 = 5.0;

/// One applied update, as recorded in the append-only history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefUpdate {
    pub prior: f64,
    pub posterior: f64,
    pub weight: f64,
    pub bayes_factor: f64,
    pub belief_change: f64,
    pub diagnosticity: f64,
}

/// Current belief plus its append-only update history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefState {
    current_belief: f64,
    update_history: Vec<BeliefUpdate>,
}

impl BeliefState {
    /// Start from a prior in the open interval (0, 1). The stored belief is
    /// clamped into [`BELIEF_FLOOR`, `BELIEF_CEILING`]; a prior outside
    /// (0, 1) is a domain error, not a clamp.
    pub fn new(prior: f64) -> Result<Self> {
        validate_prior(prior)?;
        Ok(Self {
            current_belief: prior.clamp(BELIEF_FLOOR, BELIEF_CEILING),
            update_history: Vec::new(),
        })
    }

    pub fn current_belief(&self) -> f64 {
        self.current_belief
    }

    pub fn history(&self) -> &[BeliefUpdate] {
        &self.update_history
    }

    /// Apply an update produced by the engine. History is append-only; past
    /// entries are never rewritten.
    pub fn apply(&mut self, update: BeliefUpdate) {
        self.current_belief = update.posterior;
        self.update_history.push(update);
    }
}

/// Performs one weighted Bayesian update in log-odds space.
#[derive(Debug, Clone, Copy)]
pub struct BayesianUpdateEngine {
    max_log_bayes_factor: f64,
}

impl Default for BayesianUpdateEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOG_BAYES_FACTOR)
    }
}

impl BayesianUpdateEngine {
    pub fn new(max_log_bayes_factor: f64) -> Self {
        Self {
            max_log_bayes_factor,
        }
    }

    /// Update `prior` with a likelihood pair and a weight.
    ///
    /// `likelihood_not_h <= 0` maps to `+cap`, `likelihood_h <= 0` to
    /// `-cap`, and any finite log-Bayes-factor is clamped to `[-cap, cap]`,
    /// so a single item can never move the belief by more than the
    /// configured maximum evidence strength.
    pub fn update(
        &self,
        prior: f64,
        likelihood_h: f64,
        likelihood_not_h: f64,
        weight: f64,
        diagnosticity: f64,
    ) -> Result<BeliefUpdate> {
        validate_prior(prior)?;
        for (name, value) in [
            ("likelihood_h", likelihood_h),
            ("likelihood_not_h", likelihood_not_h),
            ("weight", weight),
            ("diagnosticity", diagnosticity),
        ] {
            if !value.is_finite() {
                return Err(CredenceError::Domain(format!(
                    "{} is not finite: {}",
                    name, value
                )));
            }
        }

        let cap = self.max_log_bayes_factor;
        let log_bf = if likelihood_not_h <= 0.0 {
            cap
        } else if likelihood_h <= 0.0 {
            -cap
        } else {
            (likelihood_h / likelihood_not_h).ln().clamp(-cap, cap)
        };

        let prior_log_odds = (prior / (1.0 - prior)).ln();
        let posterior_log_odds = prior_log_odds + weight * log_bf;
        let posterior = sigmoid(posterior_log_odds).clamp(BELIEF_FLOOR, BELIEF_CEILING);

        debug!(
            prior,
            posterior,
            log_bf,
            weight,
            "Bayesian update"
        );

        Ok(BeliefUpdate {
            prior,
            posterior,
            weight,
            bayes_factor: log_bf.exp(),
            belief_change: posterior - prior,
            diagnosticity,
        })
    }
}

fn validate_prior(prior: f64) -> Result<()> {
    if !prior.is_finite() || prior <= 0.0 || prior >= 1.0 {
        return Err(CredenceError::Domain(format!(
            "prior must be in the open interval (0, 1), got {}",
            prior
        )));
    }
    Ok(())
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_a() {
        let engine = BayesianUpdateEngine::default();
        let u = engine.update(0.5, 0.9, 0.3, 1.0, 0.6).unwrap();
        assert!((u.bayes_factor - 3.0).abs() < 1e-9);
        assert!((u.posterior - 0.7503).abs() < 1e-3);
    }

    #[test]
    fn test_zero_weight_is_identity() {
        let engine = BayesianUpdateEngine::default();
        for prior in [0.05, 0.3, 0.5, 0.7, 0.95] {
            let u = engine.update(prior, 0.9, 0.1, 0.0, 0.5).unwrap();
            assert!((u.posterior - prior).abs() < 1e-12);
        }
    }

    #[test]
    fn test_equal_likelihoods_is_identity() {
        let engine = BayesianUpdateEngine::default();
        let u = engine.update(0.42, 0.5, 0.5, 1.7, 0.0).unwrap();
        assert!((u.posterior - 0.42).abs() < 1e-12);
        assert!((u.bayes_factor - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_posterior_clamp_under_adversarial_likelihoods() {
        let engine = BayesianUpdateEngine::default();
        let u = engine.update(0.98, 1.0, 1e-300, 2.0, 1.0).unwrap();
        assert!(u.posterior <= BELIEF_CEILING);
        let u = engine.update(0.02, 1e-300, 1.0, 2.0, 1.0).unwrap();
        assert!(u.posterior >= BELIEF_FLOOR);
    }

    #[test]
    fn test_zero_not_hypothesis_uses_cap() {
        let engine = BayesianUpdateEngine::default();
        let u = engine.update(0.5, 0.9, 0.0, 1.0, 1.0).unwrap();
        assert!((u.bayes_factor - DEFAULT_MAX_LOG_BAYES_FACTOR.exp()).abs() < 1e-9);

        let symmetric = engine.update(0.5, 0.0, 0.9, 1.0, 1.0).unwrap();
        assert!((symmetric.bayes_factor - (-DEFAULT_MAX_LOG_BAYES_FACTOR).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_prior_fails_fast() {
        let engine = BayesianUpdateEngine::default();
        for prior in [0.0, 1.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            assert!(engine.update(prior, 0.5, 0.5, 1.0, 0.0).is_err());
        }
    }

    #[test]
    fn test_nan_inputs_fail_fast() {
        let engine = BayesianUpdateEngine::default();
        assert!(engine.update(0.5, f64::NAN, 0.5, 1.0, 0.0).is_err());
        assert!(engine.update(0.5, 0.5, f64::INFINITY, 1.0, 0.0).is_err());
        assert!(engine.update(0.5, 0.5, 0.5, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_belief_state_append_only() {
        let mut state = BeliefState::new(0.5).unwrap();
        let engine = BayesianUpdateEngine::default();
        let u = engine.update(0.5, 0.8, 0.4, 1.0, 0.4).unwrap();
        state.apply(u);
        assert_eq!(state.history().len(), 1);
        assert!((state.current_belief() - state.history()[0].posterior).abs() < f64::EPSILON);
    }

    #[test]
    fn test_belief_state_rejects_degenerate_prior() {
        assert!(BeliefState::new(0.0).is_err());
        assert!(BeliefState::new(1.0).is_err());
        // A valid but extreme prior is clamped into the working range
        let s = BeliefState::new(0.0001).unwrap();
        assert!((s.current_belief() - BELIEF_FLOOR).abs() < f64::EPSILON);
    }
}
