//! The aggregation loop: assess → weight → update → record → consult
//! stopping rules.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::assessment::{LikelihoodAssessment, QualityAssessment};
use crate::assessor::{EvidenceQualityAssessor, LikelihoodEstimator};
use crate::bayes::{BayesianUpdateEngine, BeliefState};
use crate::collection::CollectionState;
use crate::config::{ConsultationMode, ControllerConfig, StoppingConstraints};
use crate::error::{AssessorError, CredenceError, Result};
use crate::evidence::Evidence;
use crate::stopping::StoppingRuleEngine;
use crate::weight::EvidenceWeightCalculator;

mod result;
mod signal;

pub use result::{
    AggregationOutcome, AggregationResult, AggregationRun, AggregationSummary, EvidenceHighlight,
    EvidenceRecord,
};
pub use signal::CancelHandle;

/// Both assessments for one item, with degradation bookkeeping. Produced by
/// the concurrent pipeline, consumed strictly in input order.
struct AssessedItem {
    evidence: Evidence,
    quality: QualityAssessment,
    likelihood: LikelihoodAssessment,
    degraded: bool,
    degraded_reason: Option<String>,
}

impl AssessedItem {
    fn degraded(evidence: Evidence, reason: String) -> Self {
        Self {
            evidence,
            quality: QualityAssessment::neutral(),
            likelihood: LikelihoodAssessment::neutral(),
            degraded: true,
            degraded_reason: Some(reason),
        }
    }
}

/// Drives the evidence stream through the external assessors and the
/// Bayesian update engine, consulting the stopping rules per the configured
/// mode. Collaborators are injected; the controller holds no global state.
pub struct AggregationController {
    quality_assessor: Arc<dyn EvidenceQualityAssessor>,
    likelihood_estimator: Arc<dyn LikelihoodEstimator>,
    weight_calculator: EvidenceWeightCalculator,
    config: ControllerConfig,
}

impl AggregationController {
    pub fn new(
        quality_assessor: Arc<dyn EvidenceQualityAssessor>,
        likelihood_estimator: Arc<dyn LikelihoodEstimator>,
        config: ControllerConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            quality_assessor,
            likelihood_estimator,
            weight_calculator: EvidenceWeightCalculator::new(),
            config,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub async fn run(
        &self,
        evidence: Vec<Evidence>,
        hypothesis: &str,
        prior: f64,
        constraints: StoppingConstraints,
    ) -> Result<AggregationRun> {
        self.run_with_cancel(evidence, hypothesis, prior, constraints, CancelHandle::new())
            .await
    }

    /// Run the full loop. Assessments for independent items are dispatched
    /// concurrently up to the configured bound, but updates are applied in
    /// input order, so the audit trail is reproducible for a given input
    /// order and configuration.
    pub async fn run_with_cancel(
        &self,
        evidence: Vec<Evidence>,
        hypothesis: &str,
        prior: f64,
        constraints: StoppingConstraints,
        cancel: CancelHandle,
    ) -> Result<AggregationRun> {
        let mut stopping = StoppingRuleEngine::new(constraints)?;
        let mut belief = BeliefState::new(prior)?;
        let update_engine = BayesianUpdateEngine::new(self.config.max_log_bayes_factor);

        // Pinned once so weights do not drift with wall-clock time during
        // the run.
        let reference_time = Utc::now();
        let started = Instant::now();

        let mut state = CollectionState::new();
        state.expected_benefit = self.config.expected_benefit;

        let total = evidence.len();
        info!(items = total, hypothesis, prior, "Starting aggregation run");

        let mut records: Vec<EvidenceRecord> = Vec::with_capacity(total);
        let mut early_stop = false;
        let mut stop_decision = None;
        let mut cancelled = false;

        {
            let mut assessments = stream::iter(
                evidence
                    .into_iter()
                    .map(|item| self.assess_item(item, hypothesis)),
            )
            .buffered(self.config.max_concurrent_assessments);

            while let Some(assessed) = assessments.next().await {
                if cancel.is_cancelled() {
                    cancelled = true;
                    break;
                }

                let weight = self.weight_calculator.compute_at(
                    &assessed.evidence,
                    &assessed.quality,
                    reference_time,
                );
                let update = update_engine.update(
                    belief.current_belief(),
                    assessed.likelihood.likelihood_given_hypothesis,
                    assessed.likelihood.likelihood_given_not_hypothesis,
                    weight,
                    assessed.likelihood.diagnosticity,
                )?;

                debug!(
                    item = %assessed.evidence.id,
                    weight,
                    posterior = update.posterior,
                    degraded = assessed.degraded,
                    "Applied update"
                );

                belief.apply(update.clone());

                state.evidence_count += 1;
                state.time_elapsed = started.elapsed();
                state.cumulative_cost += self.config.per_item_cost;
                state.record_info_value(assessed.likelihood.diagnosticity);
                state.record_probabilities(vec![
                    belief.current_belief(),
                    1.0 - belief.current_belief(),
                ]);
                state.confidence = belief.current_belief().max(1.0 - belief.current_belief());

                records.push(EvidenceRecord {
                    evidence: assessed.evidence,
                    quality: assessed.quality,
                    likelihood: assessed.likelihood,
                    weight,
                    update,
                    degraded: assessed.degraded,
                    degraded_reason: assessed.degraded_reason,
                });

                if self.config.mode == ConsultationMode::Streaming {
                    let decision = stopping.evaluate(&state);
                    if decision.stop {
                        info!(
                            items = records.len(),
                            "Stopping rules signalled halt"
                        );
                        early_stop = records.len() < total;
                        stop_decision = Some(decision);
                        break;
                    }
                }
            }
        }

        if cancelled {
            info!(completed = records.len(), "Run cancelled");
            return Err(CredenceError::Cancelled {
                completed: records.len(),
            });
        }

        if self.config.mode == ConsultationMode::Batch && !records.is_empty() {
            let decision = stopping.evaluate(&state);
            if decision.stop {
                stop_decision = Some(decision);
            }
        }

        let result = self.build_result(hypothesis, prior, &belief, records, early_stop, stop_decision);
        let degraded_fraction = result.degraded_fraction();

        let outcome = if degraded_fraction > self.config.fatal_degraded_fraction {
            warn!(
                degraded = result.degraded_count,
                total = result.num_evidence_pieces,
                "Degraded fraction exceeds fatal threshold"
            );
            AggregationOutcome::PartialFailure {
                result,
                degraded_fraction,
            }
        } else {
            info!(
                final_belief = result.final_belief,
                items = result.num_evidence_pieces,
                early_stop = result.early_stop,
                "Aggregation run complete"
            );
            AggregationOutcome::Completed(result)
        };

        Ok(AggregationRun {
            outcome,
            decision_trace: stopping.into_trace(),
        })
    }

    fn build_result(
        &self,
        hypothesis: &str,
        prior: f64,
        belief: &BeliefState,
        records: Vec<EvidenceRecord>,
        early_stop: bool,
        stop_decision: Option<crate::stopping::StoppingDecision>,
    ) -> AggregationResult {
        let count = records.len();
        let degraded_count = records.iter().filter(|r| r.degraded).count();

        let (average_diagnosticity, confidence_in_result) = if count == 0 {
            (0.0, 0.0)
        } else {
            let diag_sum: f64 = records.iter().map(|r| r.update.diagnosticity).sum();
            let conf_sum: f64 = records
                .iter()
                .map(|r| r.update.diagnosticity * r.quality.overall_quality)
                .sum();
            (diag_sum / count as f64, conf_sum / count as f64)
        };

        let summary = AggregationSummary::from_records(&records);

        AggregationResult {
            hypothesis: hypothesis.to_string(),
            prior_belief: prior,
            final_belief: belief.current_belief(),
            total_belief_change: belief.current_belief() - prior,
            num_evidence_pieces: count,
            degraded_count,
            average_diagnosticity,
            confidence_in_result,
            early_stop,
            stop_decision,
            update_history: belief.history().to_vec(),
            records,
            summary,
        }
    }

    /// Assess one item: data validation, then both assessor calls
    /// concurrently, each under the per-call timeout and transient-retry
    /// policy. Any failure degrades the record to neutral defaults instead
    /// of aborting the batch.
    async fn assess_item(&self, evidence: Evidence, hypothesis: &str) -> AssessedItem {
        if let Err(e) = evidence.validate() {
            warn!(item = %evidence.id, error = %e, "Malformed evidence, degrading record");
            return AssessedItem::degraded(evidence, e.to_string());
        }

        let (quality_result, likelihood_result) = tokio::join!(
            self.call_with_retry(|| self.quality_assessor.assess(&evidence)),
            self.call_with_retry(|| self.likelihood_estimator.estimate(&evidence, hypothesis)),
        );

        let mut degraded_reason = None;

        let quality = match quality_result.and_then(|q| {
            q.validate()
                .map_err(AssessorError::Malformed)
                .map(|_| q)
        }) {
            Ok(q) => q,
            Err(e) => {
                warn!(item = %evidence.id, error = %e, "Quality assessment failed, using neutral");
                degraded_reason = Some(format!("quality: {}", e));
                QualityAssessment::neutral()
            }
        };

        let likelihood = match likelihood_result.and_then(|l| {
            l.validate()
                .map_err(AssessorError::Malformed)
                .map(|_| l)
        }) {
            Ok(l) => l,
            Err(e) => {
                warn!(item = %evidence.id, error = %e, "Likelihood estimate failed, using neutral");
                degraded_reason = Some(match degraded_reason.take() {
                    Some(existing) => format!("{}; likelihood: {}", existing, e),
                    None => format!("likelihood: {}", e),
                });
                LikelihoodAssessment::neutral()
            }
        };

        AssessedItem {
            evidence,
            quality,
            likelihood,
            degraded: degraded_reason.is_some(),
            degraded_reason,
        }
    }

    async fn call_with_retry<T, F, Fut>(&self, mut call: F) -> std::result::Result<T, AssessorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, AssessorError>>,
    {
        let per_call = Duration::from_secs(self.config.assessor_timeout_secs);
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay_ms = self.config.retry_base_delay_ms * (1 << (attempt - 1));
                debug!(attempt, delay_ms, "Retrying assessor call");
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let result = match timeout(per_call, call()).await {
                Ok(r) => r,
                Err(_) => Err(AssessorError::Timeout {
                    duration_secs: self.config.assessor_timeout_secs,
                }),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    warn!(attempt = attempt + 1, error = %e, "Transient assessor error, retrying");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| AssessorError::Unavailable("max retries exceeded".into())))
    }
}
