//! The six stopping criteria. Each consumes the collection state plus the
//! constraints and returns an independent (triggered, reason) signal; the
//! engine combines them.

use crate::collection::CollectionState;
use crate::config::{RuleKind, StoppingConstraints};

use super::decision::RuleSignal;

pub(super) fn evaluate_rule(
    rule: RuleKind,
    state: &CollectionState,
    constraints: &StoppingConstraints,
) -> RuleSignal {
    match rule {
        RuleKind::DiminishingReturns => diminishing_returns(state, constraints),
        RuleKind::ConfidenceThreshold => confidence_threshold(state, constraints),
        RuleKind::CostBenefit => cost_benefit(state, constraints),
        RuleKind::TimeConstraint => time_constraint(state, constraints),
        RuleKind::Convergence => convergence(state, constraints),
        RuleKind::SufficientDiscrimination => sufficient_discrimination(state, constraints),
    }
}

/// Stop when the recent-window mean of info values dropped below the
/// previous window by more than the threshold. Needs 2×window samples.
fn diminishing_returns(state: &CollectionState, constraints: &StoppingConstraints) -> RuleSignal {
    let window = constraints.window_size;
    let (Some(recent), Some(previous)) = (
        state.recent_info_mean(window),
        state.previous_info_mean(window),
    ) else {
        return RuleSignal::keep_going(
            RuleKind::DiminishingReturns,
            format!(
                "insufficient data: {} samples, need {}",
                state.info_values.len(),
                2 * window
            ),
        );
    };

    let drop = previous - recent;
    if drop > constraints.diminishing_threshold {
        RuleSignal::stop(
            RuleKind::DiminishingReturns,
            format!(
                "info value dropped {:.3} (from {:.3} to {:.3}), threshold {:.3}",
                drop, previous, recent, constraints.diminishing_threshold
            ),
        )
    } else {
        RuleSignal::keep_going(
            RuleKind::DiminishingReturns,
            format!(
                "info value change {:.3} within threshold {:.3}",
                drop, constraints.diminishing_threshold
            ),
        )
    }
}

fn confidence_threshold(state: &CollectionState, constraints: &StoppingConstraints) -> RuleSignal {
    if state.confidence >= constraints.confidence_threshold {
        RuleSignal::stop(
            RuleKind::ConfidenceThreshold,
            format!(
                "confidence {:.2} reached threshold {:.2}",
                state.confidence, constraints.confidence_threshold
            ),
        )
    } else {
        RuleSignal::keep_going(
            RuleKind::ConfidenceThreshold,
            format!(
                "confidence {:.2} below threshold {:.2}",
                state.confidence, constraints.confidence_threshold
            ),
        )
    }
}

fn cost_benefit(state: &CollectionState, constraints: &StoppingConstraints) -> RuleSignal {
    let budget = state.expected_benefit * constraints.cost_benefit_ratio;
    if state.cumulative_cost > budget {
        RuleSignal::stop(
            RuleKind::CostBenefit,
            format!(
                "cumulative cost {:.2} exceeds budget {:.2}",
                state.cumulative_cost, budget
            ),
        )
    } else {
        RuleSignal::keep_going(
            RuleKind::CostBenefit,
            format!(
                "cumulative cost {:.2} within budget {:.2}",
                state.cumulative_cost, budget
            ),
        )
    }
}

fn time_constraint(state: &CollectionState, constraints: &StoppingConstraints) -> RuleSignal {
    let elapsed = state.time_elapsed.as_secs_f64();
    let limit = constraints.time_limit_secs as f64;
    if elapsed >= limit {
        RuleSignal::stop(
            RuleKind::TimeConstraint,
            format!("elapsed {:.1}s reached limit {:.0}s", elapsed, limit),
        )
    } else {
        RuleSignal::keep_going(
            RuleKind::TimeConstraint,
            format!("elapsed {:.1}s under limit {:.0}s", elapsed, limit),
        )
    }
}

/// Stop when the last 3 probability snapshots are pairwise within the
/// convergence threshold, component-wise. Needs 3 snapshots.
fn convergence(state: &CollectionState, constraints: &StoppingConstraints) -> RuleSignal {
    let history = &state.probability_history;
    if history.len() < 3 {
        return RuleSignal::keep_going(
            RuleKind::Convergence,
            format!("insufficient data: {} snapshots, need 3", history.len()),
        );
    }

    let recent = &history[history.len() - 3..];
    let mut max_diff: f64 = 0.0;
    for i in 0..recent.len() {
        for j in (i + 1)..recent.len() {
            if recent[i].len() != recent[j].len() {
                return RuleSignal::keep_going(
                    RuleKind::Convergence,
                    "snapshots not comparable: hypothesis set changed",
                );
            }
            for (a, b) in recent[i].iter().zip(recent[j].iter()) {
                max_diff = max_diff.max((a - b).abs());
            }
        }
    }

    if max_diff < constraints.convergence_threshold {
        RuleSignal::stop(
            RuleKind::Convergence,
            format!(
                "max pairwise difference {:.4} below threshold {:.4}",
                max_diff, constraints.convergence_threshold
            ),
        )
    } else {
        RuleSignal::keep_going(
            RuleKind::Convergence,
            format!(
                "max pairwise difference {:.4} at or above threshold {:.4}",
                max_diff, constraints.convergence_threshold
            ),
        )
    }
}

/// Stop when the gap between the top two hypothesis probabilities reaches
/// the discrimination gap; trivially stop with at most one hypothesis.
fn sufficient_discrimination(
    state: &CollectionState,
    constraints: &StoppingConstraints,
) -> RuleSignal {
    let Some(probabilities) = state.latest_probabilities() else {
        return RuleSignal::keep_going(
            RuleKind::SufficientDiscrimination,
            "insufficient data: no probability snapshots",
        );
    };

    if probabilities.len() < 2 {
        return RuleSignal::stop(
            RuleKind::SufficientDiscrimination,
            "single hypothesis: nothing to discriminate",
        );
    }

    let mut sorted = probabilities.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let gap = sorted[0] - sorted[1];

    if gap >= constraints.discrimination_gap {
        RuleSignal::stop(
            RuleKind::SufficientDiscrimination,
            format!(
                "top-two gap {:.2} reached {:.2}",
                gap, constraints.discrimination_gap
            ),
        )
    } else {
        RuleSignal::keep_going(
            RuleKind::SufficientDiscrimination,
            format!(
                "top-two gap {:.2} below {:.2}",
                gap, constraints.discrimination_gap
            ),
        )
    }
}
