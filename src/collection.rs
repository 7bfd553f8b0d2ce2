use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Accumulated state of one collection run, owned exclusively by the
/// controller. The stopping rules read it; only the controller writes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionState {
    pub evidence_count: usize,
    #[serde(with = "duration_secs")]
    pub time_elapsed: Duration,
    /// Recent info-value samples (diagnosticity proxy), oldest first.
    pub info_values: Vec<f64>,
    /// Hypothesis-probability snapshots, renormalized to sum to 1 on append.
    pub probability_history: Vec<Vec<f64>>,
    pub cumulative_cost: f64,
    pub expected_benefit: f64,
    /// Scalar confidence consumed by the confidence_threshold rule.
    pub confidence: f64,
}

impl CollectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_info_value(&mut self, value: f64) {
        self.info_values.push(value);
    }

    /// Append a hypothesis-probability snapshot. Vectors are renormalized
    /// so every stored snapshot sums to 1; an all-zero vector is stored
    /// as-is rather than dividing by zero.
    pub fn record_probabilities(&mut self, mut probabilities: Vec<f64>) {
        let sum: f64 = probabilities.iter().sum();
        if sum > 0.0 {
            for p in &mut probabilities {
                *p /= sum;
            }
        }
        self.probability_history.push(probabilities);
    }

    pub fn latest_probabilities(&self) -> Option<&[f64]> {
        self.probability_history.last().map(|v| v.as_slice())
    }

    /// Mean of the last `window` info-value samples, oldest-first ordering.
    pub fn recent_info_mean(&self, window: usize) -> Option<f64> {
        if window == 0 || self.info_values.len() < window {
            return None;
        }
        let recent = &self.info_values[self.info_values.len() - window..];
        Some(recent.iter().sum::<f64>() / window as f64)
    }

    /// Mean of the `window` samples immediately preceding the most recent
    /// window. Requires at least 2×window samples.
    pub fn previous_info_mean(&self, window: usize) -> Option<f64> {
        if window == 0 || self.info_values.len() < 2 * window {
            return None;
        }
        let end = self.info_values.len() - window;
        let previous = &self.info_values[end - window..end];
        Some(previous.iter().sum::<f64>() / window as f64)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        d.as_secs_f64().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_renormalization() {
        let mut state = CollectionState::new();
        state.record_probabilities(vec![2.0, 1.0, 1.0]);
        let probs = state.latest_probabilities().unwrap();
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((probs[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_not_divided() {
        let mut state = CollectionState::new();
        state.record_probabilities(vec![0.0, 0.0]);
        assert_eq!(state.latest_probabilities().unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn test_window_means() {
        let mut state = CollectionState::new();
        for v in [1.0, 1.0, 1.0, 0.5, 0.5, 0.5] {
            state.record_info_value(v);
        }
        assert_eq!(state.recent_info_mean(3), Some(0.5));
        assert_eq!(state.previous_info_mean(3), Some(1.0));
        // Not enough history for a wider window
        assert_eq!(state.previous_info_mean(4), None);
    }

    #[test]
    fn test_duration_serde_round_trip() {
        let mut state = CollectionState::new();
        state.time_elapsed = Duration::from_millis(1500);
        let json = serde_json::to_string(&state).unwrap();
        let back: CollectionState = serde_json::from_str(&json).unwrap();
        assert!((back.time_elapsed.as_secs_f64() - 1.5).abs() < 1e-9);
    }
}
