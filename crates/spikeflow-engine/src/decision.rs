// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Decision Layer Control
//!
//! The decision layer is the terminal layer whose neurons read out a class.
//! During classification the scheduler fires it on a fixed timer, and after
//! training each neuron of the layer before it is labeled by majority vote over
//! the labels that were active when it fired.

use ahash::AHashMap;
use spikeflow_neural::LayerId;

use crate::error::{EngineError, EngineResult};

/// Per-neuron count of firings under each training label
pub type LabelHistogram = AHashMap<String, u32>;

/// Decision timer and labeling parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionController {
    layer: LayerId,
    spike_history_size: usize,
    rejection_threshold: f64,
    timer_interval: f64,
    last_decision_timestamp: f64,
}

impl DecisionController {
    /// Validate and build a controller for `layer` in a network of `layer_count` layers
    pub fn configure(
        layer: LayerId,
        layer_count: usize,
        spike_history_size: usize,
        rejection_threshold: f64,
        timer_interval: f64,
    ) -> EngineResult<Self> {
        if layer.index() >= layer_count {
            return Err(EngineError::LayerNotFound(layer));
        }
        if layer.index() + 1 != layer_count {
            return Err(EngineError::InvalidConfiguration(format!(
                "decision layer {} must be the last layer (network has {} layers)",
                layer, layer_count
            )));
        }
        if !(0.0..=1.0).contains(&rejection_threshold) {
            return Err(EngineError::InvalidConfiguration(format!(
                "rejection threshold {} is outside [0, 1]",
                rejection_threshold
            )));
        }
        if !timer_interval.is_finite() || timer_interval <= 0.0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "decision timer interval {} must be positive",
                timer_interval
            )));
        }
        if spike_history_size == 0 {
            return Err(EngineError::InvalidConfiguration(
                "spike history size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            layer,
            spike_history_size,
            rejection_threshold,
            timer_interval,
            last_decision_timestamp: 0.0,
        })
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn spike_history_size(&self) -> usize {
        self.spike_history_size
    }

    pub fn rejection_threshold(&self) -> f64 {
        self.rejection_threshold
    }

    pub fn timer_interval(&self) -> f64 {
        self.timer_interval
    }

    pub fn last_decision_timestamp(&self) -> f64 {
        self.last_decision_timestamp
    }

    /// Restart the timer at `timestamp`
    pub fn restart(&mut self, timestamp: f64) {
        self.last_decision_timestamp = timestamp;
    }

    /// Returns `true` when a full interval has elapsed since the last decision
    pub fn maybe_fire(&mut self, now: f64) -> bool {
        if now - self.last_decision_timestamp >= self.timer_interval {
            self.last_decision_timestamp = now;
            true
        } else {
            false
        }
    }

    /// Majority label of `histogram`, if its share reaches the rejection threshold
    ///
    /// Count ties resolve to the lexicographically smallest label.
    pub fn assign_label(&self, histogram: &LabelHistogram) -> Option<String> {
        let total: u32 = histogram.values().sum();
        if total == 0 {
            return None;
        }

        let (label, count) = histogram
            .iter()
            .max_by(|(a_label, a_count), (b_label, b_count)| {
                a_count.cmp(b_count).then_with(|| b_label.cmp(a_label))
            })?;

        let share = f64::from(*count) / f64::from(total);
        (share >= self.rejection_threshold).then(|| label.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(threshold: f64, interval: f64) -> DecisionController {
        DecisionController::configure(LayerId(2), 3, 10, threshold, interval).unwrap()
    }

    fn histogram(entries: &[(&str, u32)]) -> LabelHistogram {
        entries.iter().map(|(l, c)| (l.to_string(), *c)).collect()
    }

    #[test]
    fn test_rejects_non_terminal_layer() {
        let result = DecisionController::configure(LayerId(1), 3, 10, 0.5, 100.0);
        assert!(matches!(result, Err(EngineError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_rejects_unknown_layer() {
        let result = DecisionController::configure(LayerId(3), 3, 10, 0.5, 100.0);
        assert!(matches!(result, Err(EngineError::LayerNotFound(LayerId(3)))));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        for threshold in [-0.1, 1.01, f64::NAN] {
            let result = DecisionController::configure(LayerId(2), 3, 10, threshold, 100.0);
            assert!(matches!(result, Err(EngineError::InvalidConfiguration(_))));
        }
    }

    #[test]
    fn test_timer_fires_once_per_interval() {
        let mut decision = controller(0.5, 100.0);
        let fires = (0..=1000).filter(|&t| decision.maybe_fire(t as f64)).count();
        assert_eq!(fires, 10);
        assert_eq!(decision.last_decision_timestamp(), 1000.0);
    }

    #[test]
    fn test_majority_label_respects_threshold() {
        let decision = controller(0.6, 100.0);
        assert_eq!(
            decision.assign_label(&histogram(&[("cat", 7), ("dog", 3)])),
            Some("cat".to_string())
        );
        assert_eq!(decision.assign_label(&histogram(&[("cat", 5), ("dog", 5)])), None);
        assert_eq!(decision.assign_label(&LabelHistogram::default()), None);
    }

    #[test]
    fn test_majority_tie_breaks_lexicographically() {
        let decision = controller(0.0, 100.0);
        assert_eq!(
            decision.assign_label(&histogram(&[("dog", 2), ("cat", 2)])),
            Some("cat".to_string())
        );
    }
}
