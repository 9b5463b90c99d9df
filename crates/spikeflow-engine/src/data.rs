// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Input datasets for data-driven runs

use serde::{Deserialize, Serialize};
use spikeflow_neural::NeuronId;

use crate::error::{EngineError, EngineResult};

/// One externally injected spike
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputSpike {
    pub timestamp: f64,
    pub neuron: NeuronId,
}

/// A class label that applies from `onset` until the next label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingLabel {
    pub name: String,
    pub onset: f64,
}

impl TrainingLabel {
    pub fn new(name: impl Into<String>, onset: f64) -> Self {
        Self {
            name: name.into(),
            onset,
        }
    }
}

/// Spikes plus optional labels for one phase of a data run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpikeTrain {
    pub spikes: Vec<InputSpike>,
    #[serde(default)]
    pub labels: Vec<TrainingLabel>,
}

impl SpikeTrain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, timestamp: f64, neuron: NeuronId) {
        self.spikes.push(InputSpike { timestamp, neuron });
    }

    pub fn label(&mut self, name: impl Into<String>, onset: f64) {
        self.labels.push(TrainingLabel::new(name, onset));
    }

    pub fn len(&self) -> usize {
        self.spikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spikes.is_empty()
    }

    /// Latest spike timestamp, or `None` for an empty train
    pub fn last_timestamp(&self) -> Option<f64> {
        self.spikes
            .iter()
            .map(|spike| spike.timestamp)
            .max_by(f64::total_cmp)
    }

    /// Check every spike and label against a network of `neuron_count` neurons
    pub fn validate(&self, neuron_count: usize) -> EngineResult<()> {
        for spike in &self.spikes {
            if !spike.timestamp.is_finite() || spike.timestamp < 0.0 {
                return Err(EngineError::InvalidArgument(format!(
                    "input spike timestamp {} must be finite and non-negative",
                    spike.timestamp
                )));
            }
            if spike.neuron.index() >= neuron_count {
                return Err(EngineError::NeuronNotFound(spike.neuron));
            }
        }
        for label in &self.labels {
            if !label.onset.is_finite() || label.onset < 0.0 {
                return Err(EngineError::InvalidArgument(format!(
                    "label '{}' onset {} must be finite and non-negative",
                    label.name, label.onset
                )));
            }
        }
        Ok(())
    }
}
