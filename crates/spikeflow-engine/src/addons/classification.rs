// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Records the label of every decision-layer firing during classification

use std::sync::Arc;

use parking_lot::Mutex;
use spikeflow_neural::{LayerId, Neuron, SynapseId};
use tracing::info;

use crate::addon::{Addon, NetworkView};

#[derive(Debug, Clone, Default)]
pub struct ClassificationLogger {
    decisions: Arc<Mutex<Vec<(f64, String)>>>,
    decision_layer: Option<LayerId>,
}

impl ClassificationLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(timestamp, label)` of every decision so far
    pub fn decisions(&self) -> Vec<(f64, String)> {
        self.decisions.lock().clone()
    }
}

impl Addon for ClassificationLogger {
    fn name(&self) -> &'static str {
        "classification-logger"
    }

    fn on_start(&mut self, network: &NetworkView<'_>) {
        self.decision_layer = network.decision_layer();
    }

    fn neuron_fired(&mut self, timestamp: f64, _synapse: Option<SynapseId>, neuron: &dyn Neuron) {
        if Some(neuron.layer()) != self.decision_layer {
            return;
        }
        if let Some(label) = neuron.label() {
            self.decisions.lock().push((timestamp, label.to_string()));
        }
    }

    fn on_completed(&mut self, _network: &NetworkView<'_>) {
        info!(
            target: "spikeflow-engine",
            "[CLASSIFICATION] {} decisions recorded",
            self.decisions.lock().len()
        );
    }
}
