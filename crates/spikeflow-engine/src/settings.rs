// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Network settings derived from [`SimulationConfig`]

use spikeflow_config::{DecisionConfig, SimulationConfig};
use spikeflow_neural::LayerId;

use crate::error::EngineResult;
use crate::network::Network;

/// Run parameters a [`Network`] keeps between runs
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSettings {
    /// `0` selects the event-driven scheduler
    pub timestep: f64,
    pub runtime: f64,
    /// Restored by every reset
    pub learning_off_signal: Option<f64>,
    /// Simulated time appended after the last input spike of a data run
    pub visualization_margin: f64,
    pub decision: DecisionConfig,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

impl From<&SimulationConfig> for NetworkSettings {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            timestep: config.scheduler.timestep,
            runtime: config.scheduler.runtime,
            learning_off_signal: config.learning.off_signal,
            visualization_margin: config.learning.visualization_margin,
            decision: config.decision.clone(),
        }
    }
}

impl Network {
    /// Configure `layer` as the decision layer from a [`DecisionConfig`] section
    pub fn configure_decision_from(&mut self, layer: LayerId, decision: &DecisionConfig) -> EngineResult<()> {
        self.configure_decision(
            layer,
            decision.spike_history_size,
            decision.rejection_threshold,
            decision.timer_interval,
        )
    }

    /// Run with the configured timestep and runtime
    pub fn run_configured(&mut self, classification: bool) -> EngineResult<crate::RunStats> {
        let (runtime, timestep) = (self.settings.runtime, self.settings.timestep);
        self.run(runtime, timestep, classification)
    }
}
