// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! STDP (Spike-Timing-Dependent Plasticity)
//!
//! Runs when a postsynaptic neuron fires at `t`:
//! - Δw = +A+ * exp(-(t - t_pre)/τ+) for dendrites whose last input arrived after the
//!   neuron's previous firing
//! - Δw = -A- * exp(-(t - t_post)/τ-) for the remaining dendrites, where `t_post` is the
//!   previous firing
//!
//! Weights are clamped to `[0, max_weight]`.

use serde::{Deserialize, Serialize};
use spikeflow_neural::{LearningRule, NeuralError, Neuron, Result, SynapseArena, SynapseId};
use tracing::{debug, trace};

/// STDP configuration parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StdpConfig {
    /// Potentiation learning rate (A+)
    pub a_plus: f64,

    /// Depression learning rate (A-)
    pub a_minus: f64,

    /// Potentiation time constant (τ+)
    pub tau_plus: f64,

    /// Depression time constant (τ-)
    pub tau_minus: f64,

    /// Upper weight bound
    pub max_weight: f64,
}

impl Default for StdpConfig {
    fn default() -> Self {
        Self {
            a_plus: 0.01,
            a_minus: 0.012,
            tau_plus: 20.0,
            tau_minus: 20.0,
            max_weight: 1.0,
        }
    }
}

impl StdpConfig {
    pub fn validate(&self) -> Result<()> {
        let rates = [("a_plus", self.a_plus), ("a_minus", self.a_minus)];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(NeuralError::InvalidParameter(format!(
                    "STDP {} = {} must be finite and non-negative",
                    name, value
                )));
            }
        }

        let positive = [
            ("tau_plus", self.tau_plus),
            ("tau_minus", self.tau_minus),
            ("max_weight", self.max_weight),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(NeuralError::InvalidParameter(format!(
                    "STDP {} = {} must be positive",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Potentiation for an input `elapsed` before the firing
    pub fn potentiation(&self, elapsed: f64) -> f64 {
        self.a_plus * (-elapsed / self.tau_plus).exp()
    }

    /// Depression for a previous firing `elapsed` before the current one
    pub fn depression(&self, elapsed: f64) -> f64 {
        self.a_minus * (-elapsed / self.tau_minus).exp()
    }
}

/// Pair-based STDP learning rule
#[derive(Debug, Clone)]
pub struct Stdp {
    config: StdpConfig,
    updates: u64,
}

impl Stdp {
    pub fn new(config: StdpConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, updates: 0 })
    }

    pub fn config(&self) -> &StdpConfig {
        &self.config
    }

    /// Weight changes applied since the last completed run
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl LearningRule for Stdp {
    fn name(&self) -> &'static str {
        "stdp"
    }

    fn learn(
        &mut self,
        timestamp: f64,
        _synapse: Option<SynapseId>,
        neuron: &dyn Neuron,
        synapses: &mut SynapseArena,
    ) -> Result<()> {
        let previous_post = neuron.previous_spike_time();

        for &id in neuron.dendrites() {
            let synapse = synapses.get_mut(id)?;
            let last_input = synapse.previous_input_time();

            let causal = match (last_input, previous_post) {
                (Some(pre), Some(post)) => pre > post && pre <= timestamp,
                (Some(pre), None) => pre <= timestamp,
                (None, _) => false,
            };

            let delta = match (causal, last_input, previous_post) {
                (true, Some(pre), _) => self.config.potentiation(timestamp - pre),
                (false, _, Some(post)) => -self.config.depression(timestamp - post),
                _ => continue,
            };

            let weight = (synapse.weight() + delta).clamp(0.0, self.config.max_weight);
            trace!(
                target: "spikeflow-plasticity",
                "[STDP] {} on {}: {:+.6} -> {:.6}",
                id,
                neuron.id(),
                delta,
                weight
            );
            synapse.set_weight(weight);
            self.updates += 1;
        }
        Ok(())
    }

    fn on_completed(&mut self) {
        debug!(target: "spikeflow-plasticity", "[STDP] {} weight updates this run", self.updates);
        self.updates = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spikeflow_neural::{
        DiracSynapse, LayerId, Neuron, NeuronCore, NeuronId, ParrotNeuron, Synapse, SynapseCore,
    };

    /// Arena with an initial synapse for neuron 1 and `weights.len()` dendrites from neuron 0
    fn setup(weights: &[f64]) -> (SynapseArena, NeuronCore) {
        let mut arena = SynapseArena::new();
        let initial = arena
            .push(Box::new(DiracSynapse::new(SynapseCore::new(
                SynapseId(0),
                None,
                NeuronId(1),
                1.0,
                0.0,
            ))))
            .unwrap();

        let mut core = NeuronCore::new(NeuronId(1), LayerId(1), initial);
        for &weight in weights {
            let id = arena.next_id();
            arena
                .push(Box::new(DiracSynapse::new(SynapseCore::new(
                    id,
                    Some(NeuronId(0)),
                    NeuronId(1),
                    weight,
                    0.0,
                ))))
                .unwrap();
            core.dendrites.push(id);
        }
        (arena, core)
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(StdpConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_time_constant() {
        let config = StdpConfig {
            tau_plus: 0.0,
            ..StdpConfig::default()
        };
        assert!(matches!(Stdp::new(config), Err(NeuralError::InvalidParameter(_))));
    }

    #[test]
    fn test_potentiates_recent_inputs_on_first_firing() {
        let (mut arena, core) = setup(&[0.5, 0.5]);
        arena.get_mut(SynapseId(1)).unwrap().receive_spike(8.0);
        let neuron = ParrotNeuron::new(core);

        let mut stdp = Stdp::new(StdpConfig::default()).unwrap();
        stdp.learn(10.0, None, &neuron, &mut arena).unwrap();

        let expected = 0.5 + 0.01 * (-2.0f64 / 20.0).exp();
        assert!((arena.get(SynapseId(1)).unwrap().weight() - expected).abs() < 1e-12);
        // No input and no previous firing: untouched
        assert_eq!(arena.get(SynapseId(2)).unwrap().weight(), 0.5);
        assert_eq!(arena.get(SynapseId(0)).unwrap().weight(), 1.0);
        assert_eq!(stdp.updates(), 1);
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let config: StdpConfig = serde_json::from_str(r#"{"a_plus":0.05}"#).unwrap();
        assert_eq!(config.a_plus, 0.05);
        assert_eq!(config.tau_minus, 20.0);
    }

    #[test]
    fn test_weights_clamped_to_bounds() {
        let (mut arena, core) = setup(&[0.999, 0.001]);
        arena.get_mut(SynapseId(1)).unwrap().receive_spike(10.0);
        let neuron = ParrotNeuron::new(core);

        let config = StdpConfig {
            a_plus: 0.5,
            a_minus: 0.5,
            ..StdpConfig::default()
        };
        let mut stdp = Stdp::new(config).unwrap();
        stdp.learn(10.0, None, &neuron, &mut arena).unwrap();

        assert_eq!(arena.get(SynapseId(1)).unwrap().weight(), 1.0);
        assert_eq!(neuron.dendrites().len(), 2);
    }
}
