// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Input neuron: repeats every real spike it receives.

use super::traits::{propagate, Neuron, NeuronCore};
use crate::context::NetworkContext;
use crate::types::{Result, SpikeKind, SynapseId};

#[derive(Debug, Clone)]
pub struct ParrotNeuron {
    core: NeuronCore,
    previous_spike_time: Option<f64>,
}

impl ParrotNeuron {
    pub fn new(core: NeuronCore) -> Self {
        Self {
            core,
            previous_spike_time: None,
        }
    }

    fn relay(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
    ) -> Result<()> {
        if let Some(id) = synapse {
            ctx.synapse_mut(id)?.receive_spike(timestamp);
        }
        ctx.incoming_spike(timestamp, synapse, &*self);
        ctx.neuron_fired(timestamp, synapse, &*self);
        if ctx.learning_enabled() {
            ctx.request_learning(timestamp, synapse, &*self)?;
        }
        self.previous_spike_time = Some(timestamp);
        propagate(ctx, timestamp, &self.core.axon_terminals)
    }
}

impl Neuron for ParrotNeuron {
    fn core(&self) -> &NeuronCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NeuronCore {
        &mut self.core
    }

    fn model_name(&self) -> &'static str {
        "parrot"
    }

    fn potential(&self) -> f64 {
        0.0
    }

    fn previous_spike_time(&self) -> Option<f64> {
        self.previous_spike_time
    }

    fn update(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
        kind: SpikeKind,
    ) -> Result<()> {
        if kind.is_normal() {
            self.relay(timestamp, synapse, ctx)?;
        }
        Ok(())
    }

    fn update_sync(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
        _timestep: f64,
        kind: SpikeKind,
    ) -> Result<()> {
        if kind.is_normal() {
            self.relay(timestamp, synapse, ctx)?;
        }
        ctx.timestep_elapsed(timestamp, &*self);
        Ok(())
    }

    fn reset(&mut self, _ctx: &mut dyn NetworkContext, clear_addons: bool) {
        self.previous_spike_time = None;
        if clear_addons {
            self.core.relevant_addons.clear();
        }
    }
}
