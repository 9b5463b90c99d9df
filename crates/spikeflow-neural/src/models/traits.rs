// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Neuron capability contract

use crate::context::NetworkContext;
use crate::types::{
    AddonId, LayerId, LearningRuleId, NeuronId, Result, Spike, SpikeKind, SynapseId,
};

/// Structural state every neuron carries
///
/// The scheduler fills in ids and the initial synapse; wiring is appended as the
/// network is built.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronCore {
    pub id: NeuronId,
    pub layer: LayerId,
    /// Receives externally injected spikes
    pub initial_synapse: SynapseId,
    /// Incoming synapses from other neurons
    pub dendrites: Vec<SynapseId>,
    /// Outgoing synapses
    pub axon_terminals: Vec<SynapseId>,
    pub label: Option<String>,
    pub learning_rules: Vec<LearningRuleId>,
    /// Add-ons that receive this neuron's notifications
    pub relevant_addons: Vec<AddonId>,
}

impl NeuronCore {
    pub fn new(id: NeuronId, layer: LayerId, initial_synapse: SynapseId) -> Self {
        Self {
            id,
            layer,
            initial_synapse,
            dendrites: Vec::new(),
            axon_terminals: Vec::new(),
            label: None,
            learning_rules: Vec::new(),
            relevant_addons: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Register an add-on once
    pub fn add_relevant_addon(&mut self, addon: AddonId) {
        if !self.relevant_addons.contains(&addon) {
            self.relevant_addons.push(addon);
        }
    }
}

/// Neuron capability contract consumed by the scheduler
///
/// `update` is the event-driven entry point, `update_sync` the fixed-timestep one.
/// `synapse` is the synapse that delivered the spike, `None` for clock ticks and
/// manufactured updates that carry no input.
pub trait Neuron: Send {
    fn core(&self) -> &NeuronCore;
    fn core_mut(&mut self) -> &mut NeuronCore;

    fn model_name(&self) -> &'static str;

    /// Membrane potential (or the model's equivalent state variable)
    fn potential(&self) -> f64;

    fn previous_spike_time(&self) -> Option<f64>;

    /// Called once per run before any spike is dispatched
    fn initialise(&mut self, ctx: &mut dyn NetworkContext) -> Result<()> {
        for addon in ctx.global_addons() {
            self.core_mut().add_relevant_addon(addon);
        }
        Ok(())
    }

    fn update(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
        kind: SpikeKind,
    ) -> Result<()>;

    /// Fixed-timestep update; decays state by at most `timestep`
    fn update_sync(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
        timestep: f64,
        kind: SpikeKind,
    ) -> Result<()>;

    /// Restore dynamic state; wiring is left alone
    fn reset(&mut self, ctx: &mut dyn NetworkContext, clear_addons: bool);

    fn id(&self) -> NeuronId {
        self.core().id
    }

    fn layer(&self) -> LayerId {
        self.core().layer
    }

    fn label(&self) -> Option<&str> {
        self.core().label.as_deref()
    }

    fn dendrites(&self) -> &[SynapseId] {
        &self.core().dendrites
    }

    fn axon_terminals(&self) -> &[SynapseId] {
        &self.core().axon_terminals
    }
}

/// Emit one [`SpikeKind::Generated`] spike per axon terminal, delayed by the terminal's delay
pub fn propagate(ctx: &mut dyn NetworkContext, timestamp: f64, terminals: &[SynapseId]) -> Result<()> {
    for &terminal in terminals {
        let delay = ctx.synapse(terminal)?.delay();
        ctx.emit_spike(Spike::new(timestamp + delay, terminal, SpikeKind::Generated));
    }
    Ok(())
}
