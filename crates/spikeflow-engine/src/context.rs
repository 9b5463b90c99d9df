// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Scheduler-side implementation of [`NetworkContext`]

use ahash::{AHashMap, AHashSet};
use spikeflow_neural::{
    AddonId, LayerId, LearningRule, NetworkContext, NeuralError, Neuron, NeuronId, Result, Spike,
    SpikeKind, Synapse, SynapseArena, SynapseId,
};
use tracing::{debug, trace, warn};

use crate::addon::Addon;
use crate::decision::{DecisionController, LabelHistogram};
use crate::queue::EventQueues;
use crate::run_state::RunState;
use crate::RunStats;

/// A group of neurons addressed by [`LayerId`]
#[derive(Debug, Clone)]
pub(crate) struct Layer {
    pub neurons: Vec<NeuronId>,
    /// When `false`, spikes generated toward or injected into this layer are dropped
    pub propagates: bool,
}

pub(crate) struct AddonSlot {
    pub addon: Box<dyn Addon>,
    pub global: bool,
}

/// Everything a neuron may touch while it is being updated
///
/// Neurons are stored beside this context, not inside it, so a neuron can be
/// borrowed mutably while the context is handed to it.
pub struct SimulationContext {
    pub(crate) synapses: SynapseArena,
    pub(crate) layers: Vec<Layer>,
    pub(crate) neuron_layers: Vec<LayerId>,
    pub(crate) queues: EventQueues,
    pub(crate) state: RunState,
    pub(crate) addons: Vec<AddonSlot>,
    pub(crate) learning_rules: Vec<Box<dyn LearningRule>>,
    pub(crate) decision: Option<DecisionController>,
    pub(crate) histograms: AHashMap<NeuronId, LabelHistogram>,
    pub(crate) stats: RunStats,
    pub(crate) predictions_enabled: bool,
    /// Timestamp of the dispatch in progress
    pub(crate) now: f64,
    clamp_warned: AHashSet<NeuronId>,
}

impl SimulationContext {
    pub(crate) fn new() -> Self {
        Self {
            synapses: SynapseArena::new(),
            layers: Vec::new(),
            neuron_layers: Vec::new(),
            queues: EventQueues::new(),
            state: RunState::new(),
            addons: Vec::new(),
            learning_rules: Vec::new(),
            decision: None,
            histograms: AHashMap::new(),
            stats: RunStats::default(),
            predictions_enabled: false,
            now: 0.0,
            clamp_warned: AHashSet::new(),
        }
    }

    fn for_each_addon(&mut self, neuron: &dyn Neuron, mut notify: impl FnMut(&mut dyn Addon)) {
        for addon in &neuron.core().relevant_addons {
            if let Some(slot) = self.addons.get_mut(addon.index()) {
                notify(slot.addon.as_mut());
            }
        }
    }

    pub(crate) fn notify_dispatch(&mut self, timestamp: f64, neuron: &dyn Neuron, kind: SpikeKind) {
        let id = neuron.id();
        self.for_each_addon(neuron, |addon| addon.dispatch(timestamp, id, kind));
    }

    /// Returns the propagation flag of the layer that receives `synapse`
    fn target_propagates(&self, synapse: SynapseId) -> Option<bool> {
        let post = self.synapses.get(synapse).ok()?.postsynaptic();
        let layer = self.neuron_layers.get(post.index())?;
        self.layers.get(layer.index()).map(|l| l.propagates)
    }

    fn clamp_to_now(&mut self, mut spike: Spike) -> Spike {
        if spike.timestamp < self.now {
            let owner = self.synapse_owner(spike.target);
            if self.clamp_warned.insert(owner) {
                warn!(
                    target: "spikeflow-engine",
                    "[CONTEXT] {} spike for {} scheduled in the past (t={} < now={}), clamping",
                    spike.kind, spike.target, spike.timestamp, self.now
                );
            }
            self.stats.clamped_spikes += 1;
            spike.timestamp = self.now;
        }
        spike
    }

    fn synapse_owner(&self, synapse: SynapseId) -> NeuronId {
        self.synapses
            .get(synapse)
            .map(|s| s.postsynaptic())
            .unwrap_or(NeuronId(u32::MAX))
    }

    /// True, and counted as dropped, when an injected spike targets a non-propagating layer
    pub(crate) fn drop_gated_input(&mut self, spike: &Spike) -> bool {
        if spike.kind != SpikeKind::Initial || self.target_propagates(spike.target) != Some(false) {
            return false;
        }
        trace!(target: "spikeflow-engine", "[CONTEXT] dropping input spike for gated {}", spike.target);
        self.stats.dropped_spikes += 1;
        true
    }

    pub(crate) fn clear_warnings(&mut self) {
        self.clamp_warned.clear();
    }
}

impl NetworkContext for SimulationContext {
    fn synapse(&self, id: SynapseId) -> Result<&dyn Synapse> {
        self.synapses.get(id)
    }

    fn synapse_mut(&mut self, id: SynapseId) -> Result<&mut dyn Synapse> {
        self.synapses.get_mut(id)
    }

    fn emit_spike(&mut self, spike: Spike) {
        match self.target_propagates(spike.target) {
            Some(true) => {
                let spike = self.clamp_to_now(spike);
                self.queues.push_normal(spike);
            }
            Some(false) => {
                self.stats.dropped_spikes += 1;
            }
            None => {
                warn!(target: "spikeflow-engine", "[CONTEXT] dropping spike for unknown {}", spike.target);
                self.stats.dropped_spikes += 1;
            }
        }
    }

    fn predict_spike(&mut self, spike: Spike) {
        if !self.predictions_enabled {
            return;
        }
        let spike = self.clamp_to_now(spike);
        if self.queues.push_predicted(spike, spike.kind) {
            self.stats.superseded_predictions += 1;
        }
    }

    fn cancel_prediction(&mut self, target: SynapseId) {
        if self.queues.remove_predicted(target).is_some() {
            self.stats.superseded_predictions += 1;
        }
    }

    fn predictions_enabled(&self) -> bool {
        self.predictions_enabled
    }

    fn learning_enabled(&self) -> bool {
        self.state.learning_enabled()
    }

    fn is_classifying(&self) -> bool {
        self.state.is_classifying()
    }

    fn request_learning(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        neuron: &dyn Neuron,
    ) -> Result<()> {
        if !self.state.learning_enabled() {
            return Ok(());
        }
        for &rule_id in &neuron.core().learning_rules {
            let rule = self
                .learning_rules
                .get_mut(rule_id.index())
                .ok_or(NeuralError::LearningRuleNotFound(rule_id))?;
            rule.learn(timestamp, synapse, neuron, &mut self.synapses)?;
        }
        Ok(())
    }

    fn incoming_spike(&mut self, timestamp: f64, synapse: Option<SynapseId>, neuron: &dyn Neuron) {
        self.for_each_addon(neuron, |addon| addon.incoming_spike(timestamp, synapse, neuron));
    }

    fn neuron_fired(&mut self, timestamp: f64, synapse: Option<SynapseId>, neuron: &dyn Neuron) {
        self.stats.neurons_fired += 1;

        if !self.state.is_classifying() {
            if let Some(label) = self.state.current_label() {
                *self
                    .histograms
                    .entry(neuron.id())
                    .or_default()
                    .entry(label.to_string())
                    .or_insert(0) += 1;
            }
        }

        debug!(target: "spikeflow-engine", "[CONTEXT] {} fired at t={}", neuron.id(), timestamp);
        self.for_each_addon(neuron, |addon| addon.neuron_fired(timestamp, synapse, neuron));
    }

    fn timestep_elapsed(&mut self, timestamp: f64, neuron: &dyn Neuron) {
        self.for_each_addon(neuron, |addon| addon.timestep(timestamp, neuron));
    }

    fn global_addons(&self) -> Vec<AddonId> {
        self.addons
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.global)
            .map(|(index, _)| AddonId::from_index(index))
            .collect()
    }
}
