// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Recording [`NetworkContext`] for model unit tests

use crate::context::NetworkContext;
use crate::models::Neuron;
use crate::synapse::{DiracSynapse, ExponentialSynapse, Synapse, SynapseArena, SynapseCore};
use crate::types::{AddonId, NeuronId, Result, Spike, SynapseId};

pub(crate) struct MockContext {
    pub synapses: SynapseArena,
    pub emitted: Vec<Spike>,
    pub predicted: Vec<Spike>,
    pub incoming: Vec<(f64, NeuronId)>,
    pub fired: Vec<(f64, NeuronId)>,
    pub ticks: Vec<(f64, NeuronId)>,
    pub learning_requests: Vec<(f64, NeuronId, Option<f64>)>,
    pub learning: bool,
    pub predictions: bool,
    pub classifying: bool,
    pub globals: Vec<AddonId>,
}

impl MockContext {
    pub fn new() -> Self {
        Self {
            synapses: SynapseArena::new(),
            emitted: Vec::new(),
            predicted: Vec::new(),
            incoming: Vec::new(),
            fired: Vec::new(),
            ticks: Vec::new(),
            learning_requests: Vec::new(),
            learning: true,
            predictions: true,
            classifying: false,
            globals: Vec::new(),
        }
    }

    pub fn add_dirac(
        &mut self,
        pre: Option<NeuronId>,
        post: NeuronId,
        weight: f64,
        delay: f64,
    ) -> SynapseId {
        let core = SynapseCore::new(self.synapses.next_id(), pre, post, weight, delay);
        self.synapses
            .push(Box::new(DiracSynapse::new(core)))
            .unwrap()
    }

    pub fn add_exponential(
        &mut self,
        pre: Option<NeuronId>,
        post: NeuronId,
        weight: f64,
        tau: f64,
    ) -> SynapseId {
        let core = SynapseCore::new(self.synapses.next_id(), pre, post, weight, 0.0);
        self.synapses
            .push(Box::new(ExponentialSynapse::new(core, tau).unwrap()))
            .unwrap()
    }
}

impl NetworkContext for MockContext {
    fn synapse(&self, id: SynapseId) -> Result<&dyn Synapse> {
        self.synapses.get(id)
    }

    fn synapse_mut(&mut self, id: SynapseId) -> Result<&mut dyn Synapse> {
        self.synapses.get_mut(id)
    }

    fn emit_spike(&mut self, spike: Spike) {
        self.emitted.push(spike);
    }

    fn predict_spike(&mut self, spike: Spike) {
        if self.predictions {
            self.predicted.retain(|p| p.target != spike.target);
            self.predicted.push(spike);
        }
    }

    fn cancel_prediction(&mut self, target: SynapseId) {
        self.predicted.retain(|p| p.target != target);
    }

    fn predictions_enabled(&self) -> bool {
        self.predictions
    }

    fn learning_enabled(&self) -> bool {
        self.learning
    }

    fn is_classifying(&self) -> bool {
        self.classifying
    }

    fn request_learning(
        &mut self,
        timestamp: f64,
        _synapse: Option<SynapseId>,
        neuron: &dyn Neuron,
    ) -> Result<()> {
        if self.learning {
            self.learning_requests
                .push((timestamp, neuron.id(), neuron.previous_spike_time()));
        }
        Ok(())
    }

    fn incoming_spike(&mut self, timestamp: f64, _synapse: Option<SynapseId>, neuron: &dyn Neuron) {
        self.incoming.push((timestamp, neuron.id()));
    }

    fn neuron_fired(&mut self, timestamp: f64, _synapse: Option<SynapseId>, neuron: &dyn Neuron) {
        self.fired.push((timestamp, neuron.id()));
    }

    fn timestep_elapsed(&mut self, timestamp: f64, neuron: &dyn Neuron) {
        self.ticks.push((timestamp, neuron.id()));
    }

    fn global_addons(&self) -> Vec<AddonId> {
        self.globals.clone()
    }
}
