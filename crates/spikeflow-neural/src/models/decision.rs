// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Decision (readout) neuron
//!
//! Collects incoming spikes as evidence and only fires when the decision controller
//! sends it a [`SpikeKind::Decision`] update. An ordinary spike never makes it fire.

use std::collections::VecDeque;

use super::traits::{propagate, Neuron, NeuronCore};
use crate::context::NetworkContext;
use crate::types::{Result, SpikeKind, SynapseId};

#[derive(Debug, Clone)]
pub struct DecisionNeuron {
    core: NeuronCore,
    history: VecDeque<f64>,
    history_size: usize,
    previous_spike_time: Option<f64>,
}

impl DecisionNeuron {
    pub fn new(core: NeuronCore, history_size: usize) -> Self {
        let history_size = history_size.max(1);
        Self {
            core,
            history: VecDeque::with_capacity(history_size),
            history_size,
            previous_spike_time: None,
        }
    }

    /// Timestamps of the evidence gathered since the last verdict, oldest first
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    fn record(&mut self, timestamp: f64) {
        if self.history.len() == self.history_size {
            self.history.pop_front();
        }
        self.history.push_back(timestamp);
    }

    fn handle(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
        kind: SpikeKind,
    ) -> Result<()> {
        match kind {
            SpikeKind::Initial | SpikeKind::Generated => {
                if let Some(id) = synapse {
                    ctx.synapse_mut(id)?.receive_spike(timestamp);
                }
                ctx.incoming_spike(timestamp, synapse, &*self);
                self.record(timestamp);
            }
            SpikeKind::Decision if !self.history.is_empty() => {
                ctx.neuron_fired(timestamp, synapse, &*self);
                self.previous_spike_time = Some(timestamp);
                self.history.clear();
                propagate(ctx, timestamp, &self.core.axon_terminals)?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl Neuron for DecisionNeuron {
    fn core(&self) -> &NeuronCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NeuronCore {
        &mut self.core
    }

    fn model_name(&self) -> &'static str {
        "decision"
    }

    /// Amount of evidence currently held
    fn potential(&self) -> f64 {
        self.history.len() as f64
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
        self.handle(timestamp, synapse, ctx, kind)
    }

    fn update_sync(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
        _timestep: f64,
        kind: SpikeKind,
    ) -> Result<()> {
        self.handle(timestamp, synapse, ctx, kind)?;
        ctx.timestep_elapsed(timestamp, &*self);
        Ok(())
    }

    fn reset(&mut self, _ctx: &mut dyn NetworkContext, clear_addons: bool) {
        self.history.clear();
        self.previous_spike_time = None;
        if clear_addons {
            self.core.relevant_addons.clear();
        }
    }
}
