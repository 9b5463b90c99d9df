// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Learning rule hook
//!
//! Rules are owned by the network and attached to neurons by id. A neuron asks for
//! learning through [`NetworkContext::request_learning`](crate::NetworkContext::request_learning)
//! after it fires; the network then calls [`LearningRule::learn`] for every rule the
//! neuron carries. Only one neuron is ever updated at a time, so rules can rewrite
//! weights without locking.

use crate::models::Neuron;
use crate::synapse::SynapseArena;
use crate::types::{Result, SynapseId};

pub trait LearningRule: Send {
    fn name(&self) -> &'static str;

    /// Adjust synapses after `neuron` fired at `timestamp`
    ///
    /// `neuron` still reports the spike time before this firing through
    /// [`Neuron::previous_spike_time`].
    fn learn(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        neuron: &dyn Neuron,
        synapses: &mut SynapseArena,
    ) -> Result<()>;

    /// Called once when a run completes
    fn on_completed(&mut self) {}
}
