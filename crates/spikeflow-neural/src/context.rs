// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The running network as seen by a neuron model
//!
//! The scheduler implements [`NetworkContext`] and hands it to every `update` call.
//! Models never see the scheduler's queues directly; they schedule work through
//! [`emit_spike`](NetworkContext::emit_spike) and
//! [`predict_spike`](NetworkContext::predict_spike) and report what happened
//! through the notification methods, which the scheduler forwards to add-ons.

use crate::models::Neuron;
use crate::synapse::Synapse;
use crate::types::{AddonId, Result, Spike, SynapseId};

pub trait NetworkContext {
    fn synapse(&self, id: SynapseId) -> Result<&dyn Synapse>;

    fn synapse_mut(&mut self, id: SynapseId) -> Result<&mut dyn Synapse>;

    /// Schedule a spike on the timestamp-ordered queue
    fn emit_spike(&mut self, spike: Spike);

    /// Schedule a forecast, replacing any pending forecast for the same synapse
    ///
    /// Ignored when [`predictions_enabled`](Self::predictions_enabled) is false.
    fn predict_spike(&mut self, spike: Spike);

    /// Withdraw the pending forecast for `target`; a no-op when none is queued
    fn cancel_prediction(&mut self, target: SynapseId);

    /// True only in event-driven mode
    fn predictions_enabled(&self) -> bool;

    fn learning_enabled(&self) -> bool;

    fn is_classifying(&self) -> bool;

    /// Run the learning rules attached to `neuron`; a no-op while learning is off
    fn request_learning(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        neuron: &dyn Neuron,
    ) -> Result<()>;

    fn incoming_spike(&mut self, timestamp: f64, synapse: Option<SynapseId>, neuron: &dyn Neuron);

    fn neuron_fired(&mut self, timestamp: f64, synapse: Option<SynapseId>, neuron: &dyn Neuron);

    /// Clock-mode notification, once per `update_sync` call
    fn timestep_elapsed(&mut self, timestamp: f64, neuron: &dyn Neuron);

    /// Add-ons that every neuron reports to
    fn global_addons(&self) -> Vec<AddonId>;
}
