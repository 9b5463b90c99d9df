// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Add-on Observers
//!
//! Add-ons receive run lifecycle and per-neuron notifications. A network holds
//! any number of [`Addon`]s plus at most one [`MainThreadAddon`], which owns the
//! calling thread while the scheduler runs on a worker and decides when the
//! worker may start through a [`StartGate`].
//!
//! Add-ons observe; they must not mutate network state. Values they want to keep
//! are copied out of the borrowed neuron.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use spikeflow_neural::{LayerId, Neuron, NeuronId, SpikeKind, SynapseArena, SynapseId};

use crate::context::Layer;

/// Observer of a running network
///
/// Per-neuron notifications go to add-ons registered as global and to add-ons
/// registered for that specific neuron.
pub trait Addon: Send {
    fn name(&self) -> &'static str {
        "addon"
    }

    /// Once per run, before the scheduler starts
    fn on_start(&mut self, _network: &NetworkView<'_>) {}

    /// Before every neuron update issued by the scheduler
    fn dispatch(&mut self, _timestamp: f64, _neuron: NeuronId, _kind: SpikeKind) {}

    fn incoming_spike(&mut self, _timestamp: f64, _synapse: Option<SynapseId>, _neuron: &dyn Neuron) {}

    fn neuron_fired(&mut self, _timestamp: f64, _synapse: Option<SynapseId>, _neuron: &dyn Neuron) {}

    /// After a fixed-timestep update of `neuron`
    fn timestep(&mut self, _timestamp: f64, _neuron: &dyn Neuron) {}

    /// Once, between training and classification of a data run
    fn on_predict(&mut self, _network: &NetworkView<'_>) {}

    /// Once per run, after the scheduler finishes
    fn on_completed(&mut self, _network: &NetworkView<'_>) {}
}

/// Add-on that needs the calling thread, typically a UI event loop
pub trait MainThreadAddon: Send {
    /// Runs while the scheduler waits on `gate`
    ///
    /// Returning without calling [`StartGate::open`] releases the scheduler too.
    /// The run finishes once both this call and the scheduler return.
    fn begin(&mut self, gate: StartGate);
}

#[derive(Debug, Default)]
struct GateState {
    open: Mutex<bool>,
    ready: Condvar,
}

/// Releasing side of the worker start gate; opens when dropped
#[derive(Debug)]
pub struct StartGate {
    state: Arc<GateState>,
}

/// Waiting side of the worker start gate
#[derive(Debug)]
pub(crate) struct GateWaiter {
    state: Arc<GateState>,
}

impl StartGate {
    /// A closed gate and its waiter
    pub(crate) fn closed() -> (StartGate, GateWaiter) {
        let state = Arc::new(GateState::default());
        (
            StartGate {
                state: Arc::clone(&state),
            },
            GateWaiter { state },
        )
    }

    /// Let the scheduler start. Calling it again has no effect.
    pub fn open(&self) {
        let mut open = self.state.open.lock();
        if !*open {
            *open = true;
            self.state.ready.notify_all();
        }
    }

    pub fn is_open(&self) -> bool {
        *self.state.open.lock()
    }
}

impl Drop for StartGate {
    fn drop(&mut self) {
        self.open();
    }
}

impl GateWaiter {
    pub(crate) fn wait(&self) {
        let mut open = self.state.open.lock();
        while !*open {
            self.state.ready.wait(&mut open);
        }
    }
}

/// Read-only view of a network handed to add-on lifecycle hooks
pub struct NetworkView<'a> {
    pub(crate) neurons: &'a [Box<dyn Neuron>],
    pub(crate) synapses: &'a SynapseArena,
    pub(crate) layers: &'a [Layer],
    pub(crate) decision_layer: Option<LayerId>,
    pub(crate) learning_enabled: bool,
}

impl<'a> NetworkView<'a> {
    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    pub fn neuron(&self, id: NeuronId) -> Option<&'a dyn Neuron> {
        self.neurons.get(id.index()).map(|neuron| neuron.as_ref())
    }

    pub fn neurons(&self) -> impl Iterator<Item = &'a dyn Neuron> + 'a {
        self.neurons.iter().map(|neuron| neuron.as_ref())
    }

    pub fn synapses(&self) -> &'a SynapseArena {
        self.synapses
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_neurons(&self, layer: LayerId) -> Option<&'a [NeuronId]> {
        self.layers.get(layer.index()).map(|l| l.neurons.as_slice())
    }

    pub fn decision_layer(&self) -> Option<LayerId> {
        self.decision_layer
    }

    pub fn learning_enabled(&self) -> bool {
        self.learning_enabled
    }
}
