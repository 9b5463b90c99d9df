// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Scheduler Loops
//!
//! - **Event-driven** (`timestep == 0`): repeatedly dispatch the earliest spike
//!   across the normal and predicted queues until both are empty.
//! - **Fixed-timestep** (`timestep > 0`): on each tick, deliver every normal spike
//!   that is due, then give every neuron that received nothing a `None` tick.
//!
//! Before each dispatch (event mode) or tick (clock mode) the scheduler applies
//! label onsets and the learning cutoff while training, or checks the decision
//! timer while classifying.

use roaring::RoaringBitmap;
use spikeflow_neural::{NeuronId, SpikeKind, SynapseId};
use tracing::{debug, info, trace, warn};

use crate::error::{EngineError, EngineResult};
use crate::network::Network;

/// Slack for floating-point division when counting ticks
const TICK_EPSILON: f64 = 1e-9;

impl Network {
    /// Event-driven loop; returns when both queues are empty
    pub(crate) fn run_event_driven(&mut self) -> EngineResult<()> {
        self.ctx.predictions_enabled = true;

        while let Some(spike) = self.ctx.queues.pop_next() {
            if self.ctx.drop_gated_input(&spike) {
                continue;
            }
            self.ctx.now = spike.timestamp;
            self.ctx.stats.dispatched_spikes += 1;
            if spike.kind == SpikeKind::Prediction {
                self.ctx.stats.predicted_dispatches += 1;
            }

            self.phase_step(spike.timestamp, None)?;

            let post = self.ctx.synapses.get(spike.target)?.postsynaptic();
            trace!(
                target: "spikeflow-engine",
                "[SCHEDULER] t={} {} spike via {} -> {}",
                spike.timestamp, spike.kind, spike.target, post
            );
            self.dispatch(spike.timestamp, Some(spike.target), post, spike.kind, None)?;
        }

        self.ctx.predictions_enabled = false;
        Ok(())
    }

    /// Fixed-timestep loop over ticks `0, dt, 2dt, ...` up to and including `runtime`
    pub(crate) fn run_clock(&mut self, runtime: f64, timestep: f64) -> EngineResult<()> {
        self.ctx.predictions_enabled = false;
        self.ctx.queues.clear_predicted();

        let last_tick = (runtime / timestep + TICK_EPSILON).floor() as u64;
        let mut updated = RoaringBitmap::new();
        debug!(target: "spikeflow-engine", "[SCHEDULER] clock run: {} ticks of {}", last_tick + 1, timestep);

        for tick in 0..=last_tick {
            let now = tick as f64 * timestep;
            self.ctx.now = now;
            self.ctx.stats.ticks += 1;
            updated.clear();

            for id in self.phase_step(now, Some(timestep))? {
                updated.insert(id.0);
            }

            while let Some(spike) = self.ctx.queues.pop_normal_due(now) {
                if self.ctx.drop_gated_input(&spike) {
                    continue;
                }
                self.ctx.stats.dispatched_spikes += 1;
                let post = self.ctx.synapses.get(spike.target)?.postsynaptic();
                self.dispatch(now, Some(spike.target), post, spike.kind, Some(timestep))?;
                updated.insert(post.0);
            }

            for index in 0..self.neurons.len() {
                let id = NeuronId::from_index(index);
                if updated.contains(id.0) || !self.receives_idle_tick(id) {
                    continue;
                }
                self.dispatch(now, None, id, SpikeKind::None, Some(timestep))?;
            }
        }
        Ok(())
    }

    /// Idle ticks go to layer 0 and to layers whose predecessor propagates
    fn receives_idle_tick(&self, neuron: NeuronId) -> bool {
        let Some(layer) = self.ctx.neuron_layers.get(neuron.index()) else {
            return false;
        };
        match layer.index().checked_sub(1) {
            None => true,
            Some(previous) => self.ctx.layers.get(previous).is_some_and(|l| l.propagates),
        }
    }

    /// Bookkeeping before a dispatch or tick at `now`
    ///
    /// Returns the decision neurons updated by a timer firing.
    fn phase_step(&mut self, now: f64, timestep: Option<f64>) -> EngineResult<Vec<NeuronId>> {
        if !self.ctx.state.is_classifying() {
            if self.ctx.state.advance(now) {
                info!(target: "spikeflow-engine", "[SCHEDULER] learning switched off at t={}", now);
            }
            return Ok(Vec::new());
        }

        let fire = self
            .ctx
            .decision
            .as_mut()
            .is_some_and(|decision| decision.maybe_fire(now));
        if fire {
            self.fire_decision_layer(now, timestep)
        } else {
            Ok(Vec::new())
        }
    }

    /// Send a `Decision` update to every decision neuron with an incoming connection
    fn fire_decision_layer(&mut self, now: f64, timestep: Option<f64>) -> EngineResult<Vec<NeuronId>> {
        let Some(layer) = self.ctx.decision.as_ref().map(|d| d.layer()) else {
            return Ok(Vec::new());
        };
        self.ctx.stats.decisions += 1;

        let members = self.neurons_in_layer(layer)?.to_vec();
        let mut dispatched = Vec::with_capacity(members.len());
        for id in members {
            let first: Option<SynapseId> = self.neurons[id.index()].dendrites().first().copied();
            match first {
                Some(synapse) => {
                    self.dispatch(now, Some(synapse), id, SpikeKind::Decision, timestep)?;
                    dispatched.push(id);
                }
                None => {
                    if self.decision_warned.insert(id.0) {
                        warn!(
                            target: "spikeflow-engine",
                            "[SCHEDULER] decision {} has no incoming connections, skipping",
                            id
                        );
                    }
                }
            }
        }
        Ok(dispatched)
    }

    /// Notify add-ons, then update `neuron`
    fn dispatch(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        neuron: NeuronId,
        kind: SpikeKind,
        timestep: Option<f64>,
    ) -> EngineResult<()> {
        let target = self
            .neurons
            .get_mut(neuron.index())
            .ok_or(EngineError::NeuronNotFound(neuron))?;

        self.ctx.notify_dispatch(timestamp, target.as_ref(), kind);
        match timestep {
            None => target.update(timestamp, synapse, &mut self.ctx, kind)?,
            Some(dt) => target.update_sync(timestamp, synapse, &mut self.ctx, dt, kind)?,
        }
        Ok(())
    }
}
