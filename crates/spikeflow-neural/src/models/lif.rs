// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # LIF (Leaky Integrate-and-Fire) Neuron Model
//!
//! ## Model Dynamics
//!
//! ```text
//! Synaptic input:
//!     jump  = Σ receive_spike() of the arriving synapse   (instantaneous)
//!     I     = Σ update(t) over all dendrites               (persistent current)
//!
//! Membrane potential over an interval Δt with constant I:
//!     e      = exp(-Δt / τ)
//!     V(t+Δt) = V_rest + I × (1 - e) + (V(t) - V_rest) × e
//!
//! Threshold crossing (only when I > θ - V_rest):
//!     Δt* = τ × ln( (I - (V - V_rest)) / (I - (θ - V_rest)) )
//!
//! Firing:
//!     V ≥ θ and not refractory  →  FIRE, V ← V_rest, refractory for t_ref
//! ```
//!
//! Event-driven updates integrate the exact elapsed time and forecast the next
//! crossing with Δt*. Fixed-timestep updates decay by one `timestep` per tick.

use super::traits::{propagate, Neuron, NeuronCore};
use crate::context::NetworkContext;
use crate::types::{NeuralError, Result, Spike, SpikeKind, SynapseId};

/// Slack allowed when a forecast crossing is re-checked
const THRESHOLD_TOLERANCE: f64 = 1e-6;

/// Forecasts never land on the current timestamp
const MIN_PREDICTION_STEP: f64 = 1e-9;

/// LIF model parameters, in mV and ms
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct LifParameters {
    pub resting_potential: f64,
    pub threshold: f64,
    pub membrane_time_constant: f64,
    pub refractory_period: f64,
}

impl Default for LifParameters {
    fn default() -> Self {
        Self {
            resting_potential: -70.0,
            threshold: -50.0,
            membrane_time_constant: 10.0,
            refractory_period: 3.0,
        }
    }
}

impl LifParameters {
    pub fn validate(&self) -> Result<()> {
        if !self.membrane_time_constant.is_finite() || self.membrane_time_constant <= 0.0 {
            return Err(NeuralError::InvalidParameter(format!(
                "LIF: membrane time constant must be positive, got {}",
                self.membrane_time_constant
            )));
        }
        if !self.refractory_period.is_finite() || self.refractory_period < 0.0 {
            return Err(NeuralError::InvalidParameter(format!(
                "LIF: refractory period must be non-negative, got {}",
                self.refractory_period
            )));
        }
        if !(self.resting_potential.is_finite() && self.threshold.is_finite())
            || self.threshold <= self.resting_potential
        {
            return Err(NeuralError::InvalidParameter(format!(
                "LIF: threshold {} must lie above resting potential {}",
                self.threshold, self.resting_potential
            )));
        }
        Ok(())
    }
}

/// Leaky integrate-and-fire neuron
#[derive(Debug, Clone)]
pub struct LifNeuron {
    core: NeuronCore,
    params: LifParameters,
    potential: f64,
    /// Summed dendritic current as of `last_integration`
    current: f64,
    last_integration: f64,
    last_decay_tick: Option<f64>,
    refractory_until: f64,
    previous_spike_time: Option<f64>,
}

impl LifNeuron {
    pub fn new(core: NeuronCore, params: LifParameters) -> Self {
        Self {
            core,
            params,
            potential: params.resting_potential,
            current: 0.0,
            last_integration: 0.0,
            last_decay_tick: None,
            refractory_until: f64::NEG_INFINITY,
            previous_spike_time: None,
        }
    }

    pub fn parameters(&self) -> &LifParameters {
        &self.params
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    fn is_refractory(&self, timestamp: f64) -> bool {
        timestamp < self.refractory_until
    }

    fn relax(&mut self, span: f64) {
        let rest = self.params.resting_potential;
        let decay = (-span / self.params.membrane_time_constant).exp();
        self.potential = rest + self.current * (1.0 - decay) + (self.potential - rest) * decay;
    }

    /// Advance the membrane to `timestamp` under the current as of the last event
    fn integrate(&mut self, timestamp: f64) {
        if timestamp <= self.last_integration {
            return;
        }
        if self.is_refractory(timestamp) {
            self.potential = self.params.resting_potential;
        } else {
            let start = self.last_integration.max(self.refractory_until);
            self.relax(timestamp - start);
        }
        self.last_integration = timestamp;
    }

    fn receive(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
    ) -> Result<()> {
        ctx.incoming_spike(timestamp, synapse, &*self);
        if let Some(id) = synapse {
            let jump = ctx.synapse_mut(id)?.receive_spike(timestamp);
            if !self.is_refractory(timestamp) {
                self.potential += jump;
            }
        }
        Ok(())
    }

    fn sum_current(&self, timestamp: f64, ctx: &mut dyn NetworkContext) -> Result<f64> {
        let mut total = 0.0;
        for &id in core::iter::once(&self.core.initial_synapse).chain(self.core.dendrites.iter()) {
            total += ctx.synapse_mut(id)?.update(timestamp);
        }
        Ok(total)
    }

    fn fire(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
    ) -> Result<()> {
        ctx.neuron_fired(timestamp, synapse, &*self);
        if ctx.learning_enabled() {
            ctx.request_learning(timestamp, synapse, &*self)?;
        }
        self.previous_spike_time = Some(timestamp);
        self.potential = self.params.resting_potential;
        self.refractory_until = timestamp + self.params.refractory_period;
        propagate(ctx, timestamp, &self.core.axon_terminals)
    }

    /// Forecast the next threshold crossing under the present current
    ///
    /// Any earlier forecast is withdrawn when the new current no longer reaches threshold.
    fn predict(&self, timestamp: f64, ctx: &mut dyn NetworkContext) {
        let target = self.core.initial_synapse;
        let rest = self.params.resting_potential;
        let to_threshold = self.params.threshold - rest;
        if self.current <= to_threshold {
            ctx.cancel_prediction(target);
            return;
        }

        if self.is_refractory(timestamp) {
            // Re-evaluate once the refractory period is over
            ctx.predict_spike(Spike::new(
                self.refractory_until,
                target,
                SpikeKind::EndOfIntegration,
            ));
            return;
        }

        let ratio = (self.current - (self.potential - rest)) / (self.current - to_threshold);
        if !ratio.is_finite() || ratio <= 0.0 {
            ctx.cancel_prediction(target);
            return;
        }
        let delay = self.params.membrane_time_constant * ratio.ln();
        tracing::trace!(
            target: "spikeflow-neural",
            "[LIF] {} forecasts a crossing in {:.6}",
            self.core.id,
            delay
        );
        ctx.predict_spike(Spike::new(
            timestamp + delay.max(MIN_PREDICTION_STEP),
            target,
            SpikeKind::Prediction,
        ));
    }
}

impl Neuron for LifNeuron {
    fn core(&self) -> &NeuronCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NeuronCore {
        &mut self.core
    }

    fn model_name(&self) -> &'static str {
        "Leaky Integrate-and-Fire (LIF)"
    }

    fn potential(&self) -> f64 {
        self.potential
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
        self.params.validate()?;
        self.integrate(timestamp);

        if kind.is_normal() {
            self.receive(timestamp, synapse, ctx)?;
        }
        self.current = self.sum_current(timestamp, ctx)?;

        let crossed = self.potential >= self.params.threshold - THRESHOLD_TOLERANCE;
        if crossed && !self.is_refractory(timestamp) {
            self.fire(timestamp, synapse, ctx)?;
        }

        if ctx.predictions_enabled() {
            self.predict(timestamp, ctx);
        }
        Ok(())
    }

    fn update_sync(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
        timestep: f64,
        kind: SpikeKind,
    ) -> Result<()> {
        self.params.validate()?;

        // Several spikes on one tick share a single decay step
        if self.last_decay_tick != Some(timestamp) {
            if self.is_refractory(timestamp) {
                self.potential = self.params.resting_potential;
            } else {
                self.relax(timestep);
            }
            self.last_decay_tick = Some(timestamp);
            self.last_integration = timestamp;
        }

        if kind.is_normal() {
            self.receive(timestamp, synapse, ctx)?;
        }
        self.current = self.sum_current(timestamp, ctx)?;

        if self.potential >= self.params.threshold && !self.is_refractory(timestamp) {
            self.fire(timestamp, synapse, ctx)?;
        }

        ctx.timestep_elapsed(timestamp, &*self);
        Ok(())
    }

    fn reset(&mut self, _ctx: &mut dyn NetworkContext, clear_addons: bool) {
        self.potential = self.params.resting_potential;
        self.current = 0.0;
        self.last_integration = 0.0;
        self.last_decay_tick = None;
        self.refractory_until = f64::NEG_INFINITY;
        self.previous_spike_time = None;
        if clear_addons {
            self.core.relevant_addons.clear();
        }
    }
}
