// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Exponential Synapse Kernel
//!
//! ```text
//! On spike:    I ← I + weight
//! Between:     I(t) = I(t₀) × exp(-(t - t₀) / τ)
//! ```
//!
//! The kernel produces no instantaneous jump; the postsynaptic neuron integrates
//! the decaying current instead.

use super::{Synapse, SynapseCore};
use crate::types::{NeuralError, Result};

#[derive(Debug, Clone)]
pub struct ExponentialSynapse {
    core: SynapseCore,
    tau: f64,
    current: f64,
    last_update: f64,
}

impl ExponentialSynapse {
    /// Create an exponential kernel with time constant `tau`
    ///
    /// # Errors
    ///
    /// `tau` must be finite and strictly positive.
    pub fn new(core: SynapseCore, tau: f64) -> Result<Self> {
        if !tau.is_finite() || tau <= 0.0 {
            return Err(NeuralError::InvalidParameter(format!(
                "exponential synapse {} needs a positive time constant, got {}",
                core.id, tau
            )));
        }
        Ok(Self {
            core,
            tau,
            current: 0.0,
            last_update: 0.0,
        })
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Current without advancing time
    pub fn current(&self) -> f64 {
        self.current
    }
}

impl Synapse for ExponentialSynapse {
    fn core(&self) -> &SynapseCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SynapseCore {
        &mut self.core
    }

    fn kernel_name(&self) -> &'static str {
        "exponential"
    }

    fn update(&mut self, timestamp: f64) -> f64 {
        let elapsed = timestamp - self.last_update;
        if elapsed > 0.0 {
            self.current *= (-elapsed / self.tau).exp();
            self.last_update = timestamp;
        }
        self.current
    }

    fn receive_spike(&mut self, timestamp: f64) -> f64 {
        self.update(timestamp);
        self.current += self.core.weight;
        self.core.previous_input_time = Some(timestamp);
        0.0
    }

    fn reset(&mut self) {
        self.current = 0.0;
        self.last_update = 0.0;
        self.core.previous_input_time = None;
    }
}
