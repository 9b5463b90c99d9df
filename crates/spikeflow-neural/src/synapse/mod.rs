// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Synapse capability contract
//!
//! A synapse turns presynaptic spikes into postsynaptic input in two ways:
//! an instantaneous potential jump returned by [`Synapse::receive_spike`], and a
//! persistent current read (and lazily decayed) through [`Synapse::update`].
//! Kernels pick whichever suits them.

pub mod arena;
pub mod dirac;
pub mod exponential;

pub use arena::SynapseArena;
pub use dirac::DiracSynapse;
pub use exponential::ExponentialSynapse;

use crate::types::{NeuronId, SynapseId};

/// State shared by every synapse kernel
#[derive(Debug, Clone, PartialEq)]
pub struct SynapseCore {
    pub id: SynapseId,
    /// `None` for initial synapses, which carry injected spikes
    pub presynaptic: Option<NeuronId>,
    pub postsynaptic: NeuronId,
    pub weight: f64,
    pub delay: f64,
    pub previous_input_time: Option<f64>,
}

impl SynapseCore {
    pub fn new(
        id: SynapseId,
        presynaptic: Option<NeuronId>,
        postsynaptic: NeuronId,
        weight: f64,
        delay: f64,
    ) -> Self {
        Self {
            id,
            presynaptic,
            postsynaptic,
            weight,
            delay,
            previous_input_time: None,
        }
    }
}

/// Synapse capability contract
///
/// Implementations must be cheap to call repeatedly with the same timestamp.
pub trait Synapse: Send {
    fn core(&self) -> &SynapseCore;
    fn core_mut(&mut self) -> &mut SynapseCore;

    /// Human-readable kernel name
    fn kernel_name(&self) -> &'static str;

    /// Decay internal state up to `timestamp` and return the current contribution
    fn update(&mut self, timestamp: f64) -> f64;

    /// Apply a presynaptic spike arriving at `timestamp`
    ///
    /// Returns the instantaneous jump in postsynaptic potential.
    fn receive_spike(&mut self, timestamp: f64) -> f64;

    /// Restore dynamic state; weight and delay are structural and survive
    fn reset(&mut self) {
        self.core_mut().previous_input_time = None;
    }

    fn id(&self) -> SynapseId {
        self.core().id
    }

    fn presynaptic(&self) -> Option<NeuronId> {
        self.core().presynaptic
    }

    fn postsynaptic(&self) -> NeuronId {
        self.core().postsynaptic
    }

    fn delay(&self) -> f64 {
        self.core().delay
    }

    fn weight(&self) -> f64 {
        self.core().weight
    }

    fn set_weight(&mut self, weight: f64) {
        self.core_mut().weight = weight;
    }

    fn previous_input_time(&self) -> Option<f64> {
        self.core().previous_input_time
    }
}
