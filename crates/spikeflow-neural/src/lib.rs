// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # spikeflow Neural Contracts
//!
//! Everything a scheduler needs to know about neurons and synapses, and nothing more:
//! - **Types**: identifiers, the [`Spike`] record and [`SpikeKind`]
//! - **Synapse**: the [`Synapse`] capability contract, the [`SynapseArena`] and two kernels
//! - **Models**: the [`Neuron`] capability contract and reference neuron models
//! - **Context**: [`NetworkContext`], the view of the running network handed to models
//! - **Learning**: the [`LearningRule`] hook
//!
//! Neurons and synapses never hold references to each other. They are addressed by
//! stable integer ids, and a model reaches its synapses through the context.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod context;
pub mod learning;
pub mod models;
pub mod synapse;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use context::NetworkContext;
pub use learning::LearningRule;
pub use models::{
    propagate, DecisionNeuron, LifNeuron, LifParameters, Neuron, NeuronCore, ParrotNeuron,
};
pub use synapse::{DiracSynapse, ExponentialSynapse, Synapse, SynapseArena, SynapseCore};
pub use types::{
    AddonId, LayerId, LearningRuleId, NeuralError, NeuronId, Result, Spike, SpikeKind, SynapseId,
};
