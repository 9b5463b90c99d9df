// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types raised by neuron and synapse models

use super::ids::{LearningRuleId, NeuronId, SynapseId};

/// Errors surfaced by models, synapses and learning rules
///
/// A model error aborts the run that triggered it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NeuralError {
    #[error("Neuron not found: {0}")]
    NeuronNotFound(NeuronId),

    #[error("Synapse not found: {0}")]
    SynapseNotFound(SynapseId),

    #[error("Learning rule not found: {0}")]
    LearningRuleNotFound(LearningRuleId),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Model failure in {model}: {reason}")]
    ModelFailure { model: String, reason: String },
}

pub type Result<T> = core::result::Result<T, NeuralError>;
