// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Engine error types

use spikeflow_neural::{LayerId, NeuralError, NeuronId};

/// Errors raised by network building and runs
///
/// Argument and configuration errors are detected before any state is touched.
/// Model errors raised mid-run abort the run unchanged.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Network has no neurons")]
    EmptyNetwork,

    #[error("Pop on an empty event queue")]
    EmptyQueue,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Neuron not found: {0}")]
    NeuronNotFound(NeuronId),

    #[error("Layer not found: {0}")]
    LayerNotFound(LayerId),

    #[error("Failed to spawn scheduler thread: {0}")]
    WorkerSpawn(String),

    #[error(transparent)]
    Neural(#[from] NeuralError),
}

pub type EngineResult<T> = Result<T, EngineError>;
