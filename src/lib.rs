// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spikeflow - Event-driven and clock-driven spiking neural networks
//!
//! spikeflow simulates spiking neural networks with two interchangeable schedulers:
//! an exact-time event-driven loop and a fixed-timestep loop. Neuron and synapse
//! models are open traits; learning rules and observers plug in through hooks.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! spikeflow = "0.3"
//! ```
//!
//! ```rust,no_run
//! use spikeflow::prelude::*;
//!
//! let mut network = Network::new();
//! let inputs = network.add_layer(2, ParrotNeuron::new)?;
//! let outputs = network.add_layer(1, |core| LifNeuron::new(core, LifParameters::default()))?;
//! network.connect_layers(inputs, outputs, 12.0, 1.0)?;
//!
//! let recorder = SpikeRecorder::new();
//! network.add_addon(recorder.clone());
//! network.inject_spike(NeuronId(0), 5.0)?;
//!
//! // timestep 0 selects the event-driven scheduler
//! let stats = network.run(0.0, 0.0, false)?;
//! println!("{} spikes dispatched", stats.dispatched_spikes);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`plasticity`** (default): reference STDP learning rule
//! - **`file-logging`**: rotated per-run log files
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: spikeflow-config, spikeflow-observability  │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Contracts: spikeflow-neural                            │
//! │  (Spike, Neuron, Synapse, NetworkContext)               │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Simulation: spikeflow-engine, spikeflow-plasticity     │
//! │  (Queues, schedulers, decision layer, STDP)             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use spikeflow_config as config;
pub use spikeflow_engine as engine;
pub use spikeflow_neural as neural;
pub use spikeflow_observability as observability;

#[cfg(feature = "plasticity")]
pub use spikeflow_plasticity as plasticity;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{load_config, validate_config, SimulationConfig};
    pub use crate::engine::{
        Addon, ClassificationLogger, EngineError, EngineResult, MainThreadAddon, Network,
        NetworkSettings, NetworkView, RunStats, SnapshotRelay, SpikeRecorder, SpikeTrain,
        StartGate, TrainingLabel,
    };
    pub use crate::neural::{
        DecisionNeuron, DiracSynapse, ExponentialSynapse, LayerId, LearningRule, LifNeuron,
        LifParameters, NetworkContext, Neuron, NeuronCore, NeuronId, ParrotNeuron, Spike,
        SpikeKind, Synapse, SynapseCore, SynapseId,
    };

    #[cfg(feature = "plasticity")]
    pub use crate::plasticity::{Stdp, StdpConfig};
}
