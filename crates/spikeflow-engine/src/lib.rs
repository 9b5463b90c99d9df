// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! # spikeflow Engine
//!
//! Dual-mode spike scheduler and run orchestration.
//!
//! ## Scheduling
//! - **Event-driven** (`timestep == 0`): exact-time dispatch from a normal spike
//!   queue merged with a queue of model forecasts
//! - **Fixed-timestep** (`timestep > 0`): tick-driven updates with idle ticks for
//!   neurons that received nothing
//!
//! ## Architecture
//! - Neurons and synapses in id-addressed arenas, no shared ownership
//! - Scheduler on a dedicated worker thread, calling thread lent to an optional UI add-on
//! - Learning cutoff, training labels and a timer-driven decision layer for classification

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod addon;
pub mod addons;
pub mod context;
pub mod data;
pub mod decision;
pub mod error;
pub mod network;
pub mod queue;
pub mod run_state;
mod runner;
mod scheduler;
pub mod settings;

pub use addon::{Addon, MainThreadAddon, NetworkView, StartGate};
pub use addons::{ClassificationLogger, NeuronSnapshot, RecordedEvent, SnapshotRelay, SpikeRecorder};
pub use context::SimulationContext;
pub use data::{InputSpike, SpikeTrain, TrainingLabel};
pub use decision::{DecisionController, LabelHistogram};
pub use error::{EngineError, EngineResult};
pub use network::Network;
pub use queue::EventQueues;
pub use run_state::RunState;
pub use settings::NetworkSettings;

/// Per-run scheduler statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Spikes popped from the queues
    pub dispatched_spikes: u64,
    /// Of which forecasts
    pub predicted_dispatches: u64,
    pub superseded_predictions: u64,
    /// Generated or injected spikes dropped because the receiving layer does not propagate
    pub dropped_spikes: u64,
    /// Spikes scheduled in the past and moved to the current time
    pub clamped_spikes: u64,
    pub neurons_fired: u64,
    /// Decision timer firings
    pub decisions: u64,
    /// Fixed-timestep ticks executed
    pub ticks: u64,
}

impl RunStats {
    /// Get average firings per dispatched spike
    pub fn firings_per_dispatch(&self) -> f64 {
        if self.dispatched_spikes == 0 {
            0.0
        } else {
            self.neurons_fired as f64 / self.dispatched_spikes as f64
        }
    }

    /// Get average dispatches per tick (fixed-timestep runs)
    pub fn dispatches_per_tick(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.dispatched_spikes as f64 / self.ticks as f64
        }
    }

    /// Fraction of dispatches that were forecasts
    pub fn prediction_ratio(&self) -> f64 {
        if self.dispatched_spikes == 0 {
            0.0
        } else {
            self.predicted_dispatches as f64 / self.dispatched_spikes as f64
        }
    }
}
