// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neural Types Module
//!
//! Identifiers, the spike record and the error type shared by every spikeflow crate.

pub mod error;
pub mod ids;
pub mod spike;

pub use error::{NeuralError, Result};
pub use ids::{AddonId, LayerId, LearningRuleId, NeuronId, SynapseId};
pub use spike::{Spike, SpikeKind};
