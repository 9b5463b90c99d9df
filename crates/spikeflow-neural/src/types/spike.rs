// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The spike record
//!
//! A [`Spike`] is one scheduled propagation event. It is addressed to a synapse,
//! never directly to a neuron: the scheduler looks up the synapse's postsynaptic
//! neuron when the spike is dispatched.

use super::ids::SynapseId;

/// Why a spike exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum SpikeKind {
    /// Injected from outside the network
    Initial,
    /// Emitted by a neuron that crossed threshold
    Generated,
    /// A model asked to be re-evaluated once an integration window closes
    EndOfIntegration,
    /// Analytic forecast of a future threshold crossing
    Prediction,
    /// Manufactured by the decision controller during classification
    Decision,
    /// Clock-mode tick without any arriving spike
    None,
}

impl SpikeKind {
    /// Initial and generated spikes carry real input to the target neuron
    #[inline]
    pub fn is_normal(self) -> bool {
        matches!(self, SpikeKind::Initial | SpikeKind::Generated)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpikeKind::Initial => "initial",
            SpikeKind::Generated => "generated",
            SpikeKind::EndOfIntegration => "end_of_integration",
            SpikeKind::Prediction => "prediction",
            SpikeKind::Decision => "decision",
            SpikeKind::None => "none",
        }
    }
}

impl core::fmt::Display for SpikeKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled propagation event
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Spike {
    pub timestamp: f64,
    /// Synapse that delivers this spike; owned by the neuron that created the spike
    pub target: SynapseId,
    pub kind: SpikeKind,
}

impl Spike {
    pub fn new(timestamp: f64, target: SynapseId, kind: SpikeKind) -> Self {
        Self {
            timestamp,
            target,
            kind,
        }
    }
}
