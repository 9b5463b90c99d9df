// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Arena of boxed synapses addressed by [`SynapseId`]

use super::Synapse;
use crate::types::{NeuralError, Result, SynapseId};

/// Owns every synapse of a network; ids are positions in the arena
#[derive(Default)]
pub struct SynapseArena {
    synapses: Vec<Box<dyn Synapse>>,
}

impl SynapseArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.synapses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synapses.is_empty()
    }

    /// Id the next inserted synapse must carry
    pub fn next_id(&self) -> SynapseId {
        SynapseId::from_index(self.synapses.len())
    }

    /// Insert a synapse built for [`next_id`](Self::next_id)
    pub fn push(&mut self, synapse: Box<dyn Synapse>) -> Result<SynapseId> {
        let expected = self.next_id();
        if synapse.id() != expected {
            return Err(NeuralError::InvalidParameter(format!(
                "synapse carries id {} but the next free slot is {}",
                synapse.id(),
                expected
            )));
        }
        self.synapses.push(synapse);
        Ok(expected)
    }

    pub fn get(&self, id: SynapseId) -> Result<&dyn Synapse> {
        self.synapses
            .get(id.index())
            .map(|s| s.as_ref())
            .ok_or(NeuralError::SynapseNotFound(id))
    }

    pub fn get_mut(&mut self, id: SynapseId) -> Result<&mut dyn Synapse> {
        match self.synapses.get_mut(id.index()) {
            Some(synapse) => Ok(synapse.as_mut()),
            None => Err(NeuralError::SynapseNotFound(id)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Synapse> {
        self.synapses.iter().map(|s| s.as_ref())
    }

    /// Largest delay of any synapse, `0` for an empty arena
    pub fn max_delay(&self) -> f64 {
        self.synapses
            .iter()
            .map(|s| s.delay())
            .fold(0.0, f64::max)
    }

    /// Reset dynamic state of every synapse
    pub fn reset_all(&mut self) {
        for synapse in &mut self.synapses {
            synapse.reset();
        }
    }
}

impl core::fmt::Debug for SynapseArena {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SynapseArena")
            .field("len", &self.synapses.len())
            .finish()
    }
}
