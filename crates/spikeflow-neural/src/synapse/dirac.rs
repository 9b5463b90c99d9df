// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Dirac kernel: each spike moves the potential by exactly `weight`, no lingering current.

use super::{Synapse, SynapseCore};

#[derive(Debug, Clone)]
pub struct DiracSynapse {
    core: SynapseCore,
}

impl DiracSynapse {
    pub fn new(core: SynapseCore) -> Self {
        Self { core }
    }
}

impl Synapse for DiracSynapse {
    fn core(&self) -> &SynapseCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SynapseCore {
        &mut self.core
    }

    fn kernel_name(&self) -> &'static str {
        "dirac"
    }

    #[inline]
    fn update(&mut self, _timestamp: f64) -> f64 {
        0.0
    }

    #[inline]
    fn receive_spike(&mut self, timestamp: f64) -> f64 {
        self.core.previous_input_time = Some(timestamp);
        self.core.weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NeuronId, SynapseId};

    #[test]
    fn test_jump_equals_weight() {
        let mut synapse = DiracSynapse::new(SynapseCore::new(
            SynapseId(0),
            Some(NeuronId(0)),
            NeuronId(1),
            2.5,
            1.0,
        ));
        assert_eq!(synapse.receive_spike(3.0), 2.5);
        assert_eq!(synapse.update(4.0), 0.0);
        assert_eq!(synapse.previous_input_time(), Some(3.0));

        synapse.reset();
        assert_eq!(synapse.previous_input_time(), None);
        assert_eq!(synapse.weight(), 2.5);
    }
}
