// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Identity types for neurons, synapses, layers, add-ons and learning rules
//!
//! All ids are dense indices into the arena that owns the referenced object.

use core::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            /// Position of the referenced object in its owning arena
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

define_id!(
    /// Neuron ID (unique within one network)
    NeuronId,
    "Neuron"
);
define_id!(
    /// Synapse ID (unique identifier for a synaptic connection, including initial synapses)
    SynapseId,
    "Synapse"
);
define_id!(
    /// Layer ID (layers are numbered in creation order, input layer first)
    LayerId,
    "Layer"
);
define_id!(AddonId, "Addon");
define_id!(LearningRuleId, "LearningRule");
