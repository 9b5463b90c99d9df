// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Neuron Model Architecture
//!
//! The scheduler only ever talks to the [`Neuron`] trait. Models are independent
//! implementations; users add their own the same way the reference models do.
//!
//! ## Adding a New Neuron Model
//!
//! 1. Create `src/models/your_model.rs`
//! 2. Embed a [`NeuronCore`] and implement [`Neuron`]
//! 3. Call [`propagate`] after firing so postsynaptic neurons receive the spike
//! 4. Add tests
//! 5. Export in `mod.rs`

pub mod decision;
pub mod lif;
pub mod parrot;
pub mod traits;

pub use decision::DecisionNeuron;
pub use lif::{LifNeuron, LifParameters};
pub use parrot::ParrotNeuron;
pub use traits::{propagate, Neuron, NeuronCore};
