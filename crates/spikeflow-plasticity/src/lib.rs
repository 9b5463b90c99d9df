// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # spikeflow Plasticity Module
//!
//! Synaptic learning rules invoked through the engine's learning hook:
//! - STDP (Spike-Timing-Dependent Plasticity)
//!
//! Rules only see the firing neuron and the synapse arena; the engine decides
//! whether learning is enabled.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod stdp;

pub use stdp::{Stdp, StdpConfig};
