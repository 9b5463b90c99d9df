// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Stock add-ons

pub mod classification;
pub mod recorder;
pub mod snapshot;

pub use classification::ClassificationLogger;
pub use recorder::{RecordedEvent, SpikeRecorder};
pub use snapshot::{NeuronSnapshot, SnapshotRelay};
