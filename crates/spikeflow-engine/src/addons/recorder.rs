// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory recording of scheduler and neuron events
//!
//! Clones share one buffer, so a test or caller keeps a handle while the
//! network owns the registered copy.

use std::sync::Arc;

use parking_lot::Mutex;
use spikeflow_neural::{Neuron, NeuronId, SpikeKind, SynapseId};

use crate::addon::Addon;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    Dispatch {
        timestamp: f64,
        neuron: NeuronId,
        kind: SpikeKind,
    },
    Incoming {
        timestamp: f64,
        neuron: NeuronId,
        synapse: Option<SynapseId>,
    },
    Fired {
        timestamp: f64,
        neuron: NeuronId,
    },
    Tick {
        timestamp: f64,
        neuron: NeuronId,
        potential: f64,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SpikeRecorder {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl SpikeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// `(timestamp, neuron, kind)` of every scheduler dispatch, in order
    pub fn dispatches(&self) -> Vec<(f64, NeuronId, SpikeKind)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match *event {
                RecordedEvent::Dispatch {
                    timestamp,
                    neuron,
                    kind,
                } => Some((timestamp, neuron, kind)),
                _ => None,
            })
            .collect()
    }

    pub fn firings(&self) -> Vec<(f64, NeuronId)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match *event {
                RecordedEvent::Fired { timestamp, neuron } => Some((timestamp, neuron)),
                _ => None,
            })
            .collect()
    }

    /// Dispatches delivered to `neuron`
    pub fn dispatches_for(&self, neuron: NeuronId) -> Vec<(f64, SpikeKind)> {
        self.dispatches()
            .into_iter()
            .filter(|(_, id, _)| *id == neuron)
            .map(|(t, _, kind)| (t, kind))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn record(&self, event: RecordedEvent) {
        self.events.lock().push(event);
    }
}

impl Addon for SpikeRecorder {
    fn name(&self) -> &'static str {
        "spike-recorder"
    }

    fn dispatch(&mut self, timestamp: f64, neuron: NeuronId, kind: SpikeKind) {
        self.record(RecordedEvent::Dispatch {
            timestamp,
            neuron,
            kind,
        });
    }

    fn incoming_spike(&mut self, timestamp: f64, synapse: Option<SynapseId>, neuron: &dyn Neuron) {
        self.record(RecordedEvent::Incoming {
            timestamp,
            neuron: neuron.id(),
            synapse,
        });
    }

    fn neuron_fired(&mut self, timestamp: f64, _synapse: Option<SynapseId>, neuron: &dyn Neuron) {
        self.record(RecordedEvent::Fired {
            timestamp,
            neuron: neuron.id(),
        });
    }

    fn timestep(&mut self, timestamp: f64, neuron: &dyn Neuron) {
        self.record(RecordedEvent::Tick {
            timestamp,
            neuron: neuron.id(),
            potential: neuron.potential(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let recorder = SpikeRecorder::new();
        let mut registered = recorder.clone();

        registered.dispatch(1.0, NeuronId(0), SpikeKind::Initial);
        registered.dispatch(2.0, NeuronId(1), SpikeKind::Generated);

        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.dispatches_for(NeuronId(1)), vec![(2.0, SpikeKind::Generated)]);

        recorder.clear();
        assert!(registered.is_empty());
    }
}
