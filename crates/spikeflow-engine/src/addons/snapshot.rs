// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Bounded hand-off of neuron state to another thread
//!
//! The scheduler never blocks on a slow consumer: when the channel is full the
//! snapshot is dropped and counted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use spikeflow_neural::{LayerId, Neuron, NeuronId, SynapseId};
use tracing::debug;

use crate::addon::{Addon, NetworkView};

/// Copied-out neuron state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeuronSnapshot {
    pub timestamp: f64,
    pub neuron: NeuronId,
    pub layer: LayerId,
    pub potential: f64,
    pub fired: bool,
}

impl NeuronSnapshot {
    fn capture(timestamp: f64, neuron: &dyn Neuron, fired: bool) -> Self {
        Self {
            timestamp,
            neuron: neuron.id(),
            layer: neuron.layer(),
            potential: neuron.potential(),
            fired,
        }
    }
}

pub struct SnapshotRelay {
    sender: Sender<NeuronSnapshot>,
    dropped: Arc<AtomicU64>,
}

impl SnapshotRelay {
    /// A relay and the receiving end of its channel
    pub fn channel(capacity: usize) -> (Self, Receiver<NeuronSnapshot>) {
        let (sender, receiver) = bounded(capacity);
        (
            Self {
                sender,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            receiver,
        )
    }

    /// Snapshots waiting for the consumer
    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    /// Shared counter of snapshots dropped because the consumer lagged
    pub fn dropped_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.dropped)
    }

    fn send(&self, snapshot: NeuronSnapshot) {
        match self.sender.try_send(snapshot) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            // Consumer gone
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

impl Addon for SnapshotRelay {
    fn name(&self) -> &'static str {
        "snapshot-relay"
    }

    fn incoming_spike(&mut self, timestamp: f64, _synapse: Option<SynapseId>, neuron: &dyn Neuron) {
        self.send(NeuronSnapshot::capture(timestamp, neuron, false));
    }

    fn neuron_fired(&mut self, timestamp: f64, _synapse: Option<SynapseId>, neuron: &dyn Neuron) {
        self.send(NeuronSnapshot::capture(timestamp, neuron, true));
    }

    fn timestep(&mut self, timestamp: f64, neuron: &dyn Neuron) {
        self.send(NeuronSnapshot::capture(timestamp, neuron, false));
    }

    fn on_completed(&mut self, _network: &NetworkView<'_>) {
        let dropped = self.dropped.load(Ordering::Relaxed);
        if dropped > 0 {
            debug!(target: "spikeflow-engine", "[SNAPSHOT] {} snapshots dropped, consumer lagging", dropped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spikeflow_neural::{NeuronCore, ParrotNeuron};

    fn parrot() -> ParrotNeuron {
        ParrotNeuron::new(NeuronCore::new(NeuronId(4), LayerId(1), SynapseId(4)))
    }

    #[test]
    fn test_full_channel_drops_and_counts() {
        let (mut relay, receiver) = SnapshotRelay::channel(1);
        let dropped = relay.dropped_counter();
        let neuron = parrot();

        relay.neuron_fired(1.0, None, &neuron);
        relay.neuron_fired(2.0, None, &neuron);

        let first = receiver.try_recv().unwrap();
        assert_eq!(first.timestamp, 1.0);
        assert_eq!(first.neuron, NeuronId(4));
        assert!(first.fired);
        assert!(receiver.try_recv().is_err());
        assert_eq!(relay.pending(), 0);
        assert_eq!(dropped.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_consumer_thread_receives_snapshots() {
        let (mut relay, receiver) = SnapshotRelay::channel(8);
        let consumer = std::thread::spawn(move || receiver.iter().map(|s| s.timestamp).collect::<Vec<_>>());

        let neuron = parrot();
        relay.incoming_spike(1.0, None, &neuron);
        relay.neuron_fired(1.0, None, &neuron);
        drop(relay);

        assert_eq!(consumer.join().unwrap(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_disconnected_consumer_is_ignored() {
        let (mut relay, receiver) = SnapshotRelay::channel(4);
        drop(receiver);
        relay.timestep(0.0, &parrot());
        assert_eq!(relay.dropped_counter().load(Ordering::Relaxed), 0);
    }
}
