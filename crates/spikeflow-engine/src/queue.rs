// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Event Queues
//!
//! Two queues feed the scheduler:
//! - **normal**: injected and generated spikes, a min-heap on `(timestamp, arrival)`
//! - **predicted**: model forecasts, ordered the same way and indexed by target synapse
//!   so a new forecast replaces the stale one in O(log n)
//!
//! Equal timestamps are served in arrival order within a queue. Across queues a
//! normal spike wins an exact tie.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use ahash::AHashMap;
use spikeflow_neural::{Spike, SpikeKind, SynapseId};

use crate::error::{EngineError, EngineResult};

/// Total order on `(timestamp, arrival sequence)`
#[derive(Debug, Clone, Copy)]
struct OrderKey {
    timestamp: f64,
    seq: u64,
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .total_cmp(&other.timestamp)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OrderKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderKey {}

/// Heap entry; ordering is reversed so `BinaryHeap` pops the earliest spike
#[derive(Debug, Clone, Copy)]
struct Scheduled {
    key: OrderKey,
    spike: Spike,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key.cmp(&self.key)
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Scheduled {}

/// The normal/predicted queue pair
#[derive(Debug, Default)]
pub struct EventQueues {
    normal: BinaryHeap<Scheduled>,
    predicted: BTreeMap<OrderKey, Spike>,
    predicted_by_target: AHashMap<SynapseId, OrderKey>,
    next_seq: u64,
}

impl EventQueues {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_key(&mut self, timestamp: f64) -> OrderKey {
        let key = OrderKey {
            timestamp,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        key
    }

    /// O(log n) insert into the normal queue
    pub fn push_normal(&mut self, spike: Spike) {
        let key = self.next_key(spike.timestamp);
        self.normal.push(Scheduled { key, spike });
    }

    /// Remove and return the earliest normal spike
    pub fn pop_normal(&mut self) -> EngineResult<Spike> {
        self.normal
            .pop()
            .map(|entry| entry.spike)
            .ok_or(EngineError::EmptyQueue)
    }

    /// Pop the earliest normal spike if it is due at or before `now`
    pub fn pop_normal_due(&mut self, now: f64) -> Option<Spike> {
        match self.peek_next_normal_timestamp() {
            Some(timestamp) if timestamp <= now => self.normal.pop().map(|entry| entry.spike),
            _ => None,
        }
    }

    /// Insert a forecast tagged with `kind`, replacing any pending forecast for the same synapse
    ///
    /// Returns `true` when a stale forecast was removed.
    pub fn push_predicted(&mut self, spike: Spike, kind: SpikeKind) -> bool {
        let superseded = match self.predicted_by_target.remove(&spike.target) {
            Some(stale) => self.predicted.remove(&stale).is_some(),
            None => false,
        };

        let key = self.next_key(spike.timestamp);
        self.predicted.insert(key, Spike { kind, ..spike });
        self.predicted_by_target.insert(spike.target, key);
        superseded
    }

    /// Withdraw the pending forecast addressed to `target`, if any
    pub fn remove_predicted(&mut self, target: SynapseId) -> Option<Spike> {
        let key = self.predicted_by_target.remove(&target)?;
        self.predicted.remove(&key)
    }

    /// Remove and return the earliest forecast
    pub fn pop_predicted(&mut self) -> EngineResult<Spike> {
        let (_, spike) = self.predicted.pop_first().ok_or(EngineError::EmptyQueue)?;
        self.predicted_by_target.remove(&spike.target);
        Ok(spike)
    }

    pub fn peek_next_normal_timestamp(&self) -> Option<f64> {
        self.normal.peek().map(|entry| entry.spike.timestamp)
    }

    pub fn peek_next_predicted_timestamp(&self) -> Option<f64> {
        self.predicted
            .first_key_value()
            .map(|(_, spike)| spike.timestamp)
    }

    /// Merge step of the event-driven loop; a normal spike wins an exact tie
    pub fn pop_next(&mut self) -> Option<Spike> {
        let take_predicted = match (
            self.peek_next_normal_timestamp(),
            self.peek_next_predicted_timestamp(),
        ) {
            (None, None) => return None,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (Some(normal), Some(predicted)) => predicted < normal,
        };

        if take_predicted {
            self.pop_predicted().ok()
        } else {
            self.pop_normal().ok()
        }
    }

    /// True only if both queues are empty
    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.predicted.is_empty()
    }

    pub fn normal_len(&self) -> usize {
        self.normal.len()
    }

    pub fn predicted_len(&self) -> usize {
        self.predicted.len()
    }

    pub fn clear_predicted(&mut self) {
        self.predicted.clear();
        self.predicted_by_target.clear();
    }

    pub fn clear(&mut self) {
        self.normal.clear();
        self.clear_predicted();
        self.next_seq = 0;
    }
}
