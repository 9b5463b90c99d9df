// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-run bookkeeping: learning switch, label timeline and phase

use std::collections::VecDeque;

use tracing::debug;

use crate::data::TrainingLabel;

/// Mutable state the scheduler consults before every dispatch
#[derive(Debug, Clone)]
pub struct RunState {
    learning_enabled: bool,
    learning_off_signal: Option<f64>,
    pending_labels: VecDeque<TrainingLabel>,
    current_label: Option<String>,
    classifying: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            learning_enabled: true,
            learning_off_signal: None,
            pending_labels: VecDeque::new(),
            current_label: None,
            classifying: false,
        }
    }
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn learning_enabled(&self) -> bool {
        self.learning_enabled
    }

    pub fn learning_off_signal(&self) -> Option<f64> {
        self.learning_off_signal
    }

    pub fn set_learning_off_signal(&mut self, signal: Option<f64>) {
        self.learning_off_signal = signal;
    }

    pub fn current_label(&self) -> Option<&str> {
        self.current_label.as_deref()
    }

    pub fn is_classifying(&self) -> bool {
        self.classifying
    }

    pub(crate) fn set_classifying(&mut self, classifying: bool) {
        self.classifying = classifying;
    }

    pub(crate) fn disable_learning(&mut self) {
        self.learning_enabled = false;
    }

    pub fn pending_labels(&self) -> usize {
        self.pending_labels.len()
    }

    /// Merge labels into the pending timeline, keeping it sorted by onset
    pub fn add_labels(&mut self, labels: impl IntoIterator<Item = TrainingLabel>) {
        let mut merged: Vec<TrainingLabel> = self.pending_labels.drain(..).collect();
        merged.extend(labels);
        merged.sort_by(|a, b| a.onset.total_cmp(&b.onset));
        self.pending_labels = merged.into();
    }

    /// Apply label onsets and the learning cutoff for a dispatch at `timestamp`
    ///
    /// Returns `true` on the dispatch that switches learning off. The switch is one-way.
    pub fn advance(&mut self, timestamp: f64) -> bool {
        while self
            .pending_labels
            .front()
            .is_some_and(|label| label.onset <= timestamp)
        {
            if let Some(label) = self.pending_labels.pop_front() {
                debug!(target: "spikeflow-engine", "[RUN-STATE] label '{}' active from t={}", label.name, label.onset);
                self.current_label = Some(label.name);
            }
        }

        match self.learning_off_signal {
            Some(signal) if self.learning_enabled && timestamp >= signal => {
                self.learning_enabled = false;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
