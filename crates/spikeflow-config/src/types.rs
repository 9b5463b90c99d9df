// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `spikeflow.toml`.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub scheduler: SchedulerConfig,
    pub decision: DecisionConfig,
    pub learning: LearningConfig,
    pub logging: LoggingConfig,
}

/// Scheduler selection and run horizon
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// `0` = event-driven, `> 0` = fixed-timestep
    pub timestep: f64,
    /// Simulated time horizon for fixed-timestep runs
    pub runtime: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timestep: 0.0,
            runtime: 0.0,
        }
    }
}

impl SchedulerConfig {
    pub fn is_event_driven(&self) -> bool {
        self.timestep == 0.0
    }
}

/// Decision (classification readout) layer settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Interval between forced decision-layer evaluations
    pub timer_interval: f64,
    /// Minimum majority fraction for a neuron to receive a label
    pub rejection_threshold: f64,
    /// Number of recent spikes a decision neuron keeps as evidence
    pub spike_history_size: usize,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            timer_interval: 1000.0,
            rejection_threshold: 0.6,
            spike_history_size: 10,
        }
    }
}

/// Learning cutoff settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Absolute timestamp at which learning switches off (None = derived from data)
    pub off_signal: Option<f64>,
    /// Extra simulated time appended after the last input spike of a data run
    pub visualization_margin: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            off_signal: None,
            visualization_margin: 1000.0,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Base directory for rotated log files (file-logging builds only)
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}
