// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! This module provides validation logic to ensure configuration values are
//! consistent and within valid ranges before a simulation is built from them.

use crate::{ConfigError, ConfigResult, SimulationConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    Negative { field: String, value: f64 },
    NotFinite { field: String },
    OutOfRange { field: String, value: f64, min: f64, max: f64 },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Negative { field, value } => {
                write!(f, "{} = {} must not be negative", field, value)
            }
            Self::NotFinite { field } => write!(f, "{} must be a finite number", field),
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                write!(f, "{} = {} is outside valid range [{}, {}]", field, value, min, max)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// All violations are collected and reported together.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &SimulationConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_scheduler(config, &mut errors);
    validate_decision(config, &mut errors);
    validate_learning(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn check_non_negative(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !value.is_finite() {
        errors.push(ConfigValidationError::NotFinite {
            field: field.to_string(),
        });
    } else if value < 0.0 {
        errors.push(ConfigValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
}

fn validate_scheduler(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    check_non_negative("scheduler.timestep", config.scheduler.timestep, errors);
    check_non_negative("scheduler.runtime", config.scheduler.runtime, errors);
}

fn validate_decision(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    let decision = &config.decision;

    if !decision.timer_interval.is_finite() || decision.timer_interval <= 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "decision.timer_interval".to_string(),
            reason: "must be positive".to_string(),
        });
    }

    if !(0.0..=1.0).contains(&decision.rejection_threshold) {
        errors.push(ConfigValidationError::OutOfRange {
            field: "decision.rejection_threshold".to_string(),
            value: decision.rejection_threshold,
            min: 0.0,
            max: 1.0,
        });
    }

    if decision.spike_history_size == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "decision.spike_history_size".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_learning(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    if let Some(signal) = config.learning.off_signal {
        check_non_negative("learning.off_signal", signal, errors);
    }
    check_non_negative(
        "learning.visualization_margin",
        config.learning.visualization_margin,
        errors,
    );
}

fn validate_logging(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }
}
