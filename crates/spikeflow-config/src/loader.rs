// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, SimulationConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "spikeflow.toml";

/// Find the spikeflow configuration file
///
/// Search order:
/// 1. `SPIKEFLOW_CONFIG_PATH` environment variable
/// 2. Current working directory: `./spikeflow.toml`
/// 3. Parent directory: `../spikeflow.toml`
/// 4. Workspace root (searches up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("SPIKEFLOW_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by SPIKEFLOW_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "spikeflow configuration file '{}' not found in any of these locations:\n{}\n\nSet SPIKEFLOW_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SimulationConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: SimulationConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SPIKEFLOW_TIMESTEP` -> `scheduler.timestep`
/// - `SPIKEFLOW_RUNTIME` -> `scheduler.runtime`
/// - `SPIKEFLOW_DECISION_TIMER` -> `decision.timer_interval`
/// - `SPIKEFLOW_REJECTION_THRESHOLD` -> `decision.rejection_threshold`
/// - `SPIKEFLOW_SPIKE_HISTORY` -> `decision.spike_history_size`
/// - `SPIKEFLOW_LEARNING_OFF_SIGNAL` -> `learning.off_signal`
/// - `SPIKEFLOW_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut SimulationConfig) {
    let vars: HashMap<String, String> = [
        ("timestep", "SPIKEFLOW_TIMESTEP"),
        ("runtime", "SPIKEFLOW_RUNTIME"),
        ("decision_timer", "SPIKEFLOW_DECISION_TIMER"),
        ("rejection_threshold", "SPIKEFLOW_REJECTION_THRESHOLD"),
        ("spike_history", "SPIKEFLOW_SPIKE_HISTORY"),
        ("learning_off_signal", "SPIKEFLOW_LEARNING_OFF_SIGNAL"),
        ("log_level", "SPIKEFLOW_LOG_LEVEL"),
    ]
    .into_iter()
    .filter_map(|(key, var)| env::var(var).ok().map(|value| (key.to_string(), value)))
    .collect();

    apply_overrides(config, &vars);
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"timestep": "0.5", "log_level": "debug"}`)
pub fn apply_cli_overrides(config: &mut SimulationConfig, cli_args: &HashMap<String, String>) {
    apply_overrides(config, cli_args);
}

// Values that fail to parse leave the existing setting in place.
fn apply_overrides(config: &mut SimulationConfig, values: &HashMap<String, String>) {
    if let Some(timestep) = parse_value::<f64>(values, "timestep") {
        config.scheduler.timestep = timestep;
    }
    if let Some(runtime) = parse_value::<f64>(values, "runtime") {
        config.scheduler.runtime = runtime;
    }
    if let Some(interval) = parse_value::<f64>(values, "decision_timer") {
        config.decision.timer_interval = interval;
    }
    if let Some(threshold) = parse_value::<f64>(values, "rejection_threshold") {
        config.decision.rejection_threshold = threshold;
    }
    if let Some(size) = parse_value::<usize>(values, "spike_history") {
        config.decision.spike_history_size = size;
    }
    if let Some(value) = values.get("learning_off_signal") {
        if value.eq_ignore_ascii_case("none") {
            config.learning.off_signal = None;
        } else if let Ok(signal) = value.parse::<f64>() {
            config.learning.off_signal = Some(signal);
        }
    }
    if let Some(level) = values.get("log_level") {
        config.logging.level = level.to_lowercase();
    }
}

fn parse_value<T: std::str::FromStr>(values: &HashMap<String, String>, key: &str) -> Option<T> {
    values.get(key).and_then(|value| value.trim().parse::<T>().ok())
}
