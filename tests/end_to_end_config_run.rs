// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file -> network settings -> data run

use std::fs::File;
use std::io::Write;

use spikeflow::observability::{init_console_logging, CrateDebugFlags};
use spikeflow::prelude::*;
use tempfile::tempdir;

// ═══════════════════════════════════════════════════════════
// Helper Functions
// ═══════════════════════════════════════════════════════════

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spikeflow.toml");
    let mut file = File::create(&path).unwrap();
    write!(file, "{}", contents).unwrap();
    (dir, path)
}

// ═══════════════════════════════════════════════════════════
// End-to-end
// ═══════════════════════════════════════════════════════════

#[test]
fn test_configured_clock_run_with_stdp() {
    let (_dir, path) = write_config(
        r#"
        [scheduler]
        timestep = 1.0
        runtime = 30.0

        [learning]
        off_signal = 10.0
        visualization_margin = 5.0

        [decision]
        timer_interval = 20.0
        "#,
    );
    let config = load_config(Some(&path), None).unwrap();
    validate_config(&config).unwrap();
    init_console_logging(&CrateDebugFlags::default(), &config.logging.level).unwrap();

    let mut network = Network::with_settings(NetworkSettings::from(&config));
    let inputs = network.add_layer(1, ParrotNeuron::new).unwrap();
    let outputs = network.add_layer(1, ParrotNeuron::new).unwrap();
    let synapses = network.connect_layers(inputs, outputs, 0.5, 0.0).unwrap();
    let rule = network.add_learning_rule(Stdp::new(StdpConfig::default()).unwrap());
    network.attach_learning_rule(outputs, rule).unwrap();

    let recorder = SpikeRecorder::new();
    network.add_addon(recorder.clone());

    let mut training = SpikeTrain::new();
    for t in [2.0, 4.0, 12.0] {
        training.push(t, NeuronId(0));
    }

    let stats = network
        .run_with_data(&training, config.scheduler.timestep, None)
        .unwrap();

    // Horizon: last spike 12 + no delay + margin 5
    assert_eq!(stats.ticks, 18);
    assert_eq!(recorder.firings().len(), 6);

    // Learning at t=2 and t=4 only
    let weight = network.synapse(synapses[0]).unwrap().weight();
    assert!((weight - 0.52).abs() < 1e-12, "weight = {}", weight);
    assert_eq!(network.learning_off_signal(), Some(10.0));
}

#[test]
fn test_invalid_config_rejected() {
    let (_dir, path) = write_config(
        r#"
        [decision]
        rejection_threshold = 2.0
        "#,
    );
    let config = load_config(Some(&path), None).unwrap();
    assert!(validate_config(&config).is_err());
}
