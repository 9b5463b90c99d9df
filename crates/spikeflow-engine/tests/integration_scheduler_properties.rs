// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Ordering, gating, learning-cutoff and failure properties of the scheduler

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use spikeflow_engine::{EngineError, MainThreadAddon, Network, SpikeRecorder, SpikeTrain, StartGate};
use spikeflow_neural::{
    ExponentialSynapse, LayerId, LifNeuron, LifParameters, NetworkContext, NeuralError, Neuron, NeuronCore, NeuronId,
    ParrotNeuron, Result, Spike, SpikeKind, SynapseId,
};

// ═══════════════════════════════════════════════════════════
// Helper Functions
// ═══════════════════════════════════════════════════════════

/// Forecasts a spike on itself `lead` after every real input
struct Forecaster {
    core: NeuronCore,
    lead: f64,
}

impl Neuron for Forecaster {
    fn core(&self) -> &NeuronCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NeuronCore {
        &mut self.core
    }

    fn model_name(&self) -> &'static str {
        "forecaster"
    }

    fn potential(&self) -> f64 {
        0.0
    }

    fn previous_spike_time(&self) -> Option<f64> {
        None
    }

    fn update(
        &mut self,
        timestamp: f64,
        _synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
        kind: SpikeKind,
    ) -> Result<()> {
        if kind.is_normal() && ctx.predictions_enabled() {
            ctx.predict_spike(Spike::new(
                timestamp + self.lead,
                self.core.initial_synapse,
                SpikeKind::Prediction,
            ));
        }
        Ok(())
    }

    fn update_sync(
        &mut self,
        timestamp: f64,
        synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
        _timestep: f64,
        kind: SpikeKind,
    ) -> Result<()> {
        self.update(timestamp, synapse, ctx, kind)
    }

    fn reset(&mut self, _ctx: &mut dyn NetworkContext, _clear_addons: bool) {}
}

/// Records what the context reported at each update
#[derive(Clone, Default)]
struct ProbeLog {
    learning: Arc<Mutex<Vec<(f64, bool)>>>,
    threads: Arc<Mutex<Vec<Option<String>>>>,
}

struct Probe {
    core: NeuronCore,
    log: ProbeLog,
}

impl Probe {
    fn observe(&self, timestamp: f64, ctx: &dyn NetworkContext) {
        self.log.learning.lock().push((timestamp, ctx.learning_enabled()));
        self.log
            .threads
            .lock()
            .push(thread::current().name().map(str::to_string));
    }
}

impl Neuron for Probe {
    fn core(&self) -> &NeuronCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NeuronCore {
        &mut self.core
    }

    fn model_name(&self) -> &'static str {
        "probe"
    }

    fn potential(&self) -> f64 {
        0.0
    }

    fn previous_spike_time(&self) -> Option<f64> {
        None
    }

    fn update(
        &mut self,
        timestamp: f64,
        _synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
        _kind: SpikeKind,
    ) -> Result<()> {
        self.observe(timestamp, ctx);
        Ok(())
    }

    fn update_sync(
        &mut self,
        timestamp: f64,
        _synapse: Option<SynapseId>,
        ctx: &mut dyn NetworkContext,
        _timestep: f64,
        _kind: SpikeKind,
    ) -> Result<()> {
        self.observe(timestamp, ctx);
        Ok(())
    }

    fn reset(&mut self, _ctx: &mut dyn NetworkContext, _clear_addons: bool) {}
}

fn probe_network() -> (Network, ProbeLog) {
    let log = ProbeLog::default();
    let mut network = Network::new();
    let shared = log.clone();
    network
        .add_layer(1, move |core| Probe {
            core,
            log: shared.clone(),
        })
        .unwrap();
    (network, log)
}

// ═══════════════════════════════════════════════════════════
// Ordering
// ═══════════════════════════════════════════════════════════

#[test]
fn test_normal_spike_wins_tie_with_prediction() {
    let mut network = Network::new();
    network
        .add_layer(1, |core| Forecaster { core, lead: 5.0 })
        .unwrap();
    network.add_layer(1, ParrotNeuron::new).unwrap();
    let recorder = SpikeRecorder::new();
    network.add_addon(recorder.clone());

    network.inject_spike(NeuronId(0), 0.0).unwrap();
    network.inject_spike(NeuronId(1), 5.0).unwrap();
    let stats = network.run(0.0, 0.0, false).unwrap();

    assert_eq!(
        recorder.dispatches(),
        vec![
            (0.0, NeuronId(0), SpikeKind::Initial),
            (5.0, NeuronId(1), SpikeKind::Initial),
            (5.0, NeuronId(0), SpikeKind::Prediction),
        ]
    );
    assert_eq!(stats.predicted_dispatches, 1);
}

#[test]
fn test_new_prediction_supersedes_stale_one() {
    let mut network = Network::new();
    network
        .add_layer(1, |core| Forecaster { core, lead: 10.0 })
        .unwrap();
    let recorder = SpikeRecorder::new();
    network.add_addon(recorder.clone());

    network.inject_spike(NeuronId(0), 0.0).unwrap();
    network.inject_spike(NeuronId(0), 2.0).unwrap();
    let stats = network.run(0.0, 0.0, false).unwrap();

    assert_eq!(
        recorder.dispatches(),
        vec![
            (0.0, NeuronId(0), SpikeKind::Initial),
            (2.0, NeuronId(0), SpikeKind::Initial),
            (12.0, NeuronId(0), SpikeKind::Prediction),
        ]
    );
    assert_eq!(stats.superseded_predictions, 1);
}

#[test]
fn test_inhibition_withdraws_pending_forecast() {
    let mut network = Network::new();
    network.add_layer(2, ParrotNeuron::new).unwrap();
    network
        .add_layer(1, |core| LifNeuron::new(core, LifParameters::default()))
        .unwrap();
    network
        .connect(NeuronId(0), NeuronId(2), 30.0, 0.0, |core| ExponentialSynapse::new(core, 1000.0))
        .unwrap();
    network
        .connect(NeuronId(1), NeuronId(2), -40.0, 0.0, |core| ExponentialSynapse::new(core, 1000.0))
        .unwrap();

    let recorder = SpikeRecorder::new();
    network.add_addon(recorder.clone());
    network.inject_spike(NeuronId(0), 0.0).unwrap();
    network.inject_spike(NeuronId(1), 1.0).unwrap();

    let stats = network.run(0.0, 0.0, false).unwrap();

    // Excitation alone forecasts a crossing near t=11; inhibition at t=1 cancels it
    assert_eq!(
        recorder.dispatches_for(NeuronId(2)),
        vec![(0.0, SpikeKind::Generated), (1.0, SpikeKind::Generated)]
    );
    assert_eq!(stats.predicted_dispatches, 0);
    assert_eq!(stats.superseded_predictions, 1);
}

#[test]
fn test_clock_mode_disables_predictions() {
    let mut network = Network::new();
    network
        .add_layer(1, |core| Forecaster { core, lead: 1.0 })
        .unwrap();
    let recorder = SpikeRecorder::new();
    network.add_addon(recorder.clone());
    network.inject_spike(NeuronId(0), 0.0).unwrap();

    let stats = network.run(5.0, 1.0, false).unwrap();

    assert_eq!(stats.predicted_dispatches, 0);
    assert!(recorder
        .dispatches()
        .iter()
        .all(|(_, _, kind)| *kind != SpikeKind::Prediction));
}

#[test]
fn test_dispatch_timestamps_never_decrease() {
    let mut network = Network::new();
    let inputs = network.add_layer(3, ParrotNeuron::new).unwrap();
    let hidden = network
        .add_layer(4, |core| LifNeuron::new(core, LifParameters::default()))
        .unwrap();
    let output = network
        .add_layer(2, |core| LifNeuron::new(core, LifParameters::default()))
        .unwrap();
    network.connect_layers(inputs, hidden, 12.0, 1.5).unwrap();
    network.connect_layers(hidden, output, 15.0, 0.7).unwrap();

    let recorder = SpikeRecorder::new();
    network.add_addon(recorder.clone());
    for (i, t) in [0.0, 0.3, 2.0, 2.0, 4.5, 7.25, 9.0, 9.1].into_iter().enumerate() {
        network.inject_spike(NeuronId::from_index(i % 3), t).unwrap();
    }

    network.run(0.0, 0.0, false).unwrap();

    let dispatches = recorder.dispatches();
    assert!(dispatches.len() >= 8);
    assert!(dispatches.windows(2).all(|pair| pair[0].0 <= pair[1].0));
}

// ═══════════════════════════════════════════════════════════
// Learning cutoff and gating
// ═══════════════════════════════════════════════════════════

#[test]
fn test_learning_switches_off_once_at_signal() {
    let (mut network, log) = probe_network();
    network.set_learning_off_signal(Some(5.0)).unwrap();
    for t in 1..=8 {
        network.inject_spike(NeuronId(0), t as f64).unwrap();
    }

    network.run(0.0, 0.0, false).unwrap();

    let observed = log.learning.lock().clone();
    assert_eq!(observed.len(), 8);
    for (t, enabled) in observed {
        assert_eq!(enabled, t < 5.0, "learning flag wrong at t={}", t);
    }
    assert!(network.is_learning_enabled());
}

#[test]
fn test_gated_layer_receives_only_idle_ticks() {
    let mut network = Network::new();
    let input = network.add_layer(1, ParrotNeuron::new).unwrap();
    let gated = network.add_layer(1, ParrotNeuron::new).unwrap();
    network.connect_layers(input, gated, 1.0, 0.0).unwrap();
    network.set_layer_propagation(gated, false).unwrap();

    let recorder = SpikeRecorder::new();
    network.add_addon(recorder.clone());
    network.inject_spike(NeuronId(0), 3.0).unwrap();

    let stats = network.run(10.0, 1.0, false).unwrap();

    let dispatches = recorder.dispatches_for(NeuronId(1));
    assert_eq!(dispatches.len(), 11);
    assert!(dispatches.iter().all(|(_, kind)| *kind == SpikeKind::None));
    assert_eq!(stats.dropped_spikes, 1);
}

#[test]
fn test_injected_spike_into_gated_layer_is_dropped() {
    let mut network = Network::new();
    network.add_layer(1, ParrotNeuron::new).unwrap();
    let gated = network.add_layer(1, ParrotNeuron::new).unwrap();
    network.set_layer_propagation(gated, false).unwrap();

    let recorder = SpikeRecorder::new();
    network.add_addon(recorder.clone());
    network.inject_spike(NeuronId(1), 3.0).unwrap();
    let stats = network.run(5.0, 1.0, false).unwrap();

    let dispatches = recorder.dispatches_for(NeuronId(1));
    assert_eq!(dispatches.len(), 6);
    assert!(dispatches.iter().all(|(_, kind)| *kind == SpikeKind::None));
    assert_eq!(stats.dropped_spikes, 1);
    assert_eq!(stats.dispatched_spikes, 0);

    // Same rule in event-driven mode
    recorder.clear();
    network.inject_spike(NeuronId(1), 3.0).unwrap();
    network.inject_spike(NeuronId(0), 4.0).unwrap();
    let stats = network.run(0.0, 0.0, false).unwrap();

    assert_eq!(recorder.dispatches(), vec![(4.0, NeuronId(0), SpikeKind::Initial)]);
    assert_eq!(stats.dropped_spikes, 1);
}

#[test]
fn test_layer_after_gated_layer_gets_no_idle_ticks() {
    let mut network = Network::new();
    network.add_layer(1, ParrotNeuron::new).unwrap();
    let gated = network.add_layer(1, ParrotNeuron::new).unwrap();
    network.add_layer(1, ParrotNeuron::new).unwrap();
    network.set_layer_propagation(gated, false).unwrap();

    let recorder = SpikeRecorder::new();
    network.add_addon(recorder.clone());
    network.run(3.0, 1.0, false).unwrap();

    assert!(recorder.dispatches_for(NeuronId(2)).is_empty());
    assert!(!network.layer_propagates(LayerId(1)).unwrap());
}

// ═══════════════════════════════════════════════════════════
// Failures
// ═══════════════════════════════════════════════════════════

struct FlagAddon(Arc<AtomicBool>);

impl MainThreadAddon for FlagAddon {
    fn begin(&mut self, gate: StartGate) {
        self.0.store(true, Ordering::SeqCst);
        gate.open();
    }
}

#[test]
fn test_empty_network_rejected_without_side_effects() {
    let mut network = Network::new();
    let recorder = SpikeRecorder::new();
    let begun = Arc::new(AtomicBool::new(false));
    network.add_addon(recorder.clone());
    network.set_main_thread_addon(FlagAddon(Arc::clone(&begun)));

    assert!(matches!(network.run(10.0, 1.0, false), Err(EngineError::EmptyNetwork)));
    assert!(matches!(
        network.run_with_data(&SpikeTrain::new(), 0.0, None),
        Err(EngineError::EmptyNetwork)
    ));
    assert!(recorder.is_empty());
    assert!(!begun.load(Ordering::SeqCst));
    assert!(network.last_run_stats().is_none());
}

#[test]
fn test_negative_timestep_rejected_before_run() {
    let (mut network, log) = probe_network();
    network.inject_spike(NeuronId(0), 1.0).unwrap();

    assert!(matches!(network.run(10.0, -1.0, false), Err(EngineError::InvalidArgument(_))));
    assert_eq!(network.pending_spikes(), (1, 0));
    assert!(log.learning.lock().is_empty());
}

#[test]
fn test_invalid_lif_parameters_abort_run() {
    let mut network = Network::new();
    let params = LifParameters {
        membrane_time_constant: 0.0,
        ..LifParameters::default()
    };
    network
        .add_layer(1, move |core| LifNeuron::new(core, params))
        .unwrap();
    network.inject_spike(NeuronId(0), 1.0).unwrap();

    let result = network.run(0.0, 0.0, false);

    assert!(matches!(
        result,
        Err(EngineError::Neural(NeuralError::InvalidParameter(_)))
    ));
    assert_eq!(network.pending_spikes(), (0, 0));
}

// ═══════════════════════════════════════════════════════════
// Worker thread
// ═══════════════════════════════════════════════════════════

struct DelayedStart {
    log: ProbeLog,
    saw_idle_worker: Arc<AtomicBool>,
    ran_on: Arc<Mutex<Option<String>>>,
}

impl MainThreadAddon for DelayedStart {
    fn begin(&mut self, gate: StartGate) {
        *self.ran_on.lock() = thread::current().name().map(str::to_string);
        thread::sleep(Duration::from_millis(20));
        self.saw_idle_worker
            .store(self.log.learning.lock().is_empty(), Ordering::SeqCst);
        gate.open();
    }
}

#[test]
fn test_scheduler_waits_for_main_thread_addon() {
    let (mut network, log) = probe_network();
    let saw_idle_worker = Arc::new(AtomicBool::new(false));
    let ran_on = Arc::new(Mutex::new(None));
    network.set_main_thread_addon(DelayedStart {
        log: log.clone(),
        saw_idle_worker: Arc::clone(&saw_idle_worker),
        ran_on: Arc::clone(&ran_on),
    });
    network.inject_spike(NeuronId(0), 1.0).unwrap();

    let caller = thread::current().name().map(str::to_string);
    network.run(0.0, 0.0, false).unwrap();

    assert!(saw_idle_worker.load(Ordering::SeqCst));
    assert_eq!(*ran_on.lock(), caller);
    assert_eq!(
        log.threads.lock().clone(),
        vec![Some("spikeflow-scheduler".to_string())]
    );
}

struct ForgetfulAddon;

impl MainThreadAddon for ForgetfulAddon {
    fn begin(&mut self, _gate: StartGate) {}
}

#[test]
fn test_dropped_gate_releases_scheduler() {
    let (mut network, log) = probe_network();
    network.set_main_thread_addon(ForgetfulAddon);
    network.inject_spike(NeuronId(0), 1.0).unwrap();

    network.run(0.0, 0.0, false).unwrap();

    assert_eq!(log.learning.lock().len(), 1);
}
