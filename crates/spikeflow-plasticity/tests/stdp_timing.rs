// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! STDP timing behaviour against a neuron with a known firing history

use spikeflow_neural::{
    DiracSynapse, LayerId, LearningRule, NetworkContext, Neuron, NeuronCore, NeuronId, Result,
    SpikeKind, Synapse, SynapseArena, SynapseCore, SynapseId,
};
use spikeflow_plasticity::{Stdp, StdpConfig};

// ═══════════════════════════════════════════════════════════
// Helper Functions
// ═══════════════════════════════════════════════════════════

/// Neuron whose previous firing is set directly
struct Fixture {
    core: NeuronCore,
    previous_spike_time: Option<f64>,
}

impl Neuron for Fixture {
    fn core(&self) -> &NeuronCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NeuronCore {
        &mut self.core
    }

    fn model_name(&self) -> &'static str {
        "fixture"
    }

    fn potential(&self) -> f64 {
        0.0
    }

    fn previous_spike_time(&self) -> Option<f64> {
        self.previous_spike_time
    }

    fn update(
        &mut self,
        _timestamp: f64,
        _synapse: Option<SynapseId>,
        _ctx: &mut dyn NetworkContext,
        _kind: SpikeKind,
    ) -> Result<()> {
        Ok(())
    }

    fn update_sync(
        &mut self,
        _timestamp: f64,
        _synapse: Option<SynapseId>,
        _ctx: &mut dyn NetworkContext,
        _timestep: f64,
        _kind: SpikeKind,
    ) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self, _ctx: &mut dyn NetworkContext, _clear_addons: bool) {}
}

fn build(previous_spike_time: Option<f64>, dendrites: usize) -> (SynapseArena, Fixture) {
    let mut arena = SynapseArena::new();
    let initial = arena
        .push(Box::new(DiracSynapse::new(SynapseCore::new(
            SynapseId(0),
            None,
            NeuronId(0),
            1.0,
            0.0,
        ))))
        .unwrap();

    let mut core = NeuronCore::new(NeuronId(0), LayerId(1), initial);
    for _ in 0..dendrites {
        let id = arena.next_id();
        arena
            .push(Box::new(DiracSynapse::new(SynapseCore::new(
                id,
                Some(NeuronId(9)),
                NeuronId(0),
                0.5,
                0.0,
            ))))
            .unwrap();
        core.dendrites.push(id);
    }

    (
        arena,
        Fixture {
            core,
            previous_spike_time,
        },
    )
}

fn weight(arena: &SynapseArena, id: u32) -> f64 {
    arena.get(SynapseId(id)).unwrap().weight()
}

// ═══════════════════════════════════════════════════════════
// Timing Rules
// ═══════════════════════════════════════════════════════════

#[test]
fn test_input_after_previous_firing_is_potentiated() {
    let (mut arena, neuron) = build(Some(5.0), 1);
    arena.get_mut(SynapseId(1)).unwrap().receive_spike(7.0);

    let mut stdp = Stdp::new(StdpConfig::default()).unwrap();
    stdp.learn(10.0, None, &neuron, &mut arena).unwrap();

    let expected = 0.5 + 0.01 * (-3.0f64 / 20.0).exp();
    assert!((weight(&arena, 1) - expected).abs() < 1e-12);
}

#[test]
fn test_stale_and_silent_inputs_are_depressed() {
    let (mut arena, neuron) = build(Some(5.0), 2);
    arena.get_mut(SynapseId(1)).unwrap().receive_spike(2.0);

    let mut stdp = Stdp::new(StdpConfig::default()).unwrap();
    stdp.learn(10.0, None, &neuron, &mut arena).unwrap();

    let expected = 0.5 - 0.012 * (-5.0f64 / 20.0).exp();
    assert!((weight(&arena, 1) - expected).abs() < 1e-12);
    assert!((weight(&arena, 2) - expected).abs() < 1e-12);
    assert_eq!(stdp.updates(), 2);
}

#[test]
fn test_depression_floors_at_zero() {
    let (mut arena, neuron) = build(Some(9.9), 1);
    let config = StdpConfig {
        a_minus: 5.0,
        ..StdpConfig::default()
    };

    let mut stdp = Stdp::new(config).unwrap();
    stdp.learn(10.0, None, &neuron, &mut arena).unwrap();

    assert_eq!(weight(&arena, 1), 0.0);
}

#[test]
fn test_completed_run_resets_counter() {
    let (mut arena, neuron) = build(Some(1.0), 1);
    let mut stdp = Stdp::new(StdpConfig::default()).unwrap();
    stdp.learn(2.0, None, &neuron, &mut arena).unwrap();
    assert_eq!(stdp.updates(), 1);

    stdp.on_completed();
    assert_eq!(stdp.updates(), 0);
}
