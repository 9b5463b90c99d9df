// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Run Orchestration
//!
//! A run validates its arguments, initialises neurons and add-ons, then executes
//! the scheduler on a dedicated worker thread. The calling thread is lent to the
//! main-thread add-on, if any, which releases the worker through a start gate.
//! After the worker joins, add-ons and learning rules are told the run
//! completed and the network is reset for the next run.

use std::thread;

use tracing::{error, info};

use crate::addon::StartGate;
use crate::data::{InputSpike, SpikeTrain};
use crate::error::{EngineError, EngineResult};
use crate::network::Network;
use crate::RunStats;

const WORKER_THREAD_NAME: &str = "spikeflow-scheduler";

/// One scheduler pass: inputs, horizon and phase
struct Phase<'a> {
    runtime: f64,
    spikes: &'a [InputSpike],
    classification: bool,
}

struct RunPlan<'a> {
    timestep: f64,
    training: Phase<'a>,
    test: Option<Phase<'a>>,
}

fn validate_timestep(timestep: f64) -> EngineResult<()> {
    if !timestep.is_finite() || timestep < 0.0 {
        return Err(EngineError::InvalidArgument(format!(
            "timestep {} must be finite and non-negative",
            timestep
        )));
    }
    Ok(())
}

impl Network {
    /// Run the scheduler over the spikes already injected
    ///
    /// `timestep == 0` selects the event-driven loop and ignores `runtime`.
    /// With `classification` set, learning is off and the decision timer runs.
    pub fn run(&mut self, runtime: f64, timestep: f64, classification: bool) -> EngineResult<RunStats> {
        validate_timestep(timestep)?;
        if timestep > 0.0 && (!runtime.is_finite() || runtime < 0.0) {
            return Err(EngineError::InvalidArgument(format!(
                "runtime {} must be finite and non-negative",
                runtime
            )));
        }
        self.ensure_runnable()?;

        self.execute(RunPlan {
            timestep,
            training: Phase {
                runtime,
                spikes: &[],
                classification,
            },
            test: None,
        })
    }

    /// Train on `training`, then optionally label and classify `test`
    ///
    /// The clock horizon of each phase is its last input spike plus the longest
    /// synaptic delay plus the visualization margin. Unless an explicit off
    /// signal is set, learning switches off at the end of the training horizon.
    pub fn run_with_data(
        &mut self,
        training: &SpikeTrain,
        timestep: f64,
        test: Option<&SpikeTrain>,
    ) -> EngineResult<RunStats> {
        validate_timestep(timestep)?;
        self.ensure_runnable()?;
        training.validate(self.neuron_count())?;
        if let Some(test) = test {
            test.validate(self.neuron_count())?;
        }

        let tail = self.ctx.synapses.max_delay() + self.settings.visualization_margin;
        let training_horizon = training.last_timestamp().unwrap_or(0.0) + tail;
        if self.ctx.state.learning_off_signal().is_none() {
            self.ctx.state.set_learning_off_signal(Some(training_horizon));
        }
        self.ctx.state.add_labels(training.labels.iter().cloned());

        info!(
            target: "spikeflow-engine",
            "[RUNNER] data run: {} training spikes, {} test spikes, learning off at t={:?}",
            training.len(),
            test.map_or(0, SpikeTrain::len),
            self.ctx.state.learning_off_signal()
        );

        self.execute(RunPlan {
            timestep,
            training: Phase {
                runtime: training_horizon,
                spikes: &training.spikes,
                classification: false,
            },
            test: test.map(|data| Phase {
                runtime: data.last_timestamp().unwrap_or(0.0) + tail,
                spikes: &data.spikes,
                classification: true,
            }),
        })
    }

    fn ensure_runnable(&self) -> EngineResult<()> {
        if self.neurons.is_empty() {
            return Err(EngineError::EmptyNetwork);
        }
        if let Some(decision) = self.ctx.decision.as_ref() {
            if decision.layer().index() + 1 != self.ctx.layers.len() {
                return Err(EngineError::InvalidConfiguration(format!(
                    "decision layer {} is no longer the last layer",
                    decision.layer()
                )));
            }
        }
        Ok(())
    }

    fn execute(&mut self, plan: RunPlan<'_>) -> EngineResult<RunStats> {
        self.ctx.stats = RunStats::default();
        if let Err(e) = self.initialise() {
            self.reset(false);
            return Err(e);
        }

        let (gate, waiter) = StartGate::closed();
        let mut main_addon = self.main_thread_addon.take();

        let network = &mut *self;
        let outcome = thread::scope(|scope| -> EngineResult<()> {
            let worker = thread::Builder::new()
                .name(WORKER_THREAD_NAME.to_string())
                .spawn_scoped(scope, || {
                    waiter.wait();
                    network.execute_phases(&plan)
                })
                .map_err(|e| EngineError::WorkerSpawn(e.to_string()))?;

            match main_addon.as_mut() {
                Some(addon) => addon.begin(gate),
                None => gate.open(),
            }

            match worker.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        });
        self.main_thread_addon = main_addon;

        if let Err(e) = outcome {
            error!(target: "spikeflow-engine", "[RUNNER] run aborted: {}", e);
            self.reset(false);
            return Err(e);
        }

        self.notify_addons(|addon, view| addon.on_completed(view));
        for rule in self.ctx.learning_rules.iter_mut() {
            rule.on_completed();
        }

        let stats = self.ctx.stats.clone();
        info!(
            target: "spikeflow-engine",
            "[RUNNER] run complete: {} dispatches, {} firings, {} decisions",
            stats.dispatched_spikes, stats.neurons_fired, stats.decisions
        );
        self.last_run_stats = Some(stats.clone());
        self.reset(false);
        Ok(stats)
    }

    fn initialise(&mut self) -> EngineResult<()> {
        for neuron in self.neurons.iter_mut() {
            neuron.initialise(&mut self.ctx)?;
        }
        self.notify_addons(|addon, view| addon.on_start(view));
        Ok(())
    }

    /// Worker body
    fn execute_phases(&mut self, plan: &RunPlan<'_>) -> EngineResult<()> {
        info!(target: "spikeflow-engine", "[RUNNER] scheduler started on {}", WORKER_THREAD_NAME);
        self.run_phase(&plan.training, plan.timestep)?;

        if let Some(test) = plan.test.as_ref() {
            self.enter_classification()?;
            self.run_phase(test, plan.timestep)?;
        }
        Ok(())
    }

    fn run_phase(&mut self, phase: &Phase<'_>, timestep: f64) -> EngineResult<()> {
        self.ctx.now = 0.0;
        self.decision_warned.clear();
        self.ctx.state.set_classifying(phase.classification);
        if phase.classification {
            self.ctx.state.disable_learning();
            if let Some(decision) = self.ctx.decision.as_mut() {
                decision.restart(0.0);
            }
        }

        for input in phase.spikes {
            self.inject_spike(input.neuron, input.timestamp)?;
        }

        if timestep == 0.0 {
            self.run_event_driven()
        } else {
            self.run_clock(phase.runtime, timestep)
        }
    }

    /// Transition from training to classification within a data run
    fn enter_classification(&mut self) -> EngineResult<()> {
        self.ctx.state.disable_learning();
        self.ctx.queues.clear();
        self.reset_dynamics(false);
        for layer in self.ctx.layers.iter_mut() {
            layer.propagates = true;
        }

        self.prepare_labeling()?;
        self.notify_addons(|addon, view| addon.on_predict(view));
        info!(target: "spikeflow-engine", "[RUNNER] classification phase started");
        Ok(())
    }
}

