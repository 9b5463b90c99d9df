// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Network Construction
//!
//! A [`Network`] owns neurons, synapses, layers, learning rules and add-ons.
//! Neurons and synapses live in arenas addressed by their ids; each neuron
//! lists its dendrite and axon-terminal synapse ids.
//!
//! Every neuron receives an unweighted "initial" synapse at creation time. It
//! is the injection point for external spikes and the target of forecasts.

use roaring::RoaringBitmap;
use spikeflow_neural::{
    AddonId, DiracSynapse, LayerId, LearningRule, LearningRuleId, NeuralError, Neuron,
    NeuronCore, NeuronId, Spike, SpikeKind, Synapse, SynapseCore, SynapseId,
};
use tracing::{info, warn};

use crate::addon::{Addon, MainThreadAddon, NetworkView};
use crate::context::{AddonSlot, Layer, SimulationContext};
use crate::data::TrainingLabel;
use crate::decision::DecisionController;
use crate::error::{EngineError, EngineResult};
use crate::settings::NetworkSettings;
use crate::RunStats;

/// A spiking network plus its scheduler state
pub struct Network {
    pub(crate) neurons: Vec<Box<dyn Neuron>>,
    pub(crate) ctx: SimulationContext,
    pub(crate) settings: NetworkSettings,
    pub(crate) main_thread_addon: Option<Box<dyn MainThreadAddon>>,
    /// Decision neurons already warned about this phase
    pub(crate) decision_warned: RoaringBitmap,
    pub(crate) last_run_stats: Option<RunStats>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Self::with_settings(NetworkSettings::default())
    }

    pub fn with_settings(settings: NetworkSettings) -> Self {
        let mut ctx = SimulationContext::new();
        ctx.state.set_learning_off_signal(settings.learning_off_signal);
        Self {
            neurons: Vec::new(),
            ctx,
            settings,
            main_thread_addon: None,
            decision_warned: RoaringBitmap::new(),
            last_run_stats: None,
        }
    }

    pub fn settings(&self) -> &NetworkSettings {
        &self.settings
    }

    // ═══════════════════════════════════════════════════════════
    // Structure
    // ═══════════════════════════════════════════════════════════

    /// Append a layer of `count` neurons built by `build`
    ///
    /// `build` receives a ready [`NeuronCore`] (id, layer and initial synapse
    /// assigned) and must keep it as the neuron's core.
    pub fn add_layer<N, F>(&mut self, count: usize, mut build: F) -> EngineResult<LayerId>
    where
        N: Neuron + 'static,
        F: FnMut(NeuronCore) -> N,
    {
        if count == 0 {
            return Err(EngineError::InvalidArgument(
                "a layer needs at least one neuron".to_string(),
            ));
        }

        let layer = LayerId::from_index(self.ctx.layers.len());
        let mut members = Vec::with_capacity(count);

        for _ in 0..count {
            let id = NeuronId::from_index(self.neurons.len());
            let initial = self.ctx.synapses.next_id();
            let core = SynapseCore::new(initial, None, id, 1.0, 0.0);
            self.ctx.synapses.push(Box::new(DiracSynapse::new(core)))?;

            let neuron = build(NeuronCore::new(id, layer, initial));
            if neuron.id() != id || neuron.layer() != layer {
                return Err(EngineError::InvalidArgument(format!(
                    "neuron built for {} reports {} in {}",
                    id,
                    neuron.id(),
                    neuron.layer()
                )));
            }

            self.neurons.push(Box::new(neuron));
            self.ctx.neuron_layers.push(layer);
            members.push(id);
        }

        self.ctx.layers.push(Layer {
            neurons: members,
            propagates: true,
        });

        info!(target: "spikeflow-engine", "[NETWORK] added {} with {} neurons", layer, count);
        Ok(layer)
    }

    /// Connect `pre` to `post` through a synapse built by `build`
    pub fn connect<S, F>(
        &mut self,
        pre: NeuronId,
        post: NeuronId,
        weight: f64,
        delay: f64,
        build: F,
    ) -> EngineResult<SynapseId>
    where
        S: Synapse + 'static,
        F: FnOnce(SynapseCore) -> Result<S, NeuralError>,
    {
        self.check_neuron(pre)?;
        self.check_neuron(post)?;
        if !weight.is_finite() {
            return Err(EngineError::InvalidArgument(format!(
                "synapse weight {} must be finite",
                weight
            )));
        }
        if !delay.is_finite() || delay < 0.0 {
            return Err(EngineError::InvalidArgument(format!(
                "synapse delay {} must be finite and non-negative",
                delay
            )));
        }

        let id = self.ctx.synapses.next_id();
        let synapse = build(SynapseCore::new(id, Some(pre), post, weight, delay))?;
        self.ctx.synapses.push(Box::new(synapse))?;

        self.neurons[pre.index()].core_mut().axon_terminals.push(id);
        self.neurons[post.index()].core_mut().dendrites.push(id);
        Ok(id)
    }

    pub fn connect_dirac(
        &mut self,
        pre: NeuronId,
        post: NeuronId,
        weight: f64,
        delay: f64,
    ) -> EngineResult<SynapseId> {
        self.connect(pre, post, weight, delay, |core| Ok(DiracSynapse::new(core)))
    }

    /// All-to-all Dirac connections from `from` to `to`
    pub fn connect_layers(
        &mut self,
        from: LayerId,
        to: LayerId,
        weight: f64,
        delay: f64,
    ) -> EngineResult<Vec<SynapseId>> {
        let pre = self.neurons_in_layer(from)?.to_vec();
        let post = self.neurons_in_layer(to)?.to_vec();

        let mut created = Vec::with_capacity(pre.len() * post.len());
        for &source in &pre {
            for &target in &post {
                created.push(self.connect_dirac(source, target, weight, delay)?);
            }
        }
        Ok(created)
    }

    pub fn set_layer_propagation(&mut self, layer: LayerId, propagates: bool) -> EngineResult<()> {
        let entry = self
            .ctx
            .layers
            .get_mut(layer.index())
            .ok_or(EngineError::LayerNotFound(layer))?;
        entry.propagates = propagates;
        Ok(())
    }

    pub fn layer_propagates(&self, layer: LayerId) -> EngineResult<bool> {
        self.ctx
            .layers
            .get(layer.index())
            .map(|l| l.propagates)
            .ok_or(EngineError::LayerNotFound(layer))
    }

    // ═══════════════════════════════════════════════════════════
    // Learning rules and add-ons
    // ═══════════════════════════════════════════════════════════

    pub fn add_learning_rule(&mut self, rule: impl LearningRule + 'static) -> LearningRuleId {
        let id = LearningRuleId::from_index(self.ctx.learning_rules.len());
        self.ctx.learning_rules.push(Box::new(rule));
        id
    }

    /// Apply `rule` to every neuron of `layer`
    pub fn attach_learning_rule(&mut self, layer: LayerId, rule: LearningRuleId) -> EngineResult<()> {
        if rule.index() >= self.ctx.learning_rules.len() {
            return Err(NeuralError::LearningRuleNotFound(rule).into());
        }
        let members = self.neurons_in_layer(layer)?.to_vec();
        for id in members {
            let rules = &mut self.neurons[id.index()].core_mut().learning_rules;
            if !rules.contains(&rule) {
                rules.push(rule);
            }
        }
        Ok(())
    }

    /// Register an add-on notified about every neuron
    pub fn add_addon(&mut self, addon: impl Addon + 'static) -> AddonId {
        let id = AddonId::from_index(self.ctx.addons.len());
        self.ctx.addons.push(AddonSlot {
            addon: Box::new(addon),
            global: true,
        });
        id
    }

    /// Register an add-on notified only about `neurons`
    pub fn add_addon_for(
        &mut self,
        addon: impl Addon + 'static,
        neurons: &[NeuronId],
    ) -> EngineResult<AddonId> {
        for &id in neurons {
            self.check_neuron(id)?;
        }
        let id = AddonId::from_index(self.ctx.addons.len());
        self.ctx.addons.push(AddonSlot {
            addon: Box::new(addon),
            global: false,
        });
        for &neuron in neurons {
            self.neurons[neuron.index()].core_mut().add_relevant_addon(id);
        }
        Ok(id)
    }

    pub fn set_main_thread_addon(&mut self, addon: impl MainThreadAddon + 'static) {
        self.main_thread_addon = Some(Box::new(addon));
    }

    // ═══════════════════════════════════════════════════════════
    // Inputs and run configuration
    // ═══════════════════════════════════════════════════════════

    /// Queue an external spike on `neuron`'s initial synapse
    pub fn inject_spike(&mut self, neuron: NeuronId, timestamp: f64) -> EngineResult<()> {
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(EngineError::InvalidArgument(format!(
                "injected spike timestamp {} must be finite and non-negative",
                timestamp
            )));
        }
        let initial = self.neuron_ref(neuron)?.core().initial_synapse;
        self.ctx
            .queues
            .push_normal(Spike::new(timestamp, initial, SpikeKind::Initial));
        Ok(())
    }

    pub fn set_learning_off_signal(&mut self, signal: Option<f64>) -> EngineResult<()> {
        if let Some(value) = signal {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidArgument(format!(
                    "learning off signal {} must be finite and non-negative",
                    value
                )));
            }
        }
        self.ctx.state.set_learning_off_signal(signal);
        Ok(())
    }

    pub fn add_training_labels(&mut self, labels: impl IntoIterator<Item = TrainingLabel>) {
        self.ctx.state.add_labels(labels);
    }

    pub fn configure_decision(
        &mut self,
        layer: LayerId,
        spike_history_size: usize,
        rejection_threshold: f64,
        timer_interval: f64,
    ) -> EngineResult<()> {
        let controller = DecisionController::configure(
            layer,
            self.ctx.layers.len(),
            spike_history_size,
            rejection_threshold,
            timer_interval,
        )?;
        info!(
            target: "spikeflow-engine",
            "[NETWORK] decision layer {} (interval={}, threshold={})",
            layer, timer_interval, rejection_threshold
        );
        self.ctx.decision = Some(controller);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════

    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    pub fn synapse_count(&self) -> usize {
        self.ctx.synapses.len()
    }

    pub fn layer_count(&self) -> usize {
        self.ctx.layers.len()
    }

    pub fn neuron(&self, id: NeuronId) -> Option<&dyn Neuron> {
        self.neurons.get(id.index()).map(|n| n.as_ref())
    }

    pub fn synapse(&self, id: SynapseId) -> Option<&dyn Synapse> {
        self.ctx.synapses.get(id).ok()
    }

    pub fn neurons_in_layer(&self, layer: LayerId) -> EngineResult<&[NeuronId]> {
        self.ctx
            .layers
            .get(layer.index())
            .map(|l| l.neurons.as_slice())
            .ok_or(EngineError::LayerNotFound(layer))
    }

    pub fn is_learning_enabled(&self) -> bool {
        self.ctx.state.learning_enabled()
    }

    pub fn learning_off_signal(&self) -> Option<f64> {
        self.ctx.state.learning_off_signal()
    }

    pub fn decision(&self) -> Option<&DecisionController> {
        self.ctx.decision.as_ref()
    }

    /// Spikes waiting in the normal and predicted queues
    pub fn pending_spikes(&self) -> (usize, usize) {
        (self.ctx.queues.normal_len(), self.ctx.queues.predicted_len())
    }

    /// Statistics of the most recent completed run
    pub fn last_run_stats(&self) -> Option<&RunStats> {
        self.last_run_stats.as_ref()
    }

    pub fn view(&self) -> NetworkView<'_> {
        NetworkView {
            neurons: &self.neurons,
            synapses: &self.ctx.synapses,
            layers: &self.ctx.layers,
            decision_layer: self.ctx.decision.as_ref().map(|d| d.layer()),
            learning_enabled: self.ctx.state.learning_enabled(),
        }
    }

    pub(crate) fn check_neuron(&self, id: NeuronId) -> EngineResult<()> {
        self.neuron_ref(id).map(|_| ())
    }

    fn neuron_ref(&self, id: NeuronId) -> EngineResult<&dyn Neuron> {
        self.neuron(id).ok_or(EngineError::NeuronNotFound(id))
    }

    /// Call `notify` on every add-on with a read-only view of the network
    pub(crate) fn notify_addons(&mut self, mut notify: impl FnMut(&mut dyn Addon, &NetworkView<'_>)) {
        let view = NetworkView {
            neurons: &self.neurons,
            synapses: &self.ctx.synapses,
            layers: &self.ctx.layers,
            decision_layer: self.ctx.decision.as_ref().map(|d| d.layer()),
            learning_enabled: self.ctx.state.learning_enabled(),
        };
        for slot in self.ctx.addons.iter_mut() {
            notify(slot.addon.as_mut(), &view);
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Labeling and reset
    // ═══════════════════════════════════════════════════════════

    /// Label the layer before the decision layer by majority vote and wire it up
    ///
    /// Each labeled neuron gets a unit-weight, zero-delay Dirac connection to
    /// every decision neuron with the same label, unless one already exists from an
    /// earlier data run. Returns the number of neurons labeled.
    pub fn prepare_labeling(&mut self) -> EngineResult<usize> {
        let Some(decision) = self.ctx.decision.clone() else {
            warn!(target: "spikeflow-engine", "[NETWORK] no decision layer configured, skipping labeling");
            return Ok(0);
        };
        let layer = decision.layer().index();
        if layer == 0 {
            return Ok(0);
        }

        let candidates = self.neurons_in_layer(LayerId::from_index(layer - 1))?.to_vec();
        let readers = self.neurons_in_layer(decision.layer())?.to_vec();

        let mut labeled = 0;
        for id in candidates {
            let Some(label) = self
                .ctx
                .histograms
                .get(&id)
                .and_then(|histogram| decision.assign_label(histogram))
            else {
                continue;
            };

            for &reader in &readers {
                if self.neurons[reader.index()].label() == Some(label.as_str())
                    && !self.is_connected(id, reader)
                {
                    self.connect_dirac(id, reader, 1.0, 0.0)?;
                }
            }
            self.neurons[id.index()].core_mut().label = Some(label);
            labeled += 1;
        }

        info!(
            target: "spikeflow-engine",
            "[NETWORK] labeled {}/{} neurons feeding the decision layer",
            labeled,
            self.ctx.layers[layer - 1].neurons.len()
        );
        Ok(labeled)
    }

    fn is_connected(&self, pre: NeuronId, post: NeuronId) -> bool {
        self.neurons[pre.index()]
            .axon_terminals()
            .iter()
            .any(|&id| self.ctx.synapses.get(id).is_ok_and(|s| s.postsynaptic() == post))
    }

    /// Reset dynamic neuron and synapse state; structure and weights are kept
    pub(crate) fn reset_dynamics(&mut self, clear_addons: bool) {
        for neuron in self.neurons.iter_mut() {
            neuron.reset(&mut self.ctx, clear_addons);
        }
        self.ctx.synapses.reset_all();
    }

    /// Return the network to its pre-run state
    ///
    /// Clears queues, labels, histograms and the learning cutoff, restores
    /// learning and resets every neuron. Structure and weights are kept.
    pub fn reset(&mut self, clear_addons: bool) {
        self.ctx.state.reset();
        self.ctx.state.set_learning_off_signal(self.settings.learning_off_signal);
        self.ctx.queues.clear();
        self.ctx.histograms.clear();
        self.ctx.predictions_enabled = false;
        self.ctx.now = 0.0;
        self.ctx.clear_warnings();
        if let Some(decision) = self.ctx.decision.as_mut() {
            decision.restart(0.0);
        }
        self.decision_warned.clear();
        self.reset_dynamics(clear_addons);
    }
}
