//! Scenario runtime facade
//!
//! Wires manifest, identifiers, loader, resolver and FSM together and exposes
//! the host-facing surface: per-kind enqueue helpers, `tick` and result
//! sampling.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::fsm::{EnqueueOptions, ExecutionFsm, RunId, StepCursor, TickOutcome};
use crate::state_machine::Phase;
use crate::tracker::{ResultRecord, ResultTracker};
use scn_actions::{ActionResolver, ArgumentMarshaler, HandlerRegistry};
use scn_scenario::{FsSource, Identifiers, Manifest, ScenarioId, ScenarioKind, ScenarioLoader, ScenarioSource};
use std::sync::Arc;

/// Host-facing scenario runner
#[derive(Debug)]
pub struct ScenarioRuntime {
    manifest: Arc<Manifest>,
    identifiers: Identifiers,
    fsm: ExecutionFsm,
}

impl ScenarioRuntime {
    /// Build a runtime over an already loaded manifest
    #[must_use]
    pub fn new(
        manifest: Arc<Manifest>,
        source: Arc<dyn ScenarioSource>,
        registry: HandlerRegistry,
        config: &EngineConfig,
    ) -> Self {
        let identifiers = manifest.generate_identifiers();
        let loader = ScenarioLoader::new(Arc::clone(&manifest), source)
            .with_cache(config.definition_cache_capacity);
        let marshaler = ArgumentMarshaler::new().with_dialog_keys(&config.dialog_keys);
        let fsm = ExecutionFsm::new(loader, ActionResolver::new(registry, marshaler));

        tracing::info!(
            scenarios = manifest.len(),
            actions = fsm.resolver().registry().len(),
            cache_capacity = config.definition_cache_capacity,
            "Scenario runtime ready"
        );
        Self {
            manifest,
            identifiers,
            fsm,
        }
    }

    /// Build a runtime from configuration, reading scenarios from disk
    ///
    /// # Errors
    /// Returns [`EngineError::Config`](crate::EngineError::Config) for invalid
    /// configuration and [`EngineError::Manifest`](crate::EngineError::Manifest)
    /// if the manifest cannot be loaded.
    pub fn from_config(config: &EngineConfig, registry: HandlerRegistry) -> Result<Self> {
        config.validate()?;
        let manifest = Manifest::load(config.manifest_path())?;
        let source = Arc::new(FsSource::new(&config.scenarios_dir));
        Ok(Self::new(Arc::new(manifest), source, registry, config))
    }

    /// Queue a mission by manifest key
    pub fn mission(&mut self, key: &str) -> bool {
        self.enqueue_key(ScenarioKind::Mission, key, EnqueueOptions::default())
            .is_some()
    }

    /// Queue a quest by manifest key
    pub fn quest(&mut self, key: &str) -> bool {
        self.enqueue_key(ScenarioKind::Quest, key, EnqueueOptions::default())
            .is_some()
    }

    /// Queue a run by manifest key
    pub fn run(&mut self, key: &str) -> bool {
        self.enqueue_key(ScenarioKind::Run, key, EnqueueOptions::default())
            .is_some()
    }

    /// Queue a vanquish by manifest key
    pub fn vanquish(&mut self, key: &str) -> bool {
        self.enqueue_key(ScenarioKind::Vanquish, key, EnqueueOptions::default())
            .is_some()
    }

    /// Queue a mission with options
    pub fn mission_with(&mut self, key: &str, options: EnqueueOptions) -> Option<RunId> {
        self.enqueue_key(ScenarioKind::Mission, key, options)
    }

    /// Queue a quest with options
    pub fn quest_with(&mut self, key: &str, options: EnqueueOptions) -> Option<RunId> {
        self.enqueue_key(ScenarioKind::Quest, key, options)
    }

    /// Queue a run with options
    pub fn run_with(&mut self, key: &str, options: EnqueueOptions) -> Option<RunId> {
        self.enqueue_key(ScenarioKind::Run, key, options)
    }

    /// Queue a vanquish with options
    pub fn vanquish_with(&mut self, key: &str, options: EnqueueOptions) -> Option<RunId> {
        self.enqueue_key(ScenarioKind::Vanquish, key, options)
    }

    /// Look up `key` in one category and queue it
    ///
    /// The case-preserving key is tried first, then the normalized form.
    pub fn enqueue_key(&mut self, kind: ScenarioKind, key: &str, options: EnqueueOptions) -> Option<RunId> {
        let Some(id) = self.identifiers.of(kind).lookup(key).cloned() else {
            tracing::warn!(%kind, key, "Rejected scenario enqueue: no such manifest entry");
            return None;
        };
        self.fsm.enqueue_with(&id, options)
    }

    /// Queue a scenario by identifier
    pub fn enqueue(&mut self, id: &ScenarioId) -> bool {
        self.fsm.enqueue(id)
    }

    /// Queue a scenario by identifier with options
    pub fn enqueue_with(&mut self, id: &ScenarioId, options: EnqueueOptions) -> Option<RunId> {
        self.fsm.enqueue_with(id, options)
    }

    /// Advance execution by one unit of work
    pub fn tick(&mut self) -> TickOutcome {
        self.fsm.tick()
    }

    /// Tick until nothing is running or queued, up to `max_ticks`
    ///
    /// Returns the number of ticks taken.
    pub fn run_until_idle(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && !self.fsm.is_idle() {
            self.fsm.tick();
            ticks += 1;
        }
        ticks
    }

    /// Whether the last completed run succeeded
    #[must_use]
    pub fn last_success(&self) -> bool {
        self.fsm.tracker().last_success()
    }

    /// Copy of the last result record
    #[must_use]
    pub fn last_result(&self) -> ResultRecord {
        self.fsm.tracker().last_result()
    }

    /// Read handle for sampling results from elsewhere
    #[must_use]
    pub fn tracker(&self) -> ResultTracker {
        self.fsm.tracker()
    }

    /// Identifiers generated from the manifest
    #[inline]
    #[must_use]
    pub fn identifiers(&self) -> &Identifiers {
        &self.identifiers
    }

    /// Loaded manifest
    #[inline]
    #[must_use]
    pub fn manifest(&self) -> &Arc<Manifest> {
        &self.manifest
    }

    /// Drop queued runs; the active run is unaffected
    pub fn clear_pending(&mut self) -> usize {
        self.fsm.clear_pending()
    }

    /// Number of queued runs
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.fsm.pending_len()
    }

    /// Check if nothing is running or queued
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.fsm.is_idle()
    }

    /// Current FSM phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.fsm.phase()
    }

    /// Position of the active run
    #[must_use]
    pub fn current_step(&self) -> Option<StepCursor> {
        self.fsm.current_step()
    }

    /// Underlying FSM
    #[inline]
    #[must_use]
    pub fn fsm(&self) -> &ExecutionFsm {
        &self.fsm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scn_actions::{handler_fn, StepStatus};
    use scn_scenario::MemorySource;

    fn runtime() -> ScenarioRuntime {
        let manifest = Manifest::from_json_str(
            r#"{"missions": {"Great_Northern_Wall": "m/wall.json"}, "runs": {"Feathers": "r/feathers.json"}}"#,
        )
        .unwrap();
        let source = MemorySource::new()
            .with("m/wall.json", r#"{"id": "wall", "kind": "mission", "actions": [{"action": "Map.Travel"}]}"#)
            .with("r/feathers.json", r#"{"id": "feathers", "kind": "run", "actions": []}"#);
        let mut registry = HandlerRegistry::new();
        registry
            .register("Map", "Travel", handler_fn(|_| StepStatus::Done))
            .unwrap();
        ScenarioRuntime::new(Arc::new(manifest), Arc::new(source), registry, &EngineConfig::default())
    }

    #[test]
    fn kind_helpers_accept_exact_and_normalized_keys() {
        let mut runtime = runtime();
        assert!(runtime.mission("Great_Northern_Wall"));
        assert!(runtime.mission("great northern wall"));
        assert!(!runtime.quest("Great_Northern_Wall"));
        assert!(!runtime.run("Wall"));
        assert!(!runtime.vanquish("Feathers"));
        assert_eq!(runtime.pending_len(), 2);
    }

    #[test]
    fn run_until_idle_drains_queue() {
        let mut runtime = runtime();
        assert!(runtime.run("feathers"));
        assert!(runtime.mission("Great_Northern_Wall"));

        let ticks = runtime.run_until_idle(100);
        assert_eq!(ticks, 3);
        assert!(runtime.is_idle());
        assert!(runtime.last_success());
        assert_eq!(runtime.tracker().completed_runs(), 2);
    }

    #[test]
    fn last_result_before_any_run() {
        let runtime = runtime();
        assert!(!runtime.last_success());
        assert_eq!(
            runtime.last_result().reason.as_deref(),
            Some("no scenario executed yet")
        );
        assert_eq!(runtime.identifiers().missions.len(), 1);
    }
}
