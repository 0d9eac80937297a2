//! Testing utilities for the scenario workspace
//!
//! Scripted handlers, a shared call log and scenario tree fixtures.

#![allow(missing_docs)]

use parking_lot::Mutex;
use scn_actions::{handler_fn, ActionCall, ActionHandler, HandlerRegistry, StepStatus, StepTask};
use scn_scenario::{Manifest, MemorySource, ScenarioKind};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Every call started by recording handlers, in start order
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<ActionCall>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: ActionCall) {
        self.0.lock().push(call);
    }

    pub fn calls(&self) -> Vec<ActionCall> {
        self.0.lock().clone()
    }

    /// Canonical names in start order
    pub fn canonical_names(&self) -> Vec<String> {
        self.0.lock().iter().map(|c| c.canonical.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// Handler whose every started task plays back `script`, then repeats the last status
#[derive(Debug, Clone)]
pub struct ScriptedHandler {
    script: Vec<StepStatus>,
    log: Option<CallLog>,
}

impl ScriptedHandler {
    pub fn new(script: Vec<StepStatus>) -> Self {
        Self { script, log: None }
    }

    /// Finishes on the first poll
    pub fn done() -> Self {
        Self::new(vec![StepStatus::Done])
    }

    /// Fails on the first poll
    pub fn failing(reason: &str) -> Self {
        Self::new(vec![StepStatus::failed(reason)])
    }

    /// Pending for `ticks` polls, then done
    pub fn pending_for(ticks: usize) -> Self {
        let mut script = vec![StepStatus::Pending; ticks];
        script.push(StepStatus::Done);
        Self::new(script)
    }

    /// Record every start into `log`
    #[must_use]
    pub fn recorded(mut self, log: &CallLog) -> Self {
        self.log = Some(log.clone());
        self
    }
}

impl ActionHandler for ScriptedHandler {
    fn start(&self, call: &ActionCall) -> Box<dyn StepTask> {
        if let Some(log) = &self.log {
            log.push(call.clone());
        }
        Box::new(ScriptedTask {
            remaining: self.script.iter().cloned().collect(),
            last: self.script.last().cloned().unwrap_or(StepStatus::Done),
        })
    }
}

struct ScriptedTask {
    remaining: VecDeque<StepStatus>,
    last: StepStatus,
}

impl StepTask for ScriptedTask {
    fn poll(&mut self) -> StepStatus {
        self.remaining.pop_front().unwrap_or_else(|| self.last.clone())
    }
}

/// Registry with the actions used across engine tests, all recording into `log`
///
/// - `Test.Ok`: done on first poll
/// - `Test.Fail`: fails with "scripted failure"
/// - `Test.Wait`: pending for two polls, then done
/// - `Dialogs.Select`: done, for dialog-id marshaling checks
pub fn test_registry(log: &CallLog) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register("Test", "Ok", ScriptedHandler::done().recorded(log))
        .unwrap();
    registry
        .register("Test", "Fail", ScriptedHandler::failing("scripted failure").recorded(log))
        .unwrap();
    registry
        .register("Test", "Wait", ScriptedHandler::pending_for(2).recorded(log))
        .unwrap();
    registry
        .register("Dialogs", "Select", ScriptedHandler::done().recorded(log))
        .unwrap();
    registry
        .register("Chat", "Echo", handler_fn(|_| StepStatus::Done))
        .unwrap();
    registry
}

/// Action object JSON
pub fn action(name: &str) -> Value {
    json!({ "action": name })
}

/// Optional action object JSON
pub fn optional_action(name: &str) -> Value {
    json!({ "action": name, "optional": true })
}

/// Scenario document text
pub fn scenario_json(id: &str, kind: ScenarioKind, actions: &[Value]) -> String {
    json!({ "id": id, "kind": kind.as_str(), "actions": actions }).to_string()
}

/// Builder for a manifest plus its scenario documents
#[derive(Debug, Default, Clone)]
pub struct ScenarioTree {
    sections: BTreeMap<ScenarioKind, Map<String, Value>>,
    documents: Vec<(String, String)>,
}

impl ScenarioTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` under `kind` with a generated document
    #[must_use]
    pub fn scenario(self, kind: ScenarioKind, key: &str, actions: &[Value]) -> Self {
        let location = format!("{}/{}.json", kind.section_name(), key.to_lowercase().replace(' ', "_"));
        let document = scenario_json(&key.to_lowercase(), kind, actions);
        self.raw(kind, key, &location, &document)
    }

    /// Register `key` under `kind` with an explicit location and document text
    #[must_use]
    pub fn raw(mut self, kind: ScenarioKind, key: &str, location: &str, document: &str) -> Self {
        self.sections
            .entry(kind)
            .or_default()
            .insert(key.to_string(), Value::String(location.to_string()));
        self.documents.push((location.to_string(), document.to_string()));
        self
    }

    /// Register `key` under `kind` pointing at a location with no document
    #[must_use]
    pub fn dangling(mut self, kind: ScenarioKind, key: &str, location: &str) -> Self {
        self.sections
            .entry(kind)
            .or_default()
            .insert(key.to_string(), Value::String(location.to_string()));
        self
    }

    /// Manifest JSON text
    pub fn manifest_json(&self) -> String {
        let root: Map<String, Value> = self
            .sections
            .iter()
            .map(|(kind, entries)| (kind.section_name().to_string(), Value::Object(entries.clone())))
            .collect();
        Value::Object(root).to_string()
    }

    pub fn manifest(&self) -> Arc<Manifest> {
        Arc::new(Manifest::from_json_str(&self.manifest_json()).unwrap())
    }

    pub fn source(&self) -> Arc<MemorySource> {
        let mut source = MemorySource::new();
        for (location, document) in &self.documents {
            source.insert(location.clone(), document.clone());
        }
        Arc::new(source)
    }

    /// Write manifest and documents under `dir`
    pub fn write_to(&self, dir: &Path, manifest_file: &str) {
        std::fs::write(dir.join(manifest_file), self.manifest_json()).unwrap();
        for (location, document) in &self.documents {
            let path = dir.join(location);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, document).unwrap();
        }
    }

    /// Write into a fresh temporary directory as `manifest.json`
    pub fn write_temp(&self) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        self.write_to(dir.path(), "manifest.json");
        dir
    }
}
