//! Last-run result tracking
//!
//! The FSM owns the only [`ResultWriter`]; hosts sample through any number of
//! cloned [`ResultTracker`] handles. Each completed run overwrites the record
//! in one write, so readers never see a half-updated result.

use crate::fsm::RunId;
use parking_lot::RwLock;
use scn_scenario::ScenarioId;
use serde::Serialize;
use std::sync::Arc;

const NOTHING_RUN_YET: &str = "no scenario executed yet";

/// Outcome of the most recently completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    /// Whether the run finished without a fatal step failure
    pub succeeded: bool,
    /// Run that produced this record
    pub run_id: Option<RunId>,
    /// Scenario that was run
    pub scenario: Option<ScenarioId>,
    /// Caller-supplied label
    pub label: Option<String>,
    /// Index of the step that aborted the run
    pub failed_step_index: Option<usize>,
    /// Action name of that step, as written
    pub failed_action_name: Option<String>,
    /// Failure reason
    pub reason: Option<String>,
    /// Indices of optional steps that failed and were skipped
    pub skipped_optional_steps: Vec<usize>,
}

impl ResultRecord {
    /// Record reported before any run completes
    #[must_use]
    pub fn initial() -> Self {
        Self {
            succeeded: false,
            run_id: None,
            scenario: None,
            label: None,
            failed_step_index: None,
            failed_action_name: None,
            reason: Some(NOTHING_RUN_YET.to_string()),
            skipped_optional_steps: Vec::new(),
        }
    }

    /// Successful run
    #[must_use]
    pub fn success(
        run_id: RunId,
        scenario: ScenarioId,
        label: Option<String>,
        skipped_optional_steps: Vec<usize>,
    ) -> Self {
        Self {
            succeeded: true,
            run_id: Some(run_id),
            scenario: Some(scenario),
            label,
            failed_step_index: None,
            failed_action_name: None,
            reason: None,
            skipped_optional_steps,
        }
    }

    /// Run aborted at `step_index`
    #[must_use]
    pub fn failure(
        base: Self,
        step_index: usize,
        action: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            succeeded: false,
            failed_step_index: Some(step_index),
            failed_action_name: Some(action.into()),
            reason: Some(reason.into()),
            ..base
        }
    }
}

impl Default for ResultRecord {
    fn default() -> Self {
        Self::initial()
    }
}

#[derive(Debug)]
struct Slot {
    record: ResultRecord,
    completed_runs: u64,
}

/// Exclusive write side, held by the FSM
#[derive(Debug)]
pub struct ResultWriter {
    slot: Arc<RwLock<Slot>>,
}

impl ResultWriter {
    /// Create a writer holding the initial record
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(Slot {
                record: ResultRecord::initial(),
                completed_runs: 0,
            })),
        }
    }

    /// Replace the record and bump the completion counter
    pub fn publish(&mut self, record: ResultRecord) {
        let mut slot = self.slot.write();
        slot.record = record;
        slot.completed_runs += 1;
    }

    /// New read handle
    #[must_use]
    pub fn tracker(&self) -> ResultTracker {
        ResultTracker {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl Default for ResultWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared read handle
#[derive(Debug, Clone)]
pub struct ResultTracker {
    slot: Arc<RwLock<Slot>>,
}

impl ResultTracker {
    /// Whether the last completed run succeeded
    #[must_use]
    pub fn last_success(&self) -> bool {
        self.slot.read().record.succeeded
    }

    /// Copy of the last record
    #[must_use]
    pub fn last_result(&self) -> ResultRecord {
        self.slot.read().record.clone()
    }

    /// Number of runs completed so far
    #[must_use]
    pub fn completed_runs(&self) -> u64 {
        self.slot.read().completed_runs
    }

    /// Record and counter read under one lock
    #[must_use]
    pub fn snapshot(&self) -> (u64, ResultRecord) {
        let slot = self.slot.read();
        (slot.completed_runs, slot.record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scn_scenario::ScenarioKind;

    #[test]
    fn initial_record() {
        let writer = ResultWriter::new();
        let tracker = writer.tracker();
        assert!(!tracker.last_success());
        assert_eq!(tracker.completed_runs(), 0);
        assert_eq!(tracker.last_result().reason.as_deref(), Some("no scenario executed yet"));
    }

    #[test]
    fn publish_overwrites_for_every_reader() {
        let mut writer = ResultWriter::new();
        let first = writer.tracker();
        let second = first.clone();

        let id = ScenarioId::new(ScenarioKind::Run, "Feathers");
        let run_id = RunId::new();
        let ok = ResultRecord::success(run_id, id.clone(), None, vec![2]);
        writer.publish(ok.clone());

        assert!(first.last_success());
        assert_eq!(second.last_result(), ok);
        assert_eq!(second.completed_runs(), 1);

        let failed = ResultRecord::failure(
            ResultRecord::success(RunId::new(), id, Some("farm".into()), Vec::new()),
            3,
            "Move.XY",
            "blocked",
        );
        writer.publish(failed);

        let (count, record) = first.snapshot();
        assert_eq!(count, 2);
        assert!(!record.succeeded);
        assert_eq!(record.failed_step_index, Some(3));
        assert_eq!(record.failed_action_name.as_deref(), Some("Move.XY"));
        assert_eq!(record.label.as_deref(), Some("farm"));
    }

    #[test]
    fn readers_on_other_threads() {
        let mut writer = ResultWriter::new();
        let tracker = writer.tracker();
        writer.publish(ResultRecord::success(
            RunId::new(),
            ScenarioId::new(ScenarioKind::Quest, "Q"),
            None,
            Vec::new(),
        ));

        let handle = std::thread::spawn(move || tracker.last_success());
        assert!(handle.join().unwrap());
    }
}
