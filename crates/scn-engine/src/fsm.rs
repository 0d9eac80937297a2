//! Tick-driven execution FSM
//!
//! Each [`ExecutionFsm::tick`] performs exactly one unit of work:
//!
//! - pop the next queued run, or
//! - start and/or poll the current step once, or
//! - nothing, when idle with an empty queue
//!
//! Handlers never block; a step that needs more time answers
//! [`StepStatus::Pending`] and is polled again on the next tick. The FSM owns
//! all execution state and is driven through `&mut self`, so a step can never
//! be polled re-entrantly or concurrently with another.

use crate::error::TransitionError;
use crate::state_machine::{validate_transition, Phase};
use crate::tracker::{ResultRecord, ResultTracker, ResultWriter};
use scn_actions::{ActionResolver, RunParams, StepStatus, StepTask};
use scn_scenario::{ScenarioDefinition, ScenarioId, ScenarioLoader};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use ulid::Ulid;

/// Unique run identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub Ulid);

impl RunId {
    /// Generate new run ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-run enqueue options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnqueueOptions {
    /// Values for `${name}` placeholders in step arguments
    pub params: RunParams,
    /// Free-form label carried into the result record
    pub label: Option<String>,
}

impl EnqueueOptions {
    /// Create empty options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With one placeholder value
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// With label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Run waiting in the queue
#[derive(Debug, Clone)]
pub struct QueuedRun {
    /// Run identifier
    pub run_id: RunId,
    /// Scenario being run
    pub scenario: ScenarioId,
    /// Definition as loaded at enqueue time
    pub definition: Arc<ScenarioDefinition>,
    /// Placeholder values
    pub params: RunParams,
    /// Caller label
    pub label: Option<String>,
}

/// Position of the active run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCursor {
    /// Active run
    pub run_id: RunId,
    /// Index of the step being executed
    pub index: usize,
    /// Number of steps in the run
    pub total: usize,
    /// Whether the step's handler has been started
    pub started: bool,
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing queued, nothing running
    Idle,
    /// A queued run became active
    Started {
        /// Run popped from the queue
        run_id: RunId,
    },
    /// The current step is still in progress
    StepPending {
        /// Active run
        run_id: RunId,
        /// Step index
        step: usize,
    },
    /// A step finished and the run moved to the next one
    StepCompleted {
        /// Active run
        run_id: RunId,
        /// Index of the finished step
        step: usize,
    },
    /// An optional step failed and the run moved past it
    StepSkipped {
        /// Active run
        run_id: RunId,
        /// Index of the skipped step
        step: usize,
    },
    /// The run finished and its result was published
    RunCompleted {
        /// Finished run
        run_id: RunId,
        /// Whether it succeeded
        succeeded: bool,
    },
}

impl TickOutcome {
    /// Run this tick worked on
    #[must_use]
    pub fn run_id(&self) -> Option<RunId> {
        match *self {
            Self::Idle => None,
            Self::Started { run_id }
            | Self::StepPending { run_id, .. }
            | Self::StepCompleted { run_id, .. }
            | Self::StepSkipped { run_id, .. }
            | Self::RunCompleted { run_id, .. } => Some(run_id),
        }
    }

    /// Check if this tick completed a run
    #[inline]
    #[must_use]
    pub fn is_run_completed(&self) -> bool {
        matches!(self, Self::RunCompleted { .. })
    }
}

struct ActiveRun {
    run: QueuedRun,
    step_index: usize,
    task: Option<Box<dyn StepTask>>,
    skipped: Vec<usize>,
}

/// Scenario execution state machine
pub struct ExecutionFsm {
    loader: ScenarioLoader,
    resolver: ActionResolver,
    queue: VecDeque<QueuedRun>,
    current: Option<ActiveRun>,
    phase: Phase,
    writer: ResultWriter,
}

impl fmt::Debug for ExecutionFsm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionFsm")
            .field("phase", &self.phase)
            .field("pending", &self.queue.len())
            .field("current", &self.current_step())
            .finish_non_exhaustive()
    }
}

impl ExecutionFsm {
    /// Create idle FSM
    #[must_use]
    pub fn new(loader: ScenarioLoader, resolver: ActionResolver) -> Self {
        Self {
            loader,
            resolver,
            queue: VecDeque::new(),
            current: None,
            phase: Phase::Idle,
            writer: ResultWriter::new(),
        }
    }

    /// Load a scenario and queue it with default options
    ///
    /// Returns `false` if the scenario cannot be loaded; queue and result
    /// state are then unchanged.
    pub fn enqueue(&mut self, id: &ScenarioId) -> bool {
        self.enqueue_with(id, EnqueueOptions::default()).is_some()
    }

    /// Load a scenario and queue it
    ///
    /// Runs queue FIFO behind any active or already queued run.
    pub fn enqueue_with(&mut self, id: &ScenarioId, options: EnqueueOptions) -> Option<RunId> {
        let definition = match self.loader.load(id) {
            Ok(definition) => definition,
            Err(error) => {
                tracing::warn!(scenario = %id, %error, "Rejected scenario enqueue");
                return None;
            }
        };

        let run_id = RunId::new();
        tracing::debug!(
            %run_id,
            scenario = %id,
            steps = definition.len(),
            queued_behind = self.queue.len() + usize::from(self.current.is_some()),
            "Queued scenario run"
        );
        self.queue.push_back(QueuedRun {
            run_id,
            scenario: id.clone(),
            definition,
            params: options.params,
            label: options.label,
        });
        Some(run_id)
    }

    /// Advance execution by one unit of work
    pub fn tick(&mut self) -> TickOutcome {
        if self.current.is_some() {
            return self.step();
        }

        let Some(run) = self.queue.pop_front() else {
            return TickOutcome::Idle;
        };

        let run_id = run.run_id;
        tracing::info!(
            %run_id,
            scenario = %run.scenario,
            name = run.definition.display_name(),
            steps = run.definition.len(),
            "Scenario run started"
        );
        let empty = run.definition.is_empty();
        self.current = Some(ActiveRun {
            run,
            step_index: 0,
            task: None,
            skipped: Vec::new(),
        });
        self.transition(Phase::Running);

        if empty {
            return self.complete_success();
        }
        TickOutcome::Started { run_id }
    }

    fn step(&mut self) -> TickOutcome {
        let Some(active) = self.current.as_mut() else {
            return TickOutcome::Idle;
        };
        let run_id = active.run.run_id;
        let index = active.step_index;
        let Some(step) = active.run.definition.actions.get(index) else {
            return self.complete_success();
        };

        if active.task.is_none() {
            match self.resolver.prepare(step, &active.run.params) {
                Ok(prepared) => {
                    tracing::debug!(
                        %run_id,
                        step = index,
                        action = %step.action,
                        canonical = %prepared.call().canonical,
                        "Starting step"
                    );
                    active.task = Some(prepared.start());
                }
                Err(error) => return self.fail_step(error.to_string()),
            }
        }

        let status = match active.task.as_mut() {
            Some(task) => task.poll(),
            None => StepStatus::failed("step task missing"),
        };

        match status {
            StepStatus::Pending => TickOutcome::StepPending { run_id, step: index },
            StepStatus::Done => {
                tracing::debug!(%run_id, step = index, "Step completed");
                self.advance(TickOutcome::StepCompleted { run_id, step: index })
            }
            StepStatus::Failed(reason) => self.fail_step(reason),
        }
    }

    /// Move past the current step; completes the run after the last one
    fn advance(&mut self, outcome: TickOutcome) -> TickOutcome {
        let Some(active) = self.current.as_mut() else {
            return TickOutcome::Idle;
        };
        active.task = None;
        active.step_index += 1;
        if active.step_index >= active.run.definition.len() {
            return self.complete_success();
        }
        outcome
    }

    fn fail_step(&mut self, reason: String) -> TickOutcome {
        let Some(active) = self.current.as_mut() else {
            return TickOutcome::Idle;
        };
        let run_id = active.run.run_id;
        let index = active.step_index;
        let total = active.run.definition.len();
        let (action, optional) = active
            .run
            .definition
            .actions
            .get(index)
            .map_or((String::new(), false), |s| (s.action.clone(), s.optional));

        if optional {
            tracing::warn!(%run_id, step = index, %action, %reason, "Optional step failed, skipping");
            active.skipped.push(index);
            self.transition(Phase::StepFailedOptional);
            if index + 1 < total {
                self.transition(Phase::Running);
            }
            return self.advance(TickOutcome::StepSkipped { run_id, step: index });
        }

        tracing::warn!(%run_id, step = index, %action, %reason, "Step failed, aborting run");
        self.transition(Phase::StepFailedFatal);
        let Some(active) = self.current.take() else {
            return TickOutcome::Idle;
        };
        let base = ResultRecord::success(active.run.run_id, active.run.scenario, active.run.label, active.skipped);
        self.finish(ResultRecord::failure(base, index, action, reason))
    }

    fn complete_success(&mut self) -> TickOutcome {
        let Some(active) = self.current.take() else {
            return TickOutcome::Idle;
        };
        self.finish(ResultRecord::success(
            active.run.run_id,
            active.run.scenario,
            active.run.label,
            active.skipped,
        ))
    }

    fn finish(&mut self, record: ResultRecord) -> TickOutcome {
        self.transition(Phase::RunComplete);
        let run_id = record.run_id.unwrap_or_default();
        let succeeded = record.succeeded;
        tracing::info!(
            %run_id,
            succeeded,
            skipped = record.skipped_optional_steps.len(),
            reason = record.reason.as_deref().unwrap_or(""),
            "Scenario run completed"
        );
        self.writer.publish(record);
        self.transition(Phase::Idle);
        TickOutcome::RunCompleted { run_id, succeeded }
    }

    fn transition(&mut self, to: Phase) {
        if let Err(error) = validate_transition(self.phase, to) {
            report_illegal(error);
        }
        self.phase = to;
    }

    /// Drop queued runs; the active run is unaffected
    pub fn clear_pending(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        if dropped > 0 {
            tracing::info!(dropped, "Cleared pending scenario runs");
        }
        dropped
    }

    /// Number of queued runs, excluding the active one
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Check if nothing is running or queued
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Position of the active run, if any
    #[must_use]
    pub fn current_step(&self) -> Option<StepCursor> {
        self.current.as_ref().map(|active| StepCursor {
            run_id: active.run.run_id,
            index: active.step_index,
            total: active.run.definition.len(),
            started: active.task.is_some(),
        })
    }

    /// Active run, if any
    #[must_use]
    pub fn current_run(&self) -> Option<&QueuedRun> {
        self.current.as_ref().map(|active| &active.run)
    }

    /// Read handle on the last result
    #[must_use]
    pub fn tracker(&self) -> ResultTracker {
        self.writer.tracker()
    }

    /// Definition loader
    #[inline]
    #[must_use]
    pub fn loader(&self) -> &ScenarioLoader {
        &self.loader
    }

    /// Action resolver
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &ActionResolver {
        &self.resolver
    }
}

fn report_illegal(error: TransitionError) {
    tracing::error!(from = ?error.from, to = ?error.to, "Illegal execution phase transition");
    debug_assert!(false, "{error}");
}
