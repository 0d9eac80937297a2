//! FSM phases and the allowed-transition table
//!
//! ```text
//! Idle ──pop──▶ Running ──last step done──────────────▶ RunComplete ──▶ Idle
//!                 │  ▲                                        ▲
//!                 │  └── StepFailedOptional ──(last step)─────┤
//!                 └────▶ StepFailedFatal ─────────────────────┘
//! ```
//!
//! `StepFailedOptional` and `RunComplete` are transient: both are left within
//! the tick that entered them.

use crate::error::TransitionError;
use serde::Serialize;

/// Execution phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No active run
    Idle,
    /// A run is executing its current step
    Running,
    /// An optional step failed and is being skipped
    StepFailedOptional,
    /// A required step failed, the run is aborting
    StepFailedFatal,
    /// The run finished and its result is being published
    RunComplete,
}

/// Phases reachable from `from`
#[must_use]
pub fn allowed_transitions(from: Phase) -> &'static [Phase] {
    use Phase::{Idle, RunComplete, Running, StepFailedFatal, StepFailedOptional};
    match from {
        Idle => &[Running],
        Running => &[StepFailedOptional, StepFailedFatal, RunComplete],
        StepFailedOptional => &[Running, RunComplete],
        StepFailedFatal => &[RunComplete],
        RunComplete => &[Idle],
    }
}

/// Validate a phase change
///
/// # Errors
/// Returns [`TransitionError`] if `to` is not reachable from `from`.
pub fn validate_transition(from: Phase, to: Phase) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}
