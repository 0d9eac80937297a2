//! Handler capability
//!
//! A handler is started once per step with the marshaled [`ActionCall`] and
//! returns a [`StepTask`]. The engine polls that task once per tick until it
//! reports [`StepStatus::Done`] or [`StepStatus::Failed`]; "waiting" is a task
//! answering [`StepStatus::Pending`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Outcome of one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// Not finished, poll again next tick
    Pending,
    /// Finished successfully
    Done,
    /// Finished unsuccessfully
    Failed(String),
}

impl StepStatus {
    /// Create failure with reason
    #[inline]
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    /// Check if no further polling is needed
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl From<bool> for StepStatus {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Done
        } else {
            Self::failed("action returned false")
        }
    }
}

/// Marshaled invocation of one action step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionCall {
    /// Action name as written in the scenario
    pub action: String,
    /// Canonical `Component.Method` it resolved to
    pub canonical: String,
    /// Positional arguments
    pub args: Vec<Value>,
    /// Keyword arguments
    pub kwargs: Map<String, Value>,
}

impl ActionCall {
    /// Positional argument by index
    #[inline]
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Keyword argument by key
    #[inline]
    #[must_use]
    pub fn kwarg(&self, key: &str) -> Option<&Value> {
        self.kwargs.get(key)
    }

    /// Keyword argument as an unsigned integer
    #[must_use]
    pub fn kwarg_u64(&self, key: &str) -> Option<u64> {
        self.kwarg(key).and_then(Value::as_u64)
    }

    /// Keyword argument as a string slice
    #[must_use]
    pub fn kwarg_str(&self, key: &str) -> Option<&str> {
        self.kwarg(key).and_then(Value::as_str)
    }
}

/// In-flight execution of one step
pub trait StepTask: Send {
    /// Advance by one tick
    fn poll(&mut self) -> StepStatus;
}

/// Executable capability behind a canonical action name
pub trait ActionHandler: Send + Sync {
    /// Begin executing a step
    fn start(&self, call: &ActionCall) -> Box<dyn StepTask>;
}

/// Handler built from a closure polled with the same call every tick
///
/// Closures that finish in one tick just return [`StepStatus::Done`]; multi-tick
/// closures keep their own progress (atomics, shared state) and answer
/// [`StepStatus::Pending`] until ready.
pub struct FnHandler<F> {
    f: Arc<F>,
}

/// Wrap a closure as a handler
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&ActionCall) -> StepStatus + Send + Sync + 'static,
{
    FnHandler { f: Arc::new(f) }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

impl<F> ActionHandler for FnHandler<F>
where
    F: Fn(&ActionCall) -> StepStatus + Send + Sync + 'static,
{
    fn start(&self, call: &ActionCall) -> Box<dyn StepTask> {
        Box::new(FnTask {
            f: Arc::clone(&self.f),
            call: call.clone(),
        })
    }
}

struct FnTask<F> {
    f: Arc<F>,
    call: ActionCall,
}

impl<F> StepTask for FnTask<F>
where
    F: Fn(&ActionCall) -> StepStatus + Send + Sync,
{
    fn poll(&mut self) -> StepStatus {
        (self.f)(&self.call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn call(kwargs: Value) -> ActionCall {
        ActionCall {
            action: "wait.for_time".to_string(),
            canonical: "Wait.ForTime".to_string(),
            args: vec![json!(500)],
            kwargs: kwargs.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn fn_handler_polls_closure() {
        let polls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&polls);
        let handler = handler_fn(move |_call| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                StepStatus::Pending
            } else {
                StepStatus::Done
            }
        });

        let mut task = handler.start(&call(json!({})));
        assert_eq!(task.poll(), StepStatus::Pending);
        assert_eq!(task.poll(), StepStatus::Pending);
        assert_eq!(task.poll(), StepStatus::Done);
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn call_accessors() {
        let call = call(json!({"dialog_id": 134, "name": "Enter"}));
        assert_eq!(call.arg(0), Some(&json!(500)));
        assert_eq!(call.kwarg_u64("dialog_id"), Some(134));
        assert_eq!(call.kwarg_str("name"), Some("Enter"));
        assert_eq!(call.kwarg("missing"), None);
    }

    #[test]
    fn status_from_bool() {
        assert_eq!(StepStatus::from(true), StepStatus::Done);
        assert!(matches!(StepStatus::from(false), StepStatus::Failed(_)));
        assert!(!StepStatus::Pending.is_finished());
        assert!(StepStatus::failed("x").is_finished());
    }
}
