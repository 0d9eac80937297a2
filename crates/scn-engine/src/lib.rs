//! Tick-driven scenario execution engine
//!
//! Runs manifest-registered scenarios one step per tick on the host's update
//! loop. Nothing here spawns threads or blocks: handlers that need time
//! answer `Pending` and are polled again on the next tick.
//!
//! # Core Concepts
//!
//! - [`ScenarioRuntime`]: host-facing facade (`mission`, `quest`, `run`, `vanquish`, `tick`)
//! - [`ExecutionFsm`]: FIFO run queue and per-step state machine
//! - [`ResultTracker`]: cloneable read handle on the last [`ResultRecord`]
//! - [`EngineConfig`]: TOML configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use scn_engine::prelude::*;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("Map", "Travel", handler_fn(|call| travel(call)))?;
//!
//! let mut runtime = ScenarioRuntime::from_config(&EngineConfig::from_file("engine.toml")?, registry)?;
//! runtime.mission("Great Northern Wall");
//!
//! loop {
//!     runtime.tick();
//!     if runtime.is_idle() {
//!         break;
//!     }
//! }
//! assert!(runtime.last_success());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod fsm;
pub mod logging;
pub mod runtime;
pub mod state_machine;
pub mod tracker;

pub use config::EngineConfig;
pub use error::{ConfigError, EngineError, Result, TransitionError};
pub use fsm::{EnqueueOptions, ExecutionFsm, QueuedRun, RunId, StepCursor, TickOutcome};
pub use runtime::ScenarioRuntime;
pub use state_machine::{allowed_transitions, validate_transition, Phase};
pub use tracker::{ResultRecord, ResultTracker, ResultWriter};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports for hosts
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::error::EngineError;
    pub use crate::fsm::{EnqueueOptions, RunId, TickOutcome};
    pub use crate::runtime::ScenarioRuntime;
    pub use crate::tracker::{ResultRecord, ResultTracker};
    pub use scn_actions::{handler_fn, ActionCall, ActionHandler, HandlerRegistry, StepStatus, StepTask};
    pub use scn_scenario::{ScenarioId, ScenarioKind};
}
