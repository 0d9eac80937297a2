//! Action resolution for scenario steps
//!
//! Scenario files name actions as strings. This crate maps those strings onto
//! registered handlers through an explicit table and prepares the arguments
//! each handler receives.
//!
//! # Core Concepts
//!
//! - [`ActionHandler`] / [`StepTask`]: a started step polled once per tick
//! - [`HandlerRegistry`]: canonical `Component.Method` names plus normalized aliases
//! - [`ArgumentMarshaler`]: `${param}` substitution and hex dialog-id conversion
//! - [`ActionResolver`]: both together, turning an [`ActionStep`](scn_scenario::ActionStep)
//!   into a [`PreparedAction`]
//!
//! # Example
//!
//! ```rust
//! use scn_actions::{handler_fn, ActionResolver, ArgumentMarshaler, HandlerRegistry, RunParams, StepStatus};
//! use scn_scenario::ActionStep;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("Move", "XY", handler_fn(|_| StepStatus::Done)).unwrap();
//!
//! let resolver = ActionResolver::new(registry, ArgumentMarshaler::new());
//! let step = ActionStep::new("move_xy").with_arg(100).with_arg(200);
//! let prepared = resolver.prepare(&step, &RunParams::new()).unwrap();
//! assert_eq!(prepared.call().canonical, "Move.XY");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod handler;
pub mod marshal;
pub mod registry;
pub mod resolver;

pub use error::{RegistryError, ResolveError};
pub use handler::{handler_fn, ActionCall, ActionHandler, FnHandler, StepStatus, StepTask};
pub use marshal::{ArgumentMarshaler, MarshaledArgs, RunParams};
pub use registry::{HandlerRegistry, ResolvedAction};
pub use resolver::{ActionResolver, PreparedAction};
