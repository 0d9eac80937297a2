//! Step resolution: registry lookup plus argument marshaling

use crate::error::ResolveError;
use crate::handler::{ActionCall, ActionHandler, StepTask};
use crate::marshal::{ArgumentMarshaler, RunParams};
use crate::registry::HandlerRegistry;
use scn_scenario::ActionStep;
use std::fmt;
use std::sync::Arc;

/// Resolved handler with its marshaled call, ready to start
pub struct PreparedAction {
    handler: Arc<dyn ActionHandler>,
    call: ActionCall,
}

impl fmt::Debug for PreparedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedAction").field("call", &self.call).finish_non_exhaustive()
    }
}

impl PreparedAction {
    /// Marshaled call
    #[inline]
    #[must_use]
    pub fn call(&self) -> &ActionCall {
        &self.call
    }

    /// Start the handler
    #[must_use]
    pub fn start(&self) -> Box<dyn StepTask> {
        self.handler.start(&self.call)
    }
}

/// Maps action steps to started handler tasks
#[derive(Debug, Clone, Default)]
pub struct ActionResolver {
    registry: HandlerRegistry,
    marshaler: ArgumentMarshaler,
}

impl ActionResolver {
    /// Create resolver
    #[must_use]
    pub fn new(registry: HandlerRegistry, marshaler: ArgumentMarshaler) -> Self {
        Self { registry, marshaler }
    }

    /// Handler registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Argument marshaler
    #[inline]
    #[must_use]
    pub fn marshaler(&self) -> &ArgumentMarshaler {
        &self.marshaler
    }

    /// Resolve a step's handler and marshal its arguments
    ///
    /// # Errors
    /// - [`ResolveError::UnknownAction`] if the action name does not resolve
    /// - [`ResolveError::ArgumentFormat`] if a dialog identifier is malformed
    pub fn prepare(&self, step: &ActionStep, params: &RunParams) -> Result<PreparedAction, ResolveError> {
        let resolved = self.registry.resolve(&step.action)?;
        let marshaled = self.marshaler.marshal(step, params)?;

        Ok(PreparedAction {
            handler: resolved.handler,
            call: ActionCall {
                action: step.action.clone(),
                canonical: resolved.canonical.to_string(),
                args: marshaled.args,
                kwargs: marshaled.kwargs,
            },
        })
    }
}
