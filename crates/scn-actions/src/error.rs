//! Error types for action resolution
//!
//! - [`ResolveError`]: a step's action cannot be turned into a call (run-time, per step)
//! - [`RegistryError`]: handler table misconfiguration (startup)

/// Errors turning an action step into a handler call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No canonical name or alias matches
    #[error("unknown action: '{name}'")]
    UnknownAction {
        /// Action name as written in the scenario
        name: String,
    },

    /// Dialog identifier argument is not a hex literal
    #[error("argument '{key}' must be a hex dialog id such as \"0x86\", got {value}")]
    ArgumentFormat {
        /// Offending kwargs key
        key: String,
        /// Offending value, JSON-rendered
        value: String,
    },
}

impl ResolveError {
    /// Create unknown action error
    pub fn unknown_action(name: impl Into<String>) -> Self {
        Self::UnknownAction { name: name.into() }
    }

    /// Create argument format error
    pub fn argument_format(key: impl Into<String>, value: &serde_json::Value) -> Self {
        Self::ArgumentFormat {
            key: key.into(),
            value: value.to_string(),
        }
    }
}

/// Errors while populating the handler registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Canonical name is not `Component.Method`
    #[error("invalid canonical action name: '{0}' (expected Component.Method)")]
    InvalidName(String),

    /// Canonical name registered twice
    #[error("action already registered: '{0}'")]
    DuplicateAction(String),

    /// Alias target is not registered
    #[error("alias '{alias}' targets unknown action '{canonical}'")]
    UnknownTarget {
        /// Requested alias
        alias: String,
        /// Missing canonical name
        canonical: String,
    },

    /// Alias already resolves to another action
    #[error("alias '{alias}' already resolves to '{existing}', cannot point it at '{requested}'")]
    AliasConflict {
        /// Requested alias
        alias: String,
        /// Canonical name it already resolves to
        existing: String,
        /// Canonical name requested
        requested: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_error_display() {
        let err = ResolveError::unknown_action("Mvoe.XY");
        assert_eq!(err.to_string(), "unknown action: 'Mvoe.XY'");

        let err = ResolveError::argument_format("dialog_id", &json!("hello"));
        assert_eq!(
            err.to_string(),
            "argument 'dialog_id' must be a hex dialog id such as \"0x86\", got \"hello\""
        );
    }

    #[test]
    fn registry_error_display() {
        let err = RegistryError::InvalidName("Move".to_string());
        assert!(err.to_string().contains("Component.Method"));
    }
}
