//! Error types for the execution engine
//!
//! Only construction can fail with an error value. Once the runtime exists,
//! enqueue rejections surface as `false` and step failures land in the
//! [`ResultRecord`](crate::tracker::ResultRecord).

use crate::state_machine::Phase;
use scn_actions::RegistryError;
use scn_scenario::ManifestError;
use std::path::PathBuf;

/// Engine configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config '{}': {source}", path.display())]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for [`EngineConfig`](crate::config::EngineConfig)
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid config value for '{field}': {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Disallowed FSM phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal phase transition: {from:?} -> {to:?}")]
pub struct TransitionError {
    /// Phase before
    pub from: Phase,
    /// Requested phase
    pub to: Phase,
}

/// Runtime construction errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Manifest could not be loaded
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Handler registration failed
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Result type for engine construction
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_conversions() {
        let err: EngineError = RegistryError::DuplicateAction("Move.XY".into()).into();
        assert!(matches!(err, EngineError::Registry(_)));
        assert!(err.to_string().starts_with("registry error"));

        let err: EngineError = ConfigError::Invalid {
            field: "manifest_file",
            reason: "must not be empty".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "configuration error: invalid config value for 'manifest_file': must not be empty"
        );
    }

    #[test]
    fn transition_error_display() {
        let err = TransitionError {
            from: Phase::Idle,
            to: Phase::RunComplete,
        };
        assert_eq!(err.to_string(), "illegal phase transition: Idle -> RunComplete");
    }
}
