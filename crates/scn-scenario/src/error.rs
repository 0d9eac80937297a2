//! Error types for manifest and scenario loading
//!
//! - [`ManifestError`]: malformed or ambiguous manifest (fatal at startup)
//! - [`FormatError`]: structurally invalid scenario definition
//! - [`LoadError`]: identifier could not be turned into a definition

use crate::manifest::ScenarioId;
use crate::ScenarioKind;
use std::path::PathBuf;

/// Errors while loading the scenario manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// IO error reading the manifest file
    #[error("io error reading manifest {path}: {source}")]
    Io {
        /// Manifest path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid JSON
    #[error("manifest syntax error: {0}")]
    Syntax(String),

    /// Manifest root is not a JSON object
    #[error("manifest root must be an object, got {0}")]
    NotAnObject(&'static str),

    /// Top-level key is not a known category
    #[error("unknown manifest category: '{0}'")]
    UnknownCategory(String),

    /// Category declared more than once
    #[error("manifest category declared twice: '{0}'")]
    DuplicateCategory(String),

    /// Category section is not an object
    #[error("manifest section '{category}' must be an object, got {found}")]
    MalformedSection {
        /// Section name
        category: String,
        /// JSON type found instead
        found: &'static str,
    },

    /// Entry value is not a source location string
    #[error("manifest entry '{key}' in '{category}' must be a path string")]
    InvalidEntry {
        /// Section name
        category: String,
        /// Entry key
        key: String,
    },

    /// Entry key is blank
    #[error("manifest section '{category}' contains an empty key")]
    EmptyKey {
        /// Section name
        category: String,
    },

    /// Same key registered twice in one category
    #[error("duplicate key '{key}' in manifest section '{category}'")]
    DuplicateKey {
        /// Section name
        category: String,
        /// Repeated key
        key: String,
    },

    /// Two distinct keys share a normalized form
    #[error("keys '{first}' and '{second}' in '{category}' both normalize to '{normalized}'")]
    NormalizedCollision {
        /// Section name
        category: String,
        /// Key registered first
        first: String,
        /// Colliding key
        second: String,
        /// Shared normalized form
        normalized: String,
    },
}

impl ManifestError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Structural errors in a scenario definition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Source is not valid JSON
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Root is not a JSON object
    #[error("scenario root must be an object")]
    NotAnObject,

    /// Required field absent
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// Field present with the wrong JSON type
    #[error("field '{field}' must be {expected}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// Expected shape
        expected: &'static str,
    },

    /// `kind` is not a recognized scenario kind
    #[error("unsupported scenario kind: '{0}'")]
    UnknownKind(String),

    /// Action entry is malformed
    #[error("action at index {index}: {reason}")]
    InvalidAction {
        /// Position in the action list
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Definition kind differs from the manifest category
    #[error("kind mismatch: registered as {expected}, file declares {found}")]
    KindMismatch {
        /// Category the identifier belongs to
        expected: ScenarioKind,
        /// Kind declared in the file
        found: ScenarioKind,
    },
}

impl FormatError {
    /// Create an action-level error
    pub fn invalid_action(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidAction {
            index,
            reason: reason.into(),
        }
    }
}

/// Errors resolving an identifier into a definition
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Identifier has no manifest entry
    #[error("scenario not found: {id} is not registered in the manifest")]
    NotRegistered {
        /// Requested identifier
        id: ScenarioId,
    },

    /// Manifest entry points at an unreadable source
    #[error("scenario not found: cannot read {location} for {id}: {source}")]
    SourceUnavailable {
        /// Requested identifier
        id: ScenarioId,
        /// Source location from the manifest
        location: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Source was read but is structurally invalid
    #[error("malformed scenario {id} ({location}): {source}")]
    Format {
        /// Requested identifier
        id: ScenarioId,
        /// Source location from the manifest
        location: String,
        /// Structural problem
        #[source]
        source: FormatError,
    },
}

impl LoadError {
    /// True for the not-found family (unregistered or unreadable)
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotRegistered { .. } | Self::SourceUnavailable { .. })
    }

    /// Identifier the failed load was for
    #[must_use]
    pub fn id(&self) -> &ScenarioId {
        match self {
            Self::NotRegistered { id }
            | Self::SourceUnavailable { id, .. }
            | Self::Format { id, .. } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_error_display() {
        let err = ManifestError::DuplicateKey {
            category: "runs".to_string(),
            key: "feather_farm".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate key 'feather_farm' in manifest section 'runs'"
        );
    }

    #[test]
    fn format_error_display() {
        let err = FormatError::invalid_action(3, "missing 'action'");
        assert_eq!(err.to_string(), "action at index 3: missing 'action'");
    }

    #[test]
    fn load_error_classification() {
        let id = ScenarioId::new(ScenarioKind::Run, "missing");
        let err = LoadError::NotRegistered { id: id.clone() };
        assert!(err.is_not_found());
        assert_eq!(err.id(), &id);

        let err = LoadError::Format {
            id,
            location: "runs/x.json".to_string(),
            source: FormatError::NotAnObject,
        };
        assert!(!err.is_not_found());
    }
}
