//! Scenario definitions and their JSON parser
//!
//! Parsing is purely structural: action names are kept as written and only
//! resolved when the step executes, so a typo fails that step rather than the
//! whole load.

use crate::error::FormatError;
use crate::kind::ScenarioKind;
use serde::Serialize;
use serde_json::{Map, Value};

/// Action-object keys with a meaning of their own; everything else folds into kwargs
const RESERVED_ACTION_KEYS: [&str; 5] = ["action", "args", "kwargs", "optional", "description"];

/// Parsed scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioDefinition {
    /// Scenario id declared in the file
    pub id: String,
    /// Declared kind
    pub kind: ScenarioKind,
    /// Display name
    pub name: Option<String>,
    /// Free-form metadata object
    pub metadata: Option<Map<String, Value>>,
    /// Ordered action list
    pub actions: Vec<ActionStep>,
}

impl ScenarioDefinition {
    /// Name for logs: `name` if set, else `id`
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check for an empty action list
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// One entry of a scenario's action list
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ActionStep {
    /// Symbolic action name, canonical `Component.Method` or an alias
    pub action: String,
    /// Positional arguments
    pub args: Vec<Value>,
    /// Keyword arguments, including any unrecognized action-object keys
    pub kwargs: Map<String, Value>,
    /// Failure of an optional step never aborts the run
    pub optional: bool,
    /// Human-readable note
    pub description: Option<String>,
}

impl ActionStep {
    /// Create step with no arguments
    #[inline]
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    /// Add positional argument
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Add keyword argument
    #[inline]
    #[must_use]
    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// Mark as optional
    #[inline]
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Parse a scenario document
///
/// # Errors
/// Returns [`FormatError`] if the JSON is invalid or `id`, `kind`, `actions`
/// (or any optional field present) have the wrong shape.
pub fn parse_definition(content: &str) -> Result<ScenarioDefinition, FormatError> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| FormatError::Syntax(e.to_string()))?;
    let Value::Object(mut root) = value else {
        return Err(FormatError::NotAnObject);
    };

    let id = match root.remove("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(_) => {
            return Err(FormatError::InvalidField {
                field: "id",
                expected: "a non-empty string",
            })
        }
        None => return Err(FormatError::MissingField("id")),
    };

    let kind = match root.remove("kind") {
        Some(Value::String(s)) => s.parse::<ScenarioKind>()?,
        Some(_) => {
            return Err(FormatError::InvalidField {
                field: "kind",
                expected: "a string",
            })
        }
        None => return Err(FormatError::MissingField("kind")),
    };

    let name = optional_string(&mut root, "name")?;

    let metadata = match root.remove("metadata") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            return Err(FormatError::InvalidField {
                field: "metadata",
                expected: "an object",
            })
        }
    };

    let actions = match root.remove("actions") {
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| parse_action(index, item))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(FormatError::InvalidField {
                field: "actions",
                expected: "an array",
            })
        }
        None => return Err(FormatError::MissingField("actions")),
    };

    Ok(ScenarioDefinition {
        id,
        kind,
        name,
        metadata,
        actions,
    })
}

fn optional_string(root: &mut Map<String, Value>, field: &'static str) -> Result<Option<String>, FormatError> {
    match root.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(_) => Err(FormatError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

fn parse_action(index: usize, raw: Value) -> Result<ActionStep, FormatError> {
    let Value::Object(mut raw) = raw else {
        return Err(FormatError::invalid_action(index, "must be an object"));
    };

    let action = match raw.remove("action") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(_) => return Err(FormatError::invalid_action(index, "'action' must be a non-empty string")),
        None => return Err(FormatError::invalid_action(index, "missing 'action'")),
    };

    let args = match raw.remove("args") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(args)) => args,
        Some(_) => return Err(FormatError::invalid_action(index, "'args' must be an array")),
    };

    let mut kwargs = match raw.remove("kwargs") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(kwargs)) => kwargs,
        Some(_) => return Err(FormatError::invalid_action(index, "'kwargs' must be an object")),
    };

    let optional = match raw.remove("optional") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(_) => return Err(FormatError::invalid_action(index, "'optional' must be a boolean")),
    };

    let description = optional_string(&mut raw, "description")
        .map_err(|_| FormatError::invalid_action(index, "'description' must be a string"))?;

    for (key, value) in raw {
        debug_assert!(!RESERVED_ACTION_KEYS.contains(&key.as_str()));
        kwargs.insert(key, value);
    }

    Ok(ActionStep {
        action,
        args,
        kwargs,
        optional,
        description,
    })
}
