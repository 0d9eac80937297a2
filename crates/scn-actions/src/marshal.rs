//! Argument marshaling
//!
//! Turns an [`ActionStep`]'s declared arguments into the values a handler
//! receives, in two passes:
//!
//! 1. `${name}` placeholders are substituted from the run's [`RunParams`]
//! 2. hex literals under dialog-identifier kwargs keys become integers
//!
//! Everything else passes through untouched.

use crate::error::ResolveError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scn_scenario::ActionStep;
use serde_json::{Map, Value};

/// Caller-supplied values for `${name}` placeholders
pub type RunParams = Map<String, Value>;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));
static WHOLE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\{([A-Za-z_][A-Za-z0-9_]*)\}$").expect("valid regex"));
static HEX_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[xX]([0-9a-fA-F]+)$").expect("valid regex"));

/// Arguments ready for a handler call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarshaledArgs {
    /// Positional arguments
    pub args: Vec<Value>,
    /// Keyword arguments
    pub kwargs: Map<String, Value>,
}

/// Converts declared step arguments into call arguments
#[derive(Debug, Clone, Default)]
pub struct ArgumentMarshaler {
    extra_dialog_keys: Vec<String>,
}

impl ArgumentMarshaler {
    /// Create marshaler recognizing only `*dialog*` keys
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add further kwargs keys that carry dialog identifiers
    #[must_use]
    pub fn with_dialog_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extra_dialog_keys
            .extend(keys.into_iter().map(|k| k.as_ref().trim().to_lowercase()));
        self
    }

    /// Check whether a kwargs key carries dialog identifiers
    #[must_use]
    pub fn is_dialog_key(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        key.contains("dialog") || self.extra_dialog_keys.iter().any(|k| *k == key)
    }

    /// Marshal a step's arguments
    ///
    /// # Errors
    /// Returns [`ResolveError::ArgumentFormat`] naming the key when a dialog
    /// identifier value is a string but not a hex literal.
    pub fn marshal(&self, step: &ActionStep, params: &RunParams) -> Result<MarshaledArgs, ResolveError> {
        let args = step.args.iter().map(|v| substitute(v, params)).collect();

        let mut kwargs = Map::with_capacity(step.kwargs.len());
        for (key, value) in &step.kwargs {
            let value = substitute(value, params);
            let value = if self.is_dialog_key(key) {
                convert_dialog_value(key, value)?
            } else {
                value
            };
            kwargs.insert(key.clone(), value);
        }

        Ok(MarshaledArgs { args, kwargs })
    }
}

/// Replace placeholders in a value, recursing into arrays and objects
fn substitute(value: &Value, params: &RunParams) -> Value {
    match value {
        Value::String(s) => substitute_str(s, params),
        Value::Array(items) => Value::Array(items.iter().map(|v| substitute(v, params)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute(v, params)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn substitute_str(s: &str, params: &RunParams) -> Value {
    if let Some(caps) = WHOLE_PLACEHOLDER.captures(s) {
        if let Some(value) = params.get(&caps[1]) {
            return value.clone();
        }
    }

    let replaced = PLACEHOLDER.replace_all(s, |caps: &Captures<'_>| match params.get(&caps[1]) {
        Some(Value::String(inner)) => inner.clone(),
        Some(other) => other.to_string(),
        None => caps[0].to_string(),
    });
    Value::String(replaced.into_owned())
}

fn convert_dialog_value(key: &str, value: Value) -> Result<Value, ResolveError> {
    match value {
        Value::String(s) => parse_hex(&s)
            .map(Value::from)
            .ok_or_else(|| ResolveError::argument_format(key, &Value::String(s))),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => parse_hex(&s)
                    .map(Value::from)
                    .ok_or_else(|| ResolveError::argument_format(key, &Value::String(s))),
                other => Ok(other),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other),
    }
}

/// Parse `0x`-prefixed hex into an integer; `None` if malformed or out of range
fn parse_hex(s: &str) -> Option<u64> {
    let caps = HEX_LITERAL.captures(s.trim())?;
    u64::from_str_radix(&caps[1], 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn params(value: Value) -> RunParams {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn hex_dialog_id_becomes_integer() {
        let step = ActionStep::new("Dialogs.Select").with_kwarg("dialog_id", "0x86");
        let out = ArgumentMarshaler::new().marshal(&step, &RunParams::new()).unwrap();
        assert_eq!(out.kwargs["dialog_id"], json!(134));
    }

    #[test]
    fn hex_dialog_list_elements_convert() {
        let step = ActionStep::new("Dialogs.Sequence").with_kwarg("Dialogs", json!(["0x84", "0X8A", 7]));
        let out = ArgumentMarshaler::new().marshal(&step, &RunParams::new()).unwrap();
        assert_eq!(out.kwargs["Dialogs"], json!([132, 138, 7]));
    }

    #[test]
    fn non_hex_dialog_id_fails_naming_key() {
        let step = ActionStep::new("Dialogs.Select").with_kwarg("dialog_id", "hello");
        let err = ArgumentMarshaler::new().marshal(&step, &RunParams::new()).unwrap_err();
        assert_eq!(err, ResolveError::argument_format("dialog_id", &json!("hello")));

        let step = ActionStep::new("Dialogs.Select").with_kwarg("dialog_id", "0xFFFFFFFFFFFFFFFFF");
        assert!(ArgumentMarshaler::new().marshal(&step, &RunParams::new()).is_err());
    }

    #[test]
    fn non_dialog_keys_pass_through() {
        let step = ActionStep::new("Move.XY")
            .with_arg(10)
            .with_arg("0x10")
            .with_kwarg("color", "0xFF00FF")
            .with_kwarg("dialog_count", 3);
        let out = ArgumentMarshaler::new().marshal(&step, &RunParams::new()).unwrap();
        assert_eq!(out.args, vec![json!(10), json!("0x10")]);
        assert_eq!(out.kwargs["color"], json!("0xFF00FF"));
        assert_eq!(out.kwargs["dialog_count"], json!(3));
    }

    #[test]
    fn configured_dialog_keys() {
        let marshaler = ArgumentMarshaler::new().with_dialog_keys(["NPC_Reply"]);
        assert!(marshaler.is_dialog_key("npc_reply"));
        assert!(marshaler.is_dialog_key("DialogOption"));
        assert!(!marshaler.is_dialog_key("reply"));

        let step = ActionStep::new("Dialogs.Select").with_kwarg("npc_reply", "0x1");
        let out = marshaler.marshal(&step, &RunParams::new()).unwrap();
        assert_eq!(out.kwargs["npc_reply"], json!(1));
    }

    #[test]
    fn whole_placeholder_keeps_type() {
        let step = ActionStep::new("Move.XY")
            .with_arg("${x}")
            .with_arg("${y}")
            .with_kwarg("path", json!(["${x}", {"nested": "${flag}"}]));
        let params = params(json!({"x": 120, "y": -45.5, "flag": true}));
        let out = ArgumentMarshaler::new().marshal(&step, &params).unwrap();
        assert_eq!(out.args, vec![json!(120), json!(-45.5)]);
        assert_eq!(out.kwargs["path"], json!([120, {"nested": true}]));
    }

    #[test]
    fn embedded_placeholders_are_stringified() {
        let step = ActionStep::new("Chat.Send").with_arg("go to ${town} x${count}");
        let params = params(json!({"town": "Kamadan", "count": 3}));
        let out = ArgumentMarshaler::new().marshal(&step, &params).unwrap();
        assert_eq!(out.args, vec![json!("go to Kamadan x3")]);
    }

    #[test]
    fn unknown_placeholders_stay_verbatim() {
        let step = ActionStep::new("Chat.Send").with_arg("${missing}").with_arg("a ${missing} b");
        let out = ArgumentMarshaler::new().marshal(&step, &RunParams::new()).unwrap();
        assert_eq!(out.args, vec![json!("${missing}"), json!("a ${missing} b")]);
    }

    #[test]
    fn placeholder_feeds_hex_conversion() {
        let step = ActionStep::new("Dialogs.Select").with_kwarg("dialog_id", "${reward}");
        let params = params(json!({"reward": "0x8B"}));
        let out = ArgumentMarshaler::new().marshal(&step, &params).unwrap();
        assert_eq!(out.kwargs["dialog_id"], json!(139));
    }

    proptest! {
        #[test]
        fn any_u32_hex_round_trips(n in any::<u32>()) {
            let step = ActionStep::new("Dialogs.Select").with_kwarg("dialog_id", format!("0x{n:x}"));
            let out = ArgumentMarshaler::new().marshal(&step, &RunParams::new()).unwrap();
            prop_assert_eq!(out.kwargs["dialog_id"].as_u64(), Some(u64::from(n)));
        }
    }
}
