use super::PayloadObject;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters supplied by the client when it opens a call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInfo {
    /// Identifier of the method to invoke, resolved through a method registry.
    #[serde(default)]
    pub method_id: String,

    /// Serialized JSON argument object, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// Reasons the serialized arguments of a [`CallInfo`] are rejected.
#[derive(Debug, Error)]
pub enum ArgumentsError {
    #[error("arguments are not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("arguments must be an object, got {0}")]
    NotAnObject(&'static str),
}

impl CallInfo {
    pub fn new(method_id: impl Into<String>) -> Self {
        Self {
            method_id: method_id.into(),
            arguments: None,
        }
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }

    /// Returns `true` when a non-empty method identifier is present.
    pub fn has_method_id(&self) -> bool {
        !self.method_id.is_empty()
    }

    /// Decodes the argument payload.
    ///
    /// An absent or empty argument string yields `Ok(None)`. Anything other
    /// than a JSON object (arrays, strings, numbers, `null`) is rejected.
    pub fn parse_arguments(&self) -> Result<Option<PayloadObject>, ArgumentsError> {
        let raw = match self.arguments.as_deref() {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };

        match serde_json::from_str::<serde_json::Value>(raw)? {
            serde_json::Value::Object(map) => Ok(Some(map)),
            serde_json::Value::Array(_) => Err(ArgumentsError::NotAnObject("an array")),
            serde_json::Value::String(_) => Err(ArgumentsError::NotAnObject("a string")),
            serde_json::Value::Number(_) => Err(ArgumentsError::NotAnObject("a number")),
            serde_json::Value::Bool(_) => Err(ArgumentsError::NotAnObject("a boolean")),
            serde_json::Value::Null => Err(ArgumentsError::NotAnObject("null")),
        }
    }
}
