//! Endpoint exception objects.
//!
//! Remote primitives report failures as a JSON object flagged with
//! `__endpoint_exception__`. Some primitives hand that object back as a
//! regular response instead of failing, so callers have to inspect results
//! with [`EndpointException::from_response`] and raise it themselves.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::options::is_truthy;

/// Flag marking a JSON object as an exception.
pub const EXCEPTION_FLAG: &str = "__endpoint_exception__";

/// An exception raised by (or returned from) a remote primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointException {
    #[serde(rename = "__endpoint_exception__", default = "flag_set")]
    flag: bool,
    /// Error category (e.g. `not_found`, `argument`).
    #[serde(default)]
    pub code: String,
    /// Human readable description.
    #[serde(default)]
    pub message: String,
    /// Name of the function that raised the exception.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// Extra details, such as the raw error body returned by Google.
    #[serde(
        rename = "additionalInfo",
        default,
        skip_serializing_if = "Value::is_null"
    )]
    pub additional_info: Value,
}

fn flag_set() -> bool {
    true
}

impl EndpointException {
    /// Creates a new exception with the given code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            flag: true,
            code: code.into(),
            message: message.into(),
            function: None,
            additional_info: Value::Null,
        }
    }

    /// Sets the name of the function that raised this exception.
    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Attaches extra details.
    #[must_use]
    pub fn with_additional_info(mut self, info: Value) -> Self {
        self.additional_info = info;
        self
    }

    /// Returns `true` when `value` is a flagged exception object.
    pub fn is_exception(value: &Value) -> bool {
        value
            .as_object()
            .and_then(|map| map.get(EXCEPTION_FLAG))
            .is_some_and(is_truthy)
    }

    /// Extracts an exception from a response, if the response is one.
    ///
    /// Fields with unexpected types are dropped rather than rejecting the
    /// whole object, since the flag alone decides that this is a failure.
    pub fn from_response(value: &Value) -> Option<Self> {
        if !Self::is_exception(value) {
            return None;
        }
        let map = value.as_object()?;
        let text = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Some(Self {
            flag: true,
            code: text("code").unwrap_or_default(),
            message: text("message").unwrap_or_default(),
            function: text("function"),
            additional_info: map.get("additionalInfo").cloned().unwrap_or(Value::Null),
        })
    }

    /// Renames the reporting function, including mentions in the message.
    pub fn replace_function(&mut self, from: &str, to: &str) {
        if from.is_empty() {
            return;
        }
        if let Some(function) = self.function.as_mut() {
            if function == from {
                *function = to.to_string();
            }
        }
        if self.message.contains(from) {
            self.message = self.message.replace(from, to);
        }
    }

    /// Serializes this exception into its flagged JSON form.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl fmt::Display for EndpointException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref function) = self.function {
            write!(f, "[{}] ", function)?;
        }
        if self.code.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for EndpointException {}
