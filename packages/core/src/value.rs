//! The Value type - every shape a payload converter understands.

use std::fmt;

use bytes::Bytes;

use crate::message::MessageValue;
use crate::named::Named;
use crate::unnamed::Unnamed;

/// A value on its way to or from the wire.
///
/// Each variant corresponds to one family of converters; typed Rust values
/// reach a variant through [`IntoValue`](crate::IntoValue) and leave it
/// through [`FromValue`](crate::FromValue).
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// No value at all. Serializes to zero payloads.
    #[default]
    Void,
    /// An explicit null.
    Null,
    /// Raw bytes, carried verbatim.
    Bytes(Bytes),
    /// A structured wire message.
    Message(MessageValue),
    /// A JSON scalar or object graph.
    Json(serde_json::Value),
    /// Positional values.
    Unnamed(Unnamed),
    /// Keyed values.
    Named(Named),
}

/// The shape of a [`Value`], used in errors and entry inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Void,
    Null,
    Bytes,
    Message,
    Json,
    Unnamed,
    Named,
}

impl Value {
    /// The shape of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Void => ValueKind::Void,
            Value::Null => ValueKind::Null,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Message(_) => ValueKind::Message,
            Value::Json(_) => ValueKind::Json,
            Value::Unnamed(_) => ValueKind::Unnamed,
            Value::Named(_) => ValueKind::Named,
        }
    }

    /// Check if this value is an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is void.
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Short description for cast errors.
    pub(crate) fn describe(&self) -> String {
        match self {
            Value::Message(m) => format!("message {}", m.type_name()),
            Value::Json(json) => Value::describe_json(json),
            other => other.kind().to_string(),
        }
    }

    pub(crate) fn describe_json(json: &serde_json::Value) -> String {
        format!("json {}", json_kind(json))
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Void => "void",
            ValueKind::Null => "null",
            ValueKind::Bytes => "bytes",
            ValueKind::Message => "message",
            ValueKind::Json => "json",
            ValueKind::Unnamed => "unnamed container",
            ValueKind::Named => "named container",
        };
        f.write_str(name)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<MessageValue> for Value {
    fn from(v: MessageValue) -> Self {
        Value::Message(v)
    }
}

impl From<Unnamed> for Value {
    fn from(v: Unnamed) -> Self {
        Value::Unnamed(v)
    }
}

impl From<Named> for Value {
    fn from(v: Named) -> Self {
        Value::Named(v)
    }
}
