//! Error types for the payload layer.
//!
//! "This converter does not handle that shape" is not an error: converters
//! report it by returning `Ok(false)` / `Ok(None)`. Everything here is a real
//! failure of the current call.

use thiserror::Error;

use crate::encoding::Encoding;
use crate::value::ValueKind;

/// Errors from payload conversion and container access.
#[derive(Debug, Error)]
pub enum Error {
    /// Index outside `0..count` on an unnamed container.
    #[error("index {index} is out of range for a container of {count} values")]
    IndexOutOfRange { index: usize, count: usize },

    /// Key not present in a named container.
    #[error("key '{key}' not found in a container of {count} values")]
    KeyNotFound { key: String, count: usize },

    /// A stored or decoded value cannot be converted to the requested type.
    #[error("cannot convert {actual} to {expected}")]
    InvalidCast {
        expected: &'static str,
        actual: String,
    },

    /// A constructor or operation was given an unusable argument.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// An entry whose container or slot does not exist.
    #[error("invalid entry: {message}")]
    InvalidEntry { message: String },

    /// A converter accepted a payload and then failed to produce the value.
    #[error("failed to deserialize {requested} using {converter}: {source}")]
    Deserialize {
        requested: &'static str,
        converter: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// Encoding a value into payload bytes failed.
    #[error("encode error ({encoding}): {message}")]
    Encode { encoding: Encoding, message: String },

    /// Payload bytes are malformed for their encoding.
    #[error("decode error ({encoding}): {message}")]
    Decode { encoding: Encoding, message: String },

    /// No converter in the chain accepts the value.
    #[error("no payload converter accepts a {kind} value")]
    NoConverter { kind: ValueKind },

    /// No converter in the chain can produce the requested type.
    #[error("no payload converter can produce {requested} from '{encoding}'")]
    NoDecoder {
        requested: &'static str,
        encoding: String,
    },

    /// A container converter outlived the chain it delegates to.
    #[error("payload converter chain was dropped")]
    ConverterDropped,
}

/// Result type alias for payload operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid-entry error.
    pub fn invalid_entry(message: impl Into<String>) -> Self {
        Error::InvalidEntry {
            message: message.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(encoding: Encoding, message: impl Into<String>) -> Self {
        Error::Encode {
            encoding,
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(encoding: Encoding, message: impl Into<String>) -> Self {
        Error::Decode {
            encoding,
            message: message.into(),
        }
    }

    /// Create an invalid-cast error.
    pub fn invalid_cast(expected: &'static str, actual: impl Into<String>) -> Self {
        Error::InvalidCast {
            expected,
            actual: actual.into(),
        }
    }

    /// Wrap a failure raised inside an accepted deserialization attempt.
    ///
    /// An error that is already a `Deserialize` error is returned as-is so
    /// nested containers report the innermost converter.
    pub fn deserialize(requested: &'static str, converter: &'static str, source: Error) -> Self {
        match source {
            Error::Deserialize { .. } => source,
            other => Error::Deserialize {
                requested,
                converter,
                source: Box::new(other),
            },
        }
    }

    /// True for the not-found conditions `try_get_value` maps to `None`.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::IndexOutOfRange { .. } | Error::KeyNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn index_out_of_range_display() {
        let e = Error::IndexOutOfRange { index: 3, count: 2 };
        let display = format!("{}", e);
        assert!(display.contains('3'));
        assert!(display.contains('2'));
    }

    #[test]
    fn key_not_found_display() {
        let e = Error::KeyNotFound {
            key: "name".to_string(),
            count: 0,
        };
        assert!(format!("{}", e).contains("'name'"));
    }

    #[test]
    fn decode_error_display() {
        let e = Error::decode(Encoding::JSON, "unexpected token");
        let display = format!("{}", e);
        assert!(display.contains("decode error"));
        assert!(display.contains("json/plain"));
        assert!(display.contains("unexpected token"));
    }

    #[test]
    fn deserialize_preserves_cause() {
        let cause = Error::decode(Encoding::JSON, "eof");
        let e = Error::deserialize("alloc::string::String", "JsonPayloadConverter", cause);

        let display = format!("{}", e);
        assert!(display.contains("alloc::string::String"));
        assert!(display.contains("JsonPayloadConverter"));

        let source = StdError::source(&e).unwrap();
        assert!(source.to_string().contains("eof"));
    }

    #[test]
    fn deserialize_does_not_double_wrap() {
        let inner = Error::deserialize("i32", "Inner", Error::decode(Encoding::JSON, "bad"));
        let outer = Error::deserialize("Unnamed", "Outer", inner);

        match outer {
            Error::Deserialize { converter, .. } => assert_eq!(converter, "Inner"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn not_found_classification() {
        assert!(Error::IndexOutOfRange { index: 0, count: 0 }.is_not_found());
        assert!(Error::KeyNotFound {
            key: "k".to_string(),
            count: 0
        }
        .is_not_found());
        assert!(!Error::invalid_cast("i32", "bytes").is_not_found());
    }

    #[test]
    fn no_converter_display() {
        let e = Error::NoConverter {
            kind: ValueKind::Named,
        };
        assert!(format!("{}", e).contains("named"));
    }
}
