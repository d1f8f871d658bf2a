//! The structured-message capability used by the protobuf converters.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::encoding::Encoding;
use crate::{Error, Result};

/// Boxed error returned by message codecs.
pub type MessageError = Box<dyn std::error::Error + Send + Sync>;

/// A structured wire message (typically a generated protobuf type).
///
/// This crate treats the message as opaque: it only needs the full type name
/// and the two wire encodings.
///
/// # Implementing
///
/// ```rust
/// use temporal_payload_core::{Message, MessageError};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Ping {
///     seq: u8,
/// }
///
/// impl Message for Ping {
///     fn type_name() -> &'static str {
///         "demo.Ping"
///     }
///
///     fn encode_binary(&self) -> Vec<u8> {
///         vec![self.seq]
///     }
///
///     fn decode_binary(bytes: &[u8]) -> Result<Self, MessageError> {
///         match bytes {
///             [seq] => Ok(Ping { seq: *seq }),
///             _ => Err("expected one byte".into()),
///         }
///     }
///
///     fn encode_json(&self) -> Result<Vec<u8>, MessageError> {
///         Ok(format!("{{\"seq\":{}}}", self.seq).into_bytes())
///     }
///
///     fn decode_json(bytes: &[u8]) -> Result<Self, MessageError> {
///         let text = std::str::from_utf8(bytes)?;
///         let seq = text.trim_start_matches("{\"seq\":").trim_end_matches('}').parse()?;
///         Ok(Ping { seq })
///     }
/// }
/// ```
pub trait Message: Clone + fmt::Debug + Send + Sync + 'static {
    /// Fully-qualified message type name.
    fn type_name() -> &'static str;

    /// Encode to the binary wire format.
    fn encode_binary(&self) -> Vec<u8>;

    /// Decode from the binary wire format.
    fn decode_binary(bytes: &[u8]) -> std::result::Result<Self, MessageError>;

    /// Encode to canonical JSON.
    fn encode_json(&self) -> std::result::Result<Vec<u8>, MessageError>;

    /// Decode from canonical JSON.
    fn decode_json(bytes: &[u8]) -> std::result::Result<Self, MessageError>;
}

/// Which wire encoding a message payload uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageEncoding {
    Binary,
    Json,
}

impl MessageEncoding {
    /// The payload encoding tag for this message encoding.
    pub fn encoding(self) -> Encoding {
        match self {
            MessageEncoding::Binary => Encoding::PROTOBUF,
            MessageEncoding::Json => Encoding::PROTOBUF_JSON,
        }
    }
}

trait ErasedMessage: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &'static str;
    fn encode(&self, encoding: MessageEncoding) -> std::result::Result<Vec<u8>, MessageError>;
    fn as_any(&self) -> &dyn Any;
}

impl<M: Message> ErasedMessage for M {
    fn type_name(&self) -> &'static str {
        M::type_name()
    }

    fn encode(&self, encoding: MessageEncoding) -> std::result::Result<Vec<u8>, MessageError> {
        match encoding {
            MessageEncoding::Binary => Ok(self.encode_binary()),
            MessageEncoding::Json => self.encode_json(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Debug)]
enum Repr {
    Live(Arc<dyn ErasedMessage>),
    Encoded {
        type_name: String,
        encoding: MessageEncoding,
        data: Bytes,
    },
}

/// A message held either as a live instance or in its encoded form.
///
/// Values coming off the wire stay encoded until a caller asks for a
/// concrete message type with [`MessageValue::decode`].
#[derive(Clone, Debug)]
pub struct MessageValue {
    repr: Repr,
}

impl MessageValue {
    /// Wrap a live message.
    pub fn new<M: Message>(message: M) -> Self {
        Self {
            repr: Repr::Live(Arc::new(message)),
        }
    }

    /// Wrap encoded message bytes.
    pub fn encoded(
        type_name: impl Into<String>,
        encoding: MessageEncoding,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            repr: Repr::Encoded {
                type_name: type_name.into(),
                encoding,
                data: data.into(),
            },
        }
    }

    /// Fully-qualified type name of the message.
    pub fn type_name(&self) -> &str {
        match &self.repr {
            Repr::Live(m) => m.type_name(),
            Repr::Encoded { type_name, .. } => type_name,
        }
    }

    /// True if this value is still in encoded form.
    pub fn is_encoded(&self) -> bool {
        matches!(self.repr, Repr::Encoded { .. })
    }

    /// Encode into the requested wire encoding.
    ///
    /// Returns `Ok(None)` when the message is held encoded in a different
    /// encoding: transcoding needs the concrete type.
    pub fn encode(&self, encoding: MessageEncoding) -> Result<Option<Bytes>> {
        match &self.repr {
            Repr::Live(m) => m
                .encode(encoding)
                .map(|bytes| Some(Bytes::from(bytes)))
                .map_err(|e| Error::encode(encoding.encoding(), e.to_string())),
            Repr::Encoded {
                encoding: held,
                data,
                ..
            } if *held == encoding => Ok(Some(data.clone())),
            Repr::Encoded { .. } => Ok(None),
        }
    }

    /// Produce a concrete message.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidCast` if the held message is a different type
    /// - `Error::Decode` if the encoded bytes are malformed
    pub fn decode<M: Message>(&self) -> Result<M> {
        match &self.repr {
            Repr::Live(m) => m
                .as_any()
                .downcast_ref::<M>()
                .cloned()
                .ok_or_else(|| Error::invalid_cast(M::type_name(), m.type_name())),
            Repr::Encoded {
                type_name,
                encoding,
                data,
            } => {
                if type_name != M::type_name() {
                    return Err(Error::invalid_cast(M::type_name(), type_name.clone()));
                }
                let decoded = match encoding {
                    MessageEncoding::Binary => M::decode_binary(data),
                    MessageEncoding::Json => M::decode_json(data),
                };
                decoded.map_err(|e| Error::decode(encoding.encoding(), e.to_string()))
            }
        }
    }
}

impl PartialEq for MessageValue {
    fn eq(&self, other: &Self) -> bool {
        if self.type_name() != other.type_name() {
            return false;
        }
        match (
            self.encode(MessageEncoding::Binary),
            other.encode(MessageEncoding::Binary),
        ) {
            (Ok(Some(a)), Ok(Some(b))) => a == b,
            _ => match (
                self.encode(MessageEncoding::Json),
                other.encode(MessageEncoding::Json),
            ) {
                (Ok(Some(a)), Ok(Some(b))) => a == b,
                _ => false,
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two-field message encoded as `[id, flag]` / `{"id":..,"flag":..}`.
    #[derive(Clone, Debug, PartialEq)]
    pub(crate) struct Toggle {
        pub id: u8,
        pub flag: bool,
    }

    impl Message for Toggle {
        fn type_name() -> &'static str {
            "test.Toggle"
        }

        fn encode_binary(&self) -> Vec<u8> {
            vec![self.id, self.flag as u8]
        }

        fn decode_binary(bytes: &[u8]) -> std::result::Result<Self, MessageError> {
            match bytes {
                [id, flag] => Ok(Toggle {
                    id: *id,
                    flag: *flag != 0,
                }),
                _ => Err(format!("expected 2 bytes, got {}", bytes.len()).into()),
            }
        }

        fn encode_json(&self) -> std::result::Result<Vec<u8>, MessageError> {
            Ok(serde_json::to_vec(&serde_json::json!({"id": self.id, "flag": self.flag}))?)
        }

        fn decode_json(bytes: &[u8]) -> std::result::Result<Self, MessageError> {
            let json: serde_json::Value = serde_json::from_slice(bytes)?;
            let id = json["id"].as_u64().ok_or("missing id")? as u8;
            let flag = json["flag"].as_bool().ok_or("missing flag")?;
            Ok(Toggle { id, flag })
        }
    }

    #[test]
    fn live_message_roundtrip() {
        let value = MessageValue::new(Toggle { id: 7, flag: true });
        assert_eq!(value.type_name(), "test.Toggle");
        assert!(!value.is_encoded());

        let back: Toggle = value.decode().unwrap();
        assert_eq!(back, Toggle { id: 7, flag: true });
    }

    #[test]
    fn encoded_message_decodes_lazily() {
        let value = MessageValue::encoded("test.Toggle", MessageEncoding::Binary, vec![3u8, 0]);
        assert!(value.is_encoded());

        let back: Toggle = value.decode().unwrap();
        assert_eq!(back, Toggle { id: 3, flag: false });
    }

    #[test]
    fn encoded_json_message_decodes() {
        let value = MessageValue::encoded(
            "test.Toggle",
            MessageEncoding::Json,
            &br#"{"id":9,"flag":true}"#[..],
        );
        let back: Toggle = value.decode().unwrap();
        assert_eq!(back, Toggle { id: 9, flag: true });
    }

    #[test]
    fn wrong_type_name_is_invalid_cast() {
        let value = MessageValue::encoded("test.Other", MessageEncoding::Binary, vec![1u8, 1]);
        let result: Result<Toggle> = value.decode();
        assert!(matches!(result, Err(Error::InvalidCast { .. })));
    }

    #[test]
    fn malformed_bytes_is_decode_error() {
        let value = MessageValue::encoded("test.Toggle", MessageEncoding::Binary, vec![1u8]);
        let result: Result<Toggle> = value.decode();
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn encoded_form_does_not_transcode() {
        let value = MessageValue::encoded("test.Toggle", MessageEncoding::Binary, vec![1u8, 1]);
        assert_eq!(
            value.encode(MessageEncoding::Binary).unwrap(),
            Some(Bytes::from_static(&[1, 1]))
        );
        assert_eq!(value.encode(MessageEncoding::Json).unwrap(), None);
    }

    #[test]
    fn live_and_encoded_compare_equal() {
        let live = MessageValue::new(Toggle { id: 1, flag: true });
        let encoded = MessageValue::encoded("test.Toggle", MessageEncoding::Binary, vec![1u8, 1]);
        assert_eq!(live, encoded);
    }
}
