//! Protobuf converters, binary and JSON flavours.

use temporal_payload_core::{
    Error, MessageEncoding, MessageValue, Payload, PayloadConverter, PayloadList, Result, Shape,
    TypeRequest, Value, MESSAGE_TYPE_KEY,
};

use crate::single_payload;

/// Serializes `Value::Message` in one wire encoding.
///
/// The payload carries the message type name under `messageType`; decoding
/// keeps the bytes encoded until a concrete message type is requested.
#[derive(Debug, Clone, Copy)]
pub struct ProtobufPayloadConverter {
    encoding: MessageEncoding,
}

impl ProtobufPayloadConverter {
    /// `binary/protobuf`.
    pub const fn binary() -> Self {
        Self {
            encoding: MessageEncoding::Binary,
        }
    }

    /// `json/protobuf`.
    pub const fn json() -> Self {
        Self {
            encoding: MessageEncoding::Json,
        }
    }

    pub fn message_encoding(&self) -> MessageEncoding {
        self.encoding
    }

    /// Type name to decode as: the payload's own tag, checked against the request.
    fn resolve_type_name(&self, payload: &Payload, request: &TypeRequest) -> Result<String> {
        let tagged = payload.message_type();
        match (request.shape(), tagged) {
            (Shape::Message(expected), Some(actual)) if expected != actual => {
                Err(Error::decode(
                    self.encoding.encoding(),
                    format!("payload holds {} but {} was requested", actual, expected),
                ))
            }
            (_, Some(actual)) => Ok(actual.to_string()),
            (Shape::Message(expected), None) => Ok(expected.to_string()),
            (_, None) => Err(Error::decode(
                self.encoding.encoding(),
                format!("payload has no {} metadata", MESSAGE_TYPE_KEY),
            )),
        }
    }
}

impl PayloadConverter for ProtobufPayloadConverter {
    fn try_serialize(&self, value: &Value, target: &mut PayloadList) -> Result<bool> {
        let Value::Message(message) = value else {
            return Ok(false);
        };
        let Some(data) = message.encode(self.encoding)? else {
            return Ok(false);
        };
        let payload = Payload::new(self.encoding.encoding(), data)
            .with_metadata(MESSAGE_TYPE_KEY, message.type_name().to_string());
        target.push(payload);
        Ok(true)
    }

    fn try_deserialize(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<Value>> {
        if !matches!(request.shape(), Shape::Message(_) | Shape::Any) {
            return Ok(None);
        }
        let Some(payload) = single_payload(payloads, &self.encoding.encoding()) else {
            return Ok(None);
        };

        let type_name = self.resolve_type_name(payload, request)?;
        Ok(Some(Value::Message(MessageValue::encoded(
            type_name,
            self.encoding,
            payload.data.clone(),
        ))))
    }

    fn name(&self) -> &'static str {
        match self.encoding {
            MessageEncoding::Binary => "ProtobufPayloadConverter(binary)",
            MessageEncoding::Json => "ProtobufPayloadConverter(json)",
        }
    }
}
