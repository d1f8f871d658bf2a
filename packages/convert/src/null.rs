//! Null converter.

use bytes::Bytes;
use temporal_payload_core::{
    Encoding, Payload, PayloadConverter, PayloadList, Result, TypeRequest, Value,
};

use crate::single_payload;

/// Handles `Value::Null` as one `binary/null` payload with empty data.
///
/// Only nullable requests (`Option<T>`, `Value`) can be satisfied; anything
/// else is not a match.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPayloadConverter;

impl PayloadConverter for NullPayloadConverter {
    fn try_serialize(&self, value: &Value, target: &mut PayloadList) -> Result<bool> {
        if !value.is_null() {
            return Ok(false);
        }
        target.push(Payload::new(Encoding::NULL, Bytes::new()));
        Ok(true)
    }

    fn try_deserialize(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<Value>> {
        if !request.accepts_null() {
            return Ok(None);
        }
        Ok(single_payload(payloads, &Encoding::NULL).map(|_| Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temporal_payload_core::{PayloadConverterExt, ENCODING_KEY};

    #[test]
    fn null_roundtrip() {
        let mut payloads = PayloadList::new();
        assert!(NullPayloadConverter
            .serialize_value(None::<String>, &mut payloads)
            .unwrap());

        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].data.is_empty());
        assert_eq!(
            payloads[0].metadata.get(ENCODING_KEY).unwrap().as_ref(),
            b"binary/null"
        );

        let back: Option<Option<String>> = NullPayloadConverter
            .deserialize_value(&payloads)
            .unwrap();
        assert_eq!(back, Some(None));
    }

    #[test]
    fn non_null_value_is_rejected_without_output() {
        let mut payloads = PayloadList::new();
        assert!(!NullPayloadConverter
            .serialize_value(5i32, &mut payloads)
            .unwrap());
        assert!(payloads.is_empty());
    }

    #[test]
    fn non_nullable_request_is_no_match() {
        let payloads = vec![Payload::new(Encoding::NULL, Bytes::new())];
        let back: Option<i32> = NullPayloadConverter.deserialize_value(&payloads).unwrap();
        assert_eq!(back, None);
    }

    #[test]
    fn requires_exactly_one_null_payload() {
        let two = vec![
            Payload::new(Encoding::NULL, Bytes::new()),
            Payload::new(Encoding::NULL, Bytes::new()),
        ];
        let back: Option<Option<i32>> = NullPayloadConverter.deserialize_value(&two).unwrap();
        assert_eq!(back, None);

        let json = vec![Payload::new(Encoding::JSON, &b"null"[..])];
        let back: Option<Option<i32>> = NullPayloadConverter.deserialize_value(&json).unwrap();
        assert_eq!(back, None);
    }
}
