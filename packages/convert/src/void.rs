//! Void converter.

use temporal_payload_core::{
    Payload, PayloadConverter, PayloadList, Result, Shape, TypeRequest, Value,
};

/// Handles `Value::Void`: zero payloads in, zero payloads out.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoidPayloadConverter;

impl PayloadConverter for VoidPayloadConverter {
    fn try_serialize(&self, value: &Value, _target: &mut PayloadList) -> Result<bool> {
        Ok(value.is_void())
    }

    fn try_deserialize(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<Value>> {
        if request.accepts(Shape::Void) && payloads.is_empty() {
            Ok(Some(Value::Void))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temporal_payload_core::{Encoding, FromValue, PayloadConverterExt, Void};

    #[test]
    fn void_serializes_to_nothing() {
        let mut payloads = PayloadList::new();
        assert!(VoidPayloadConverter
            .serialize_value(Void, &mut payloads)
            .unwrap());
        assert!(payloads.is_empty());
    }

    #[test]
    fn other_values_are_not_void() {
        let mut payloads = PayloadList::new();
        assert!(!VoidPayloadConverter
            .try_serialize(&Value::Null, &mut payloads)
            .unwrap());
        assert!(payloads.is_empty());
    }

    #[test]
    fn deserializes_only_empty_lists() {
        let back: Option<Void> = VoidPayloadConverter.deserialize_value(&[]).unwrap();
        assert_eq!(back, Some(Void));

        let one = vec![Payload::new(Encoding::NULL, bytes::Bytes::new())];
        let back: Option<Void> = VoidPayloadConverter.deserialize_value(&one).unwrap();
        assert_eq!(back, None);
    }

    #[test]
    fn non_void_request_is_no_match() {
        let result = VoidPayloadConverter
            .try_deserialize(&[], &String::type_request())
            .unwrap();
        assert!(result.is_none());
    }
}
