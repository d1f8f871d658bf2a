//! Raw bytes converter.

use temporal_payload_core::{
    Encoding, Payload, PayloadConverter, PayloadList, Result, Shape, TypeRequest, Value,
};

use crate::single_payload;

/// Carries `Value::Bytes` verbatim as one `binary/plain` payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPayloadConverter;

impl PayloadConverter for RawPayloadConverter {
    fn try_serialize(&self, value: &Value, target: &mut PayloadList) -> Result<bool> {
        let Value::Bytes(bytes) = value else {
            return Ok(false);
        };
        target.push(Payload::new(Encoding::RAW, bytes.clone()));
        Ok(true)
    }

    fn try_deserialize(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<Value>> {
        if !request.accepts(Shape::Bytes) {
            return Ok(None);
        }
        Ok(single_payload(payloads, &Encoding::RAW).map(|p| Value::Bytes(p.data.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{Bytes, BytesMut};
    use std::io::Cursor;
    use temporal_payload_core::PayloadConverterExt;

    #[test]
    fn bytes_are_stored_verbatim() {
        let data = Bytes::from_static(&[0, 159, 146, 150, 255]);
        let mut payloads = PayloadList::new();
        assert!(RawPayloadConverter
            .serialize_value(data.clone(), &mut payloads)
            .unwrap());

        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].data, data);
        assert!(payloads[0].has_encoding(&Encoding::RAW));
    }

    #[test]
    fn any_binary_sequence_reads_back() {
        let data = vec![1u8, 2, 3, 4, 5, 6];
        let payloads = vec![Payload::new(Encoding::RAW, data.clone())];

        let bytes: Bytes = RawPayloadConverter
            .deserialize_value(&payloads)
            .unwrap()
            .unwrap();
        assert_eq!(bytes.len(), data.len());

        let buf: BytesMut = RawPayloadConverter
            .deserialize_value(&payloads)
            .unwrap()
            .unwrap();
        assert_eq!(&buf[..], &data[..]);

        let stream: Cursor<Vec<u8>> = RawPayloadConverter
            .deserialize_value(&payloads)
            .unwrap()
            .unwrap();
        assert_eq!(stream.position(), 0);
        assert_eq!(stream.into_inner(), data);
    }

    #[test]
    fn json_values_are_not_raw() {
        let mut payloads = PayloadList::new();
        assert!(!RawPayloadConverter
            .serialize_value("text", &mut payloads)
            .unwrap());
        assert!(payloads.is_empty());

        let json = vec![Payload::new(Encoding::JSON, &b"\"text\""[..])];
        let back: Option<Bytes> = RawPayloadConverter.deserialize_value(&json).unwrap();
        assert_eq!(back, None);
    }

    #[test]
    fn non_binary_request_is_no_match() {
        let payloads = vec![Payload::new(Encoding::RAW, &b"x"[..])];
        let back: Option<String> = RawPayloadConverter.deserialize_value(&payloads).unwrap();
        assert_eq!(back, None);
    }
}
