//! JSON converter.

use temporal_payload_core::{
    Encoding, Error, Payload, PayloadConverter, PayloadList, Result, Shape, TypeRequest, Value,
};

use crate::single_payload;

/// Serializes `Value::Json` as UTF-8 JSON text tagged `json/plain`.
///
/// Top-level arrays are refused in both directions; positional values belong
/// in an unnamed container, one payload per element.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayloadConverter;

impl PayloadConverter for JsonPayloadConverter {
    fn try_serialize(&self, value: &Value, target: &mut PayloadList) -> Result<bool> {
        let Value::Json(json) = value else {
            return Ok(false);
        };
        if json.is_array() {
            return Ok(false);
        }
        let data =
            serde_json::to_vec(json).map_err(|e| Error::encode(Encoding::JSON, e.to_string()))?;
        target.push(Payload::new(Encoding::JSON, data));
        Ok(true)
    }

    fn try_deserialize(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<Value>> {
        if !request.accepts(Shape::Json) {
            return Ok(None);
        }
        let Some(payload) = single_payload(payloads, &Encoding::JSON) else {
            return Ok(None);
        };

        let json: serde_json::Value = serde_json::from_slice(&payload.data)
            .map_err(|e| Error::decode(Encoding::JSON, e.to_string()))?;
        if json.is_array() {
            return Err(Error::decode(
                Encoding::JSON,
                "top-level arrays are not supported",
            ));
        }
        Ok(Some(Value::Json(json)))
    }
}
