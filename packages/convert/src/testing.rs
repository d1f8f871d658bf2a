//! Test message shared by the converter unit tests.

use temporal_payload_core::{Message, MessageError};

/// Encoded as `[x, y]` in binary and `{"x":..,"y":..}` in JSON.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Point {
    pub x: u8,
    pub y: u8,
}

impl Message for Point {
    fn type_name() -> &'static str {
        "test.Point"
    }

    fn encode_binary(&self) -> Vec<u8> {
        vec![self.x, self.y]
    }

    fn decode_binary(bytes: &[u8]) -> Result<Self, MessageError> {
        match bytes {
            [x, y] => Ok(Point { x: *x, y: *y }),
            _ => Err(format!("expected 2 bytes, got {}", bytes.len()).into()),
        }
    }

    fn encode_json(&self) -> Result<Vec<u8>, MessageError> {
        Ok(serde_json::to_vec(&serde_json::json!({"x": self.x, "y": self.y}))?)
    }

    fn decode_json(bytes: &[u8]) -> Result<Self, MessageError> {
        let json: serde_json::Value = serde_json::from_slice(bytes)?;
        let x = json["x"].as_u64().ok_or("missing x")? as u8;
        let y = json["y"].as_u64().ok_or("missing y")? as u8;
        Ok(Point { x, y })
    }
}
