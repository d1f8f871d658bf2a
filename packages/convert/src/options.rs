//! Converter configuration.

use serde::Deserialize;
use temporal_payload_core::{Error, Result};

/// Which protobuf encodings the chain registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtobufMode {
    /// `binary/protobuf` only.
    #[default]
    Binary,
    /// `json/protobuf` only.
    Json,
    /// Both; messages serialize as `json/protobuf`, either decodes.
    Both,
}

/// Options for building the default converter chain.
///
/// ```rust
/// use temporal_payload_convert::{ConverterOptions, ProtobufMode};
///
/// let options = ConverterOptions::from_json_str(r#"{"protobuf": "both"}"#).unwrap();
/// assert_eq!(options.protobuf, ProtobufMode::Both);
/// assert!(options.raw_bytes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterOptions {
    pub protobuf: ProtobufMode,
    /// Register the raw bytes converter.
    pub raw_bytes: bool,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            protobuf: ProtobufMode::default(),
            raw_bytes: true,
        }
    }
}

impl ConverterOptions {
    /// Parse options from JSON text. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| Error::invalid_argument(format!("invalid converter options: {}", e)))
    }
}
