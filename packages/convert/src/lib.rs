//! Payload converters
//!
//! This layer turns [`Value`]s into payloads and back. It adds:
//! - Primitive converters, each owning one value shape: [`VoidPayloadConverter`],
//!   [`NullPayloadConverter`], [`RawPayloadConverter`], [`ProtobufPayloadConverter`],
//!   [`JsonPayloadConverter`]
//! - [`UnnamedContainerPayloadConverter`]: one payload per container element,
//!   delegating each element back to the chain it belongs to
//! - [`CompositePayloadConverter`]: an ordered, first-match-wins chain
//! - [`DataConverter`]: the entry point for client code
//!
//! # Example
//!
//! ```rust
//! use temporal_payload_convert::DataConverter;
//! use temporal_payload_core::{Unnamed, ValueContainer};
//!
//! let converter = DataConverter::default();
//!
//! let args = Unnamed::from_typed(["hello"]).unwrap();
//! let payloads = converter.to_payloads(&args).unwrap();
//! assert_eq!(payloads.len(), 1);
//!
//! let decoded = converter.from_payloads(payloads);
//! assert_eq!(decoded.get_value::<String>(0).unwrap(), "hello");
//! ```

use temporal_payload_core::{Encoding, Payload};

mod composite;
mod container;
mod data_converter;
mod json;
mod null;
mod options;
mod protobuf;
mod raw;
mod void;

#[cfg(test)]
mod testing;

pub use composite::{CompositeBuilder, CompositePayloadConverter};
pub use container::UnnamedContainerPayloadConverter;
pub use data_converter::DataConverter;
pub use json::JsonPayloadConverter;
pub use null::NullPayloadConverter;
pub use options::{ConverterOptions, ProtobufMode};
pub use protobuf::ProtobufPayloadConverter;
pub use raw::RawPayloadConverter;
pub use void::VoidPayloadConverter;

// Re-export core types for convenience
pub use temporal_payload_core::{
    Error, FromValue, IntoValue, PayloadConverter, PayloadConverterExt, PayloadList, Result,
    TypeRequest, Value,
};

/// The only payload in `payloads`, if there is exactly one and it carries `encoding`.
pub(crate) fn single_payload<'a>(
    payloads: &'a [Payload],
    encoding: &Encoding,
) -> Option<&'a Payload> {
    match payloads {
        [payload] if payload.has_encoding(encoding) => Some(payload),
        _ => None,
    }
}
