//! Payload conversion for workflow arguments and results.
//!
//! Arguments leave a client as an ordered list of payloads, each tagged with
//! the encoding that produced it, and results come back the same way. This
//! crate bundles the two layers that do the work:
//!
//! - [`model`]: payloads, values, containers and the converter trait
//! - [`convert`]: the concrete converters, the composite chain and [`DataConverter`]
//!
//! Most code only needs the [`prelude`].
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use temporal_payload::prelude::*;
//!
//! #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
//! struct Transfer {
//!     from: String,
//!     to: String,
//!     cents: u64,
//! }
//!
//! let converter = DataConverter::default();
//! let transfer = Transfer { from: "a".into(), to: "b".into(), cents: 250 };
//!
//! let args = Unnamed::new([
//!     Json(transfer.clone()).into_value().unwrap(),
//!     "memo".into_value().unwrap(),
//! ]);
//! let payloads = converter.to_payloads(&args).unwrap();
//!
//! let received = converter.from_payloads(payloads);
//! let Json(back) = received.get_value::<Json<Transfer>>(0).unwrap();
//! assert_eq!(back, transfer);
//! assert_eq!(received.get_value::<String>(1).unwrap(), "memo");
//! ```

pub use temporal_payload_convert as convert;
pub use temporal_payload_core as model;

pub use temporal_payload_convert::{CompositePayloadConverter, ConverterOptions, DataConverter};
pub use temporal_payload_core::{Error, Payload, PayloadList, PayloadMap, Result, Value};

pub mod prelude {
    pub use temporal_payload_convert::{
        CompositeBuilder, CompositePayloadConverter, ConverterOptions, DataConverter,
        JsonPayloadConverter, NullPayloadConverter, ProtobufMode, ProtobufPayloadConverter,
        RawPayloadConverter, UnnamedContainerPayloadConverter, VoidPayloadConverter,
    };
    pub use temporal_payload_core::{
        Encoding, Error, FromValue, IntoValue, Json, Message, MessageError, Named, NamedEntry,
        Payload, PayloadConverter, PayloadConverterExt, PayloadList, PayloadMap, Proto, Result,
        Unnamed, UnnamedEntry, Value, ValueContainer, ValueKind, Void,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn prelude_covers_a_full_roundtrip() {
        let converter = DataConverter::default();
        let named = Named::single("answer", 42u8).unwrap();

        let map = converter.to_payload_map(&named).unwrap();
        let back = converter.from_payload_map(map);
        let entry: NamedEntry = back.entry("answer").unwrap();
        assert_eq!(entry.get_value::<u8>().unwrap(), 42);
        assert_eq!(entry.kind().unwrap(), Some(ValueKind::Json));
    }

    #[test]
    fn layers_are_reachable_by_path() {
        let chain = crate::convert::CompositePayloadConverter::default_chain();
        let payload =
            crate::model::Payload::new(crate::model::Encoding::NULL, crate::model::Bytes::new());
        let value: Option<i32> = chain.deserialize_value(&[payload]).unwrap().unwrap();
        assert_eq!(value, None);
    }
}
