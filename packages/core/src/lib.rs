//! Core payload layer
//!
//! This layer defines what crosses the wire and how typed values are held
//! before and after conversion:
//! - `Payload` / `PayloadList` / `PayloadMap`: the wire units
//! - `Encoding`: the metadata tag naming which converter produced a payload
//! - `Value`: a tagged union over every shape the converters understand
//! - `IntoValue` / `FromValue`: typed conversion into and out of `Value`
//! - `PayloadConverter`: the try-serialize / try-deserialize contract
//! - `Unnamed` / `Named`: index- and key-addressed value containers
//!
//! Concrete converters live in `temporal-payload-convert`.
//!
//! # Example
//!
//! ```rust
//! use temporal_payload_core::{Unnamed, ValueContainer};
//!
//! let args = Unnamed::from_typed(["hello".to_string()]).unwrap();
//! assert_eq!(args.len(), 1);
//!
//! let first: String = args.get_value(0).unwrap();
//! assert_eq!(first, "hello");
//! ```

pub use bytes::Bytes;

mod cache;
mod container;
mod encoding;
mod entry;
mod error;
mod message;
mod named;
mod payload;
mod traits;
mod typed;
mod unnamed;
mod value;

pub use container::ValueContainer;
pub use encoding::{Encoding, ENCODING_KEY, MESSAGE_TYPE_KEY};
pub use entry::{NamedEntries, NamedEntry, RawValue, UnnamedEntries, UnnamedEntry};
pub use error::{Error, Result};
pub use message::{Message, MessageEncoding, MessageError, MessageValue};
pub use named::{Named, NamedInstances, SerializedNamedValues};
pub use payload::{Payload, PayloadList, PayloadMap};
pub use traits::{PayloadConverter, PayloadConverterExt};
pub use typed::{FromValue, IntoValue, Json, Proto, Shape, TypeRequest, Void};
pub use unnamed::{InstanceValues, SerializedValues, Unnamed};
pub use value::{Value, ValueKind};
