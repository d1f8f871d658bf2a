//! DataConverter - the entry point client code calls.

use std::sync::Arc;

use temporal_payload_core::{
    Error, FromValue, IntoValue, Named, Payload, PayloadConverter, PayloadConverterExt,
    PayloadList, PayloadMap, Result, Unnamed, Value, ValueKind,
};

use crate::composite::CompositePayloadConverter;
use crate::options::ConverterOptions;

/// Turns call arguments into payloads and payloads back into results.
///
/// Wraps a frozen [`CompositePayloadConverter`]. Clones share the chain.
#[derive(Clone, Debug)]
pub struct DataConverter {
    chain: Arc<CompositePayloadConverter>,
}

impl Default for DataConverter {
    fn default() -> Self {
        Self::new(CompositePayloadConverter::default_chain())
    }
}

impl DataConverter {
    pub fn new(chain: Arc<CompositePayloadConverter>) -> Self {
        Self { chain }
    }

    pub fn from_options(options: &ConverterOptions) -> Self {
        Self::new(CompositePayloadConverter::from_options(options))
    }

    /// The chain this converter dispatches to.
    pub fn chain(&self) -> &Arc<CompositePayloadConverter> {
        &self.chain
    }

    /// Serialize positional arguments, one payload per element.
    pub fn to_payloads(&self, values: &Unnamed) -> Result<PayloadList> {
        self.serialize(Value::Unnamed(values.clone()))
    }

    /// Serialize a single value.
    pub fn to_payload<T: IntoValue>(&self, value: T) -> Result<PayloadList> {
        self.serialize(value.into_value()?)
    }

    fn serialize(&self, value: Value) -> Result<PayloadList> {
        let mut payloads = PayloadList::new();
        if self.chain.try_serialize(&value, &mut payloads)? {
            Ok(payloads)
        } else {
            Err(Error::NoConverter { kind: value.kind() })
        }
    }

    /// Wrap payloads in a container that decodes each element on first access.
    pub fn from_payloads(&self, payloads: PayloadList) -> Unnamed {
        Unnamed::from_payloads(payloads, self.shared_chain())
    }

    /// Decode payloads into a single `T` right away.
    pub fn from_payloads_as<T: FromValue>(&self, payloads: &[Payload]) -> Result<T> {
        self.chain
            .deserialize_value::<T>(payloads)?
            .ok_or_else(|| Error::NoDecoder {
                requested: T::type_request().type_name(),
                encoding: encodings(payloads),
            })
    }

    /// Serialize a named container, one payload per key.
    pub fn to_payload_map(&self, values: &Named) -> Result<PayloadMap> {
        self.chain
            .serialize_named(values)?
            .ok_or(Error::NoConverter {
                kind: ValueKind::Named,
            })
    }

    /// Wrap a payload map in a lazily decoded named container.
    pub fn from_payload_map(&self, payloads: PayloadMap) -> Named {
        Named::from_payloads(payloads, self.shared_chain())
    }

    fn shared_chain(&self) -> Arc<dyn PayloadConverter> {
        self.chain.clone()
    }
}

fn encodings(payloads: &[Payload]) -> String {
    if payloads.is_empty() {
        return "<no payloads>".to_string();
    }
    payloads
        .iter()
        .map(|p| {
            p.encoding()
                .map(|e| e.as_str().to_string())
                .unwrap_or_else(|| "<none>".to_string())
        })
        .collect::<Vec<_>>()
        .join(", ")
}
