//! The composite converter: an ordered, first-match-wins chain.

use std::sync::{Arc, Weak};

use temporal_payload_core::{
    Error, Named, Payload, PayloadConverter, PayloadList, PayloadMap, Result, TypeRequest, Value,
};

use crate::container::UnnamedContainerPayloadConverter;
use crate::json::JsonPayloadConverter;
use crate::null::NullPayloadConverter;
use crate::options::{ConverterOptions, ProtobufMode};
use crate::protobuf::ProtobufPayloadConverter;
use crate::raw::RawPayloadConverter;
use crate::void::VoidPayloadConverter;

/// Tries each converter in order; the first to accept a value (or a payload
/// list) wins.
///
/// Order encodes precedence: Void and Null must come before the container
/// and JSON converters, or an empty or null payload would be read as
/// something else.
///
/// The chain is immutable once built. Build it with [`CompositeBuilder`],
/// which wires any unnamed-container converter back to the chain itself.
///
/// # Example
///
/// ```rust
/// use temporal_payload_convert::{
///     CompositePayloadConverter, JsonPayloadConverter, NullPayloadConverter,
///     VoidPayloadConverter,
/// };
/// use temporal_payload_core::{PayloadConverterExt, PayloadList, Unnamed, ValueContainer};
///
/// let chain = CompositePayloadConverter::builder()
///     .with(VoidPayloadConverter)
///     .with(NullPayloadConverter)
///     .with_unnamed_container()
///     .with(JsonPayloadConverter)
///     .build();
///
/// let mut payloads = PayloadList::new();
/// let args = Unnamed::from_typed(["hello"]).unwrap();
/// assert!(chain.serialize_value(args, &mut payloads).unwrap());
/// assert_eq!(payloads[0].data.as_ref(), b"\"hello\"");
///
/// let back: Unnamed = chain.deserialize_value(&payloads).unwrap().unwrap();
/// assert_eq!(back.get_value::<String>(0).unwrap(), "hello");
/// ```
pub struct CompositePayloadConverter {
    converters: Vec<Arc<dyn PayloadConverter>>,
    unnamed_container: Option<UnnamedContainerPayloadConverter>,
}

impl CompositePayloadConverter {
    pub fn builder() -> CompositeBuilder {
        CompositeBuilder::new()
    }

    /// Void, Null, Raw, UnnamedContainer, Protobuf (binary), Json.
    pub fn default_chain() -> Arc<Self> {
        Self::from_options(&ConverterOptions::default())
    }

    /// The default chain shaped by `options`.
    pub fn from_options(options: &ConverterOptions) -> Arc<Self> {
        let mut builder = Self::builder()
            .with(VoidPayloadConverter)
            .with(NullPayloadConverter);
        if options.raw_bytes {
            builder = builder.with(RawPayloadConverter);
        }
        builder = builder.with_unnamed_container();
        builder = match options.protobuf {
            ProtobufMode::Binary => builder.with(ProtobufPayloadConverter::binary()),
            ProtobufMode::Json => builder.with(ProtobufPayloadConverter::json()),
            ProtobufMode::Both => builder
                .with(ProtobufPayloadConverter::json())
                .with(ProtobufPayloadConverter::binary()),
        };
        builder.with(JsonPayloadConverter).build()
    }

    /// Number of converters in the chain.
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Converter names in chain order.
    pub fn converter_names(&self) -> Vec<&'static str> {
        self.converters.iter().map(|c| c.name()).collect()
    }

    /// The unnamed-container converter wired into this chain, if any.
    pub fn unnamed_container(&self) -> Option<&UnnamedContainerPayloadConverter> {
        self.unnamed_container.as_ref()
    }

    /// Serialize every value of a named container, one payload per key.
    ///
    /// All-or-nothing: `Ok(None)` if any value has no converter. A value
    /// that serializes to anything other than one payload is an
    /// `Error::InvalidArgument`.
    pub fn serialize_named(&self, named: &Named) -> Result<Option<PayloadMap>> {
        let instances = match named {
            Named::Empty => return Ok(Some(PayloadMap::new())),
            Named::Serialized(serialized) => return Ok(Some(serialized.payloads().clone())),
            Named::Instances(instances) => instances,
        };

        let mut map = PayloadMap::new();
        let mut position = 0;
        while let Some((key, value)) = instances.entry_at(position) {
            let mut payloads = PayloadList::new();
            if !self.try_serialize(value, &mut payloads)? {
                tracing::debug!(key, kind = %value.kind(), "named value has no converter");
                return Ok(None);
            }
            let payload = single(payloads).map_err(|count| {
                Error::invalid_argument(format!(
                    "value for key '{}' must serialize to exactly one payload, got {}",
                    key, count
                ))
            })?;
            map.insert(key, payload)?;
            position += 1;
        }
        Ok(Some(map))
    }
}

fn single(payloads: PayloadList) -> std::result::Result<Payload, usize> {
    match <[Payload; 1]>::try_from(payloads) {
        Ok([payload]) => Ok(payload),
        Err(payloads) => Err(payloads.len()),
    }
}

impl PayloadConverter for CompositePayloadConverter {
    fn try_serialize(&self, value: &Value, target: &mut PayloadList) -> Result<bool> {
        for converter in &self.converters {
            tracing::trace!(
                converter = converter.name(),
                kind = %value.kind(),
                "trying serializer"
            );
            if converter.try_serialize(value, target)? {
                tracing::debug!(
                    converter = converter.name(),
                    kind = %value.kind(),
                    "value serialized"
                );
                return Ok(true);
            }
        }
        tracing::debug!(kind = %value.kind(), "no converter accepted value");
        Ok(false)
    }

    fn try_deserialize(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<Value>> {
        let decoded = self.try_deserialize_attributed(payloads, request)?;
        Ok(decoded.map(|(value, _)| value))
    }

    fn try_deserialize_attributed(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<(Value, &'static str)>> {
        for converter in &self.converters {
            tracing::trace!(
                converter = converter.name(),
                requested = request.type_name(),
                "trying deserializer"
            );
            let decoded = converter
                .try_deserialize_attributed(payloads, request)
                .map_err(|e| Error::deserialize(request.type_name(), converter.name(), e))?;
            if let Some((value, accepted_by)) = decoded {
                tracing::debug!(
                    converter = accepted_by,
                    requested = request.type_name(),
                    "payloads deserialized"
                );
                return Ok(Some((value, accepted_by)));
            }
        }
        tracing::debug!(
            requested = request.type_name(),
            count = payloads.len(),
            "no converter accepted payloads"
        );
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "CompositePayloadConverter"
    }
}

impl std::fmt::Debug for CompositePayloadConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositePayloadConverter")
            .field("converters", &self.converter_names())
            .finish()
    }
}

enum Slot {
    Converter(Arc<dyn PayloadConverter>),
    UnnamedContainer,
}

/// Builds a [`CompositePayloadConverter`] in chain order.
///
/// [`with_unnamed_container`](Self::with_unnamed_container) reserves a slot
/// that `build` fills with a container converter pointing at the finished
/// chain.
#[derive(Default)]
pub struct CompositeBuilder {
    slots: Vec<Slot>,
}

impl CompositeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a converter.
    pub fn with(self, converter: impl PayloadConverter + 'static) -> Self {
        self.with_shared(Arc::new(converter))
    }

    /// Append a converter that is shared with other chains.
    pub fn with_shared(mut self, converter: Arc<dyn PayloadConverter>) -> Self {
        self.slots.push(Slot::Converter(converter));
        self
    }

    /// Append an unnamed-container converter that delegates to this chain.
    pub fn with_unnamed_container(mut self) -> Self {
        self.slots.push(Slot::UnnamedContainer);
        self
    }

    /// Freeze the chain.
    pub fn build(self) -> Arc<CompositePayloadConverter> {
        Arc::new_cyclic(|chain: &Weak<CompositePayloadConverter>| {
            let chain: Weak<dyn PayloadConverter> = chain.clone();
            let mut unnamed_container = None;

            let converters = self
                .slots
                .into_iter()
                .map(|slot| match slot {
                    Slot::Converter(converter) => converter,
                    Slot::UnnamedContainer => {
                        let converter = UnnamedContainerPayloadConverter::new(chain.clone());
                        unnamed_container.get_or_insert_with(|| converter.clone());
                        Arc::new(converter) as Arc<dyn PayloadConverter>
                    }
                })
                .collect();

            CompositePayloadConverter {
                converters,
                unnamed_container,
            }
        })
    }
}
