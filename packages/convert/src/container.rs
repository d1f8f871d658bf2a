//! Unnamed container converter.

use std::sync::{Arc, Weak};

use temporal_payload_core::{
    Error, Payload, PayloadConverter, PayloadList, Result, Shape, TypeRequest, Unnamed, Value,
    ValueContainer,
};

/// Serializes an [`Unnamed`] container as one payload per element.
///
/// Each element is handed back to the chain this converter belongs to, so an
/// element may itself be any value the chain understands. Holding the chain
/// weakly lets the chain own this converter without a reference cycle.
#[derive(Clone)]
pub struct UnnamedContainerPayloadConverter {
    chain: Weak<dyn PayloadConverter>,
}

impl UnnamedContainerPayloadConverter {
    pub fn new(chain: Weak<dyn PayloadConverter>) -> Self {
        Self { chain }
    }

    fn chain(&self) -> Result<Arc<dyn PayloadConverter>> {
        self.chain.upgrade().ok_or(Error::ConverterDropped)
    }
}

impl PayloadConverter for UnnamedContainerPayloadConverter {
    fn try_serialize(&self, value: &Value, target: &mut PayloadList) -> Result<bool> {
        let Value::Unnamed(container) = value else {
            return Ok(false);
        };

        let values = match container {
            Unnamed::Empty => return Ok(true),
            Unnamed::Serialized(serialized) => {
                target.extend(serialized.payloads().iter().cloned());
                return Ok(true);
            }
            Unnamed::Instances(instances) => instances.values(),
        };

        let chain = self.chain()?;
        let mut encoded = PayloadList::with_capacity(values.len());
        for (index, element) in values.iter().enumerate() {
            let mut element_payloads = PayloadList::new();
            if !chain.try_serialize(element, &mut element_payloads)? {
                tracing::debug!(
                    index,
                    kind = %element.kind(),
                    "container element has no converter"
                );
                return Ok(false);
            }
            match <[Payload; 1]>::try_from(element_payloads) {
                Ok([payload]) => encoded.push(payload),
                Err(produced) => {
                    return Err(Error::invalid_argument(format!(
                        "container element {} must serialize to exactly one payload, got {}",
                        index,
                        produced.len()
                    )))
                }
            }
        }

        target.extend(encoded);
        Ok(true)
    }

    fn try_deserialize(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<Value>> {
        if request.shape() != Shape::Unnamed {
            return Ok(None);
        }
        let chain = self.chain()?;
        let container = Unnamed::from_payloads(payloads.to_vec(), chain);
        tracing::trace!(count = container.len(), "wrapped payloads in a lazy container");
        Ok(Some(Value::Unnamed(container)))
    }
}

impl std::fmt::Debug for UnnamedContainerPayloadConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnnamedContainerPayloadConverter")
            .field("attached", &(self.chain.strong_count() > 0))
            .finish()
    }
}
