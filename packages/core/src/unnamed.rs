//! Unnamed containers - positional values addressed by index.

use std::fmt;
use std::sync::Arc;

use crate::cache::ValueCache;
use crate::container::ValueContainer;
use crate::entry::{RawValue, UnnamedEntries, UnnamedEntry};
use crate::payload::Payload;
use crate::traits::{PayloadConverter, PayloadConverterExt};
use crate::typed::{FromValue, IntoValue};
use crate::value::{Value, ValueKind};
use crate::{Error, Result};

/// An ordered, index-addressed set of values.
///
/// The count is fixed at construction. Three backings share one interface
/// ([`ValueContainer`]):
///
/// - `Empty`: no values; every access is out of range.
/// - `Instances`: in-memory values, converted to the requested type on access.
/// - `Serialized`: a payload list plus the converter that reads it; values
///   are decoded on first access and cached per `(index, type)`.
///
/// Clones are cheap and share storage, including the decode cache.
#[derive(Clone, Debug, Default)]
pub enum Unnamed {
    #[default]
    Empty,
    Instances(InstanceValues),
    Serialized(SerializedValues),
}

impl Unnamed {
    /// The empty container.
    pub fn empty() -> Self {
        Unnamed::Empty
    }

    /// A container over in-memory values.
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Unnamed::Instances(InstanceValues::new(values))
    }

    /// A container over typed values.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` naming the first element that cannot
    /// be represented as a [`Value`].
    pub fn from_typed<I, T>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: IntoValue,
    {
        let values = values
            .into_iter()
            .enumerate()
            .map(|(index, v)| {
                v.into_value().map_err(|e| {
                    Error::invalid_argument(format!("element {} cannot be converted: {}", index, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(values))
    }

    /// A lazily-decoded container over serialized payloads.
    pub fn from_payloads(
        payloads: impl Into<Arc<[Payload]>>,
        converter: Arc<dyn PayloadConverter>,
    ) -> Self {
        Unnamed::Serialized(SerializedValues::new(payloads, converter))
    }

    /// An entry bound to `index`.
    pub fn entry(&self, index: usize) -> Result<UnnamedEntry> {
        self.check(index)?;
        Ok(UnnamedEntry::new(self.clone(), index))
    }

    /// Entries in index order. Call again to restart.
    pub fn iter(&self) -> UnnamedEntries {
        UnnamedEntries::new(self.clone())
    }

    /// The stored value or payload at `index`, without conversion.
    pub fn raw(&self, index: usize) -> Result<RawValue> {
        match self {
            Unnamed::Empty => Err(out_of_range(index, 0)),
            Unnamed::Instances(values) => values.value(index).cloned().map(RawValue::Value),
            Unnamed::Serialized(values) => values.payload(index).cloned().map(RawValue::Payload),
        }
    }

    /// The shape stored at `index`; `None` for payloads with an unknown encoding.
    pub fn kind(&self, index: usize) -> Result<Option<ValueKind>> {
        Ok(self.raw(index)?.kind())
    }

    fn check(&self, index: usize) -> Result<()> {
        let count = self.len();
        if index < count {
            Ok(())
        } else {
            Err(out_of_range(index, count))
        }
    }
}

impl ValueContainer for Unnamed {
    type Key<'k> = usize;

    fn len(&self) -> usize {
        match self {
            Unnamed::Empty => 0,
            Unnamed::Instances(values) => values.len(),
            Unnamed::Serialized(values) => values.len(),
        }
    }

    fn get_value<T: FromValue>(&self, index: usize) -> Result<T> {
        match self {
            Unnamed::Empty => Err(out_of_range(index, 0)),
            Unnamed::Instances(values) => values.get_value(index),
            Unnamed::Serialized(values) => values.get_value(index),
        }
    }
}

impl PartialEq for Unnamed {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Unnamed::Instances(a), Unnamed::Instances(b)) => a == b,
            (Unnamed::Serialized(a), Unnamed::Serialized(b)) => a == b,
            _ => self.len() == 0 && other.len() == 0,
        }
    }
}

impl<'a> IntoIterator for &'a Unnamed {
    type Item = UnnamedEntry;
    type IntoIter = UnnamedEntries;

    fn into_iter(self) -> UnnamedEntries {
        self.iter()
    }
}

fn out_of_range(index: usize, count: usize) -> Error {
    Error::IndexOutOfRange { index, count }
}

/// In-memory values.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceValues {
    values: Arc<[Value]>,
}

impl InstanceValues {
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The stored value at `index`.
    pub fn value(&self, index: usize) -> Result<&Value> {
        self.values
            .get(index)
            .ok_or_else(|| out_of_range(index, self.values.len()))
    }
}

impl ValueContainer for InstanceValues {
    type Key<'k> = usize;

    fn len(&self) -> usize {
        self.values.len()
    }

    fn get_value<T: FromValue>(&self, index: usize) -> Result<T> {
        T::from_value(self.value(index)?.clone())
    }
}

/// Serialized payloads decoded on demand.
#[derive(Clone)]
pub struct SerializedValues {
    payloads: Arc<[Payload]>,
    converter: Arc<dyn PayloadConverter>,
    cache: Arc<ValueCache>,
}

impl SerializedValues {
    pub fn new(payloads: impl Into<Arc<[Payload]>>, converter: Arc<dyn PayloadConverter>) -> Self {
        let payloads = payloads.into();
        let cache = Arc::new(ValueCache::new(payloads.len()));
        Self {
            payloads,
            converter,
            cache,
        }
    }

    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    /// The payload at `index`.
    pub fn payload(&self, index: usize) -> Result<&Payload> {
        self.payloads
            .get(index)
            .ok_or_else(|| out_of_range(index, self.payloads.len()))
    }

    /// The converter used to decode values.
    pub fn converter(&self) -> &Arc<dyn PayloadConverter> {
        &self.converter
    }
}

impl ValueContainer for SerializedValues {
    type Key<'k> = usize;

    fn len(&self) -> usize {
        self.payloads.len()
    }

    fn get_value<T: FromValue>(&self, index: usize) -> Result<T> {
        let payload = self.payload(index)?;
        self.cache.get_or_try_insert(index, || {
            let request = T::type_request();
            tracing::debug!(index, requested = request.type_name(), "decoding payload");
            self.converter
                .deserialize_value::<T>(std::slice::from_ref(payload))?
                .ok_or_else(|| Error::NoDecoder {
                    requested: request.type_name(),
                    encoding: payload.encoding_label(),
                })
        })
    }
}

impl PartialEq for SerializedValues {
    fn eq(&self, other: &Self) -> bool {
        self.payloads == other.payloads
    }
}

impl fmt::Debug for SerializedValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializedValues")
            .field("payloads", &self.payloads.len())
            .field("converter", &self.converter.name())
            .finish()
    }
}
