//! Named containers - values addressed by unique string keys.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::cache::ValueCache;
use crate::container::ValueContainer;
use crate::entry::{NamedEntries, NamedEntry, RawValue};
use crate::payload::{Payload, PayloadMap};
use crate::traits::{PayloadConverter, PayloadConverterExt};
use crate::typed::{FromValue, IntoValue};
use crate::value::{Value, ValueKind};
use crate::{Error, Result};

/// A set of values addressed by non-empty, unique keys.
///
/// Key comparison is exact and case-sensitive. Iteration follows insertion
/// order. The backings mirror [`Unnamed`](crate::Unnamed): `Empty`,
/// in-memory `Instances`, and lazily-decoded `Serialized` payloads.
#[derive(Clone, Debug, Default)]
pub enum Named {
    #[default]
    Empty,
    Instances(NamedInstances),
    Serialized(SerializedNamedValues),
}

impl Named {
    /// The empty container.
    pub fn empty() -> Self {
        Named::Empty
    }

    /// A single-key container.
    pub fn single(name: impl Into<String>, value: impl IntoValue) -> Result<Self> {
        let value = value.into_value()?;
        Ok(Named::Instances(NamedInstances::single(name, value)?))
    }

    /// A two-key container. The keys must differ.
    pub fn pair(
        name1: impl Into<String>,
        value1: impl IntoValue,
        name2: impl Into<String>,
        value2: impl IntoValue,
    ) -> Result<Self> {
        let value1 = value1.into_value()?;
        let value2 = value2.into_value()?;
        Ok(Named::Instances(NamedInstances::pair(
            name1, value1, name2, value2,
        )?))
    }

    /// A container over typed entries. No entries gives `Named::Empty`.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for an empty or duplicate key, or a value that
    /// cannot be represented as a [`Value`].
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoValue,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| {
                let key = k.into();
                v.into_value().map(|value| (key, value)).map_err(|e| {
                    Error::invalid_argument(format!("value cannot be converted: {}", e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if entries.is_empty() {
            return Ok(Named::Empty);
        }
        Ok(Named::Instances(NamedInstances::from_entries(entries)?))
    }

    /// A lazily-decoded container over serialized payloads.
    pub fn from_payloads(payloads: PayloadMap, converter: Arc<dyn PayloadConverter>) -> Self {
        Named::Serialized(SerializedNamedValues::new(payloads, converter))
    }

    /// Key at an insertion position.
    pub fn key_at(&self, position: usize) -> Option<&str> {
        match self {
            Named::Empty => None,
            Named::Instances(values) => values.entry_at(position).map(|(k, _)| k),
            Named::Serialized(values) => values.payloads.get_index(position).map(|(k, _)| k),
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.len()).filter_map(move |i| self.key_at(i))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        match self {
            Named::Empty => false,
            Named::Instances(values) => values.position(key).is_some(),
            Named::Serialized(values) => values.payloads.position(key).is_some(),
        }
    }

    /// An entry bound to `key`.
    pub fn entry(&self, key: &str) -> Result<NamedEntry> {
        if !self.contains_key(key) {
            return Err(not_found(key, self.len()));
        }
        Ok(NamedEntry::new(self.clone(), key))
    }

    /// Entries in insertion order. Call again to restart.
    pub fn iter(&self) -> NamedEntries {
        NamedEntries::new(self.clone())
    }

    /// The stored value or payload under `key`, without conversion.
    pub fn raw(&self, key: &str) -> Result<RawValue> {
        match self {
            Named::Empty => Err(not_found(key, 0)),
            Named::Instances(values) => values.value(key).cloned().map(RawValue::Value),
            Named::Serialized(values) => values.payload(key).cloned().map(RawValue::Payload),
        }
    }

    /// The shape stored under `key`; `None` for payloads with an unknown encoding.
    pub fn kind(&self, key: &str) -> Result<Option<ValueKind>> {
        Ok(self.raw(key)?.kind())
    }
}

impl ValueContainer for Named {
    type Key<'k> = &'k str;

    fn len(&self) -> usize {
        match self {
            Named::Empty => 0,
            Named::Instances(values) => values.len(),
            Named::Serialized(values) => values.len(),
        }
    }

    fn get_value<T: FromValue>(&self, key: &str) -> Result<T> {
        match self {
            Named::Empty => Err(not_found(key, 0)),
            Named::Instances(values) => values.get_value(key),
            Named::Serialized(values) => values.get_value(key),
        }
    }
}

impl PartialEq for Named {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Named::Instances(a), Named::Instances(b)) => a == b,
            (Named::Serialized(a), Named::Serialized(b)) => a == b,
            _ => self.len() == 0 && other.len() == 0,
        }
    }
}

impl<'a> IntoIterator for &'a Named {
    type Item = NamedEntry;
    type IntoIter = NamedEntries;

    fn into_iter(self) -> NamedEntries {
        self.iter()
    }
}

fn not_found(key: &str, count: usize) -> Error {
    Error::KeyNotFound {
        key: key.to_string(),
        count,
    }
}

fn duplicate(key: &str) -> Error {
    Error::invalid_argument(format!("duplicate container key '{}'", key))
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        Err(Error::invalid_argument("container keys must not be empty"))
    } else {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Slots {
    One(Arc<(String, Value)>),
    Two(Arc<[(String, Value); 2]>),
    Many(Arc<IndexMap<String, Value>>),
}

/// In-memory keyed values.
///
/// One- and two-key containers (the common case for keyword arguments) are
/// stored inline without a lookup table.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedInstances {
    slots: Slots,
}

impl NamedInstances {
    pub fn single(name: impl Into<String>, value: Value) -> Result<Self> {
        let name = name.into();
        check_key(&name)?;
        Ok(Self {
            slots: Slots::One(Arc::new((name, value))),
        })
    }

    pub fn pair(
        name1: impl Into<String>,
        value1: Value,
        name2: impl Into<String>,
        value2: Value,
    ) -> Result<Self> {
        let name1 = name1.into();
        let name2 = name2.into();
        check_key(&name1)?;
        check_key(&name2)?;
        if name1 == name2 {
            return Err(duplicate(&name1));
        }
        Ok(Self {
            slots: Slots::Two(Arc::new([(name1, value1), (name2, value2)])),
        })
    }

    /// Any number of entries, validated for empty and duplicate keys.
    pub fn from_entries(entries: Vec<(String, Value)>) -> Result<Self> {
        let mut map = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            check_key(&key)?;
            match map.entry(key) {
                indexmap::map::Entry::Occupied(entry) => return Err(duplicate(entry.key())),
                indexmap::map::Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }

        let slots = if map.len() > 2 {
            Slots::Many(Arc::new(map))
        } else {
            let mut entries = map.into_iter();
            match (entries.next(), entries.next()) {
                (Some(first), Some(second)) => Slots::Two(Arc::new([first, second])),
                (Some(only), None) => Slots::One(Arc::new(only)),
                (None, _) => Slots::Many(Arc::new(IndexMap::new())),
            }
        };
        Ok(Self { slots })
    }

    /// Entry at an insertion position.
    pub fn entry_at(&self, position: usize) -> Option<(&str, &Value)> {
        let (key, value) = match &self.slots {
            Slots::One(entry) if position == 0 => (&entry.0, &entry.1),
            Slots::One(_) => return None,
            Slots::Two(entries) => entries.get(position).map(|(k, v)| (k, v))?,
            Slots::Many(entries) => entries.get_index(position)?,
        };
        Some((key.as_str(), value))
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        match &self.slots {
            Slots::One(entry) => (entry.0 == key).then_some(0),
            Slots::Two(entries) => entries.iter().position(|(k, _)| k == key),
            Slots::Many(entries) => entries.get_index_of(key),
        }
    }

    /// The stored value under `key`.
    pub fn value(&self, key: &str) -> Result<&Value> {
        let found = match &self.slots {
            Slots::Many(entries) => entries.get(key),
            _ => self
                .position(key)
                .and_then(|i| self.entry_at(i))
                .map(|(_, v)| v),
        };
        found.ok_or_else(|| not_found(key, self.len()))
    }
}

impl ValueContainer for NamedInstances {
    type Key<'k> = &'k str;

    fn len(&self) -> usize {
        match &self.slots {
            Slots::One(_) => 1,
            Slots::Two(_) => 2,
            Slots::Many(entries) => entries.len(),
        }
    }

    fn get_value<T: FromValue>(&self, key: &str) -> Result<T> {
        T::from_value(self.value(key)?.clone())
    }
}

/// Serialized keyed payloads decoded on demand.
#[derive(Clone)]
pub struct SerializedNamedValues {
    payloads: Arc<PayloadMap>,
    converter: Arc<dyn PayloadConverter>,
    cache: Arc<ValueCache>,
}

impl SerializedNamedValues {
    pub fn new(payloads: PayloadMap, converter: Arc<dyn PayloadConverter>) -> Self {
        let cache = Arc::new(ValueCache::new(payloads.len()));
        Self {
            payloads: Arc::new(payloads),
            converter,
            cache,
        }
    }

    pub fn payloads(&self) -> &PayloadMap {
        &self.payloads
    }

    /// The payload under `key`.
    pub fn payload(&self, key: &str) -> Result<&Payload> {
        self.payloads
            .get(key)
            .ok_or_else(|| not_found(key, self.payloads.len()))
    }

    pub fn converter(&self) -> &Arc<dyn PayloadConverter> {
        &self.converter
    }
}

impl ValueContainer for SerializedNamedValues {
    type Key<'k> = &'k str;

    fn len(&self) -> usize {
        self.payloads.len()
    }

    fn get_value<T: FromValue>(&self, key: &str) -> Result<T> {
        let position = self
            .payloads
            .position(key)
            .ok_or_else(|| not_found(key, self.payloads.len()))?;
        let payload = self.payload(key)?;

        self.cache.get_or_try_insert(position, || {
            let request = T::type_request();
            tracing::debug!(key, requested = request.type_name(), "decoding payload");
            self.converter
                .deserialize_value::<T>(std::slice::from_ref(payload))?
                .ok_or_else(|| Error::NoDecoder {
                    requested: request.type_name(),
                    encoding: payload.encoding_label(),
                })
        })
    }
}

impl PartialEq for SerializedNamedValues {
    fn eq(&self, other: &Self) -> bool {
        self.payloads == other.payloads
    }
}

impl fmt::Debug for SerializedNamedValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializedNamedValues")
            .field("keys", &self.payloads.keys().collect::<Vec<_>>())
            .field("converter", &self.converter.name())
            .finish()
    }
}
