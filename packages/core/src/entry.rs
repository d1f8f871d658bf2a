//! Entries - one container slot viewed on its own.

use crate::container::ValueContainer;
use crate::named::Named;
use crate::payload::Payload;
use crate::typed::FromValue;
use crate::unnamed::Unnamed;
use crate::value::{Value, ValueKind};
use crate::{Error, Result};

/// What a container slot holds before any conversion.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    /// An in-memory value.
    Value(Value),
    /// A payload not yet decoded.
    Payload(Payload),
}

impl RawValue {
    /// The shape held; for payloads, inferred from the encoding tag.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            RawValue::Value(v) => Some(v.kind()),
            RawValue::Payload(p) => p.encoding().and_then(|e| e.kind()),
        }
    }
}

/// One slot of an [`Unnamed`] container.
///
/// A default entry has no container and every accessor fails with
/// `Error::InvalidEntry`, as does an entry whose index is past the end.
#[derive(Clone, Debug, Default)]
pub struct UnnamedEntry {
    container: Option<Unnamed>,
    index: usize,
}

impl UnnamedEntry {
    pub fn new(container: Unnamed, index: usize) -> Self {
        Self {
            container: Some(container),
            index,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    fn container(&self) -> Result<&Unnamed> {
        match &self.container {
            Some(c) if self.index < c.len() => Ok(c),
            Some(c) => Err(Error::invalid_entry(format!(
                "index {} is out of range for a container of {} values",
                self.index,
                c.len()
            ))),
            None => Err(Error::invalid_entry("entry has no container")),
        }
    }

    /// The stored value or payload.
    pub fn raw(&self) -> Result<RawValue> {
        self.container()?.raw(self.index)
    }

    /// The shape stored in this slot.
    pub fn kind(&self) -> Result<Option<ValueKind>> {
        Ok(self.raw()?.kind())
    }

    /// The value as `T`.
    pub fn get_value<T: FromValue>(&self) -> Result<T> {
        self.container()?.get_value(self.index)
    }
}

/// One slot of a [`Named`] container.
#[derive(Clone, Debug, Default)]
pub struct NamedEntry {
    container: Option<Named>,
    key: String,
}

impl NamedEntry {
    pub fn new(container: Named, key: impl Into<String>) -> Self {
        Self {
            container: Some(container),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn container(&self) -> Result<&Named> {
        match &self.container {
            Some(c) if c.contains_key(&self.key) => Ok(c),
            Some(_) => Err(Error::invalid_entry(format!(
                "key '{}' is not in the container",
                self.key
            ))),
            None => Err(Error::invalid_entry("entry has no container")),
        }
    }

    pub fn raw(&self) -> Result<RawValue> {
        self.container()?.raw(&self.key)
    }

    pub fn kind(&self) -> Result<Option<ValueKind>> {
        Ok(self.raw()?.kind())
    }

    pub fn get_value<T: FromValue>(&self) -> Result<T> {
        self.container()?.get_value(self.key.as_str())
    }
}

/// Entries of an [`Unnamed`] container in index order.
#[derive(Clone, Debug)]
pub struct UnnamedEntries {
    container: Unnamed,
    front: usize,
    back: usize,
}

impl UnnamedEntries {
    pub(crate) fn new(container: Unnamed) -> Self {
        let back = container.len();
        Self {
            container,
            front: 0,
            back,
        }
    }
}

impl Iterator for UnnamedEntries {
    type Item = UnnamedEntry;

    fn next(&mut self) -> Option<UnnamedEntry> {
        if self.front >= self.back {
            return None;
        }
        let entry = UnnamedEntry::new(self.container.clone(), self.front);
        self.front += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for UnnamedEntries {
    fn next_back(&mut self) -> Option<UnnamedEntry> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(UnnamedEntry::new(self.container.clone(), self.back))
    }
}

impl ExactSizeIterator for UnnamedEntries {}

/// Entries of a [`Named`] container in insertion order.
#[derive(Clone, Debug)]
pub struct NamedEntries {
    container: Named,
    next: usize,
}

impl NamedEntries {
    pub(crate) fn new(container: Named) -> Self {
        Self { container, next: 0 }
    }
}

impl Iterator for NamedEntries {
    type Item = NamedEntry;

    fn next(&mut self) -> Option<NamedEntry> {
        let key = self.container.key_at(self.next)?.to_string();
        self.next += 1;
        Some(NamedEntry::new(self.container.clone(), key))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.container.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for NamedEntries {}
