//! Core traits: PayloadConverter and its typed extension.

use crate::payload::{Payload, PayloadList};
use crate::typed::{FromValue, IntoValue, TypeRequest};
use crate::value::Value;
use crate::{Error, Result};

/// Converts values to and from payloads.
///
/// A converter handles a fixed set of value shapes. For anything else it
/// answers "not mine" by returning `Ok(false)` / `Ok(None)`, which lets a
/// composite chain move on to the next converter. `Err` is reserved for an
/// attempt the converter accepted and then could not complete, such as
/// malformed bytes.
///
/// A converter that returns `Ok(false)` must leave `target` unmodified.
///
/// # Object Safety
///
/// This trait is object-safe: chains hold `Arc<dyn PayloadConverter>`.
pub trait PayloadConverter: Send + Sync {
    /// Append the payloads for `value` to `target`.
    fn try_serialize(&self, value: &Value, target: &mut PayloadList) -> Result<bool>;

    /// Produce a value of the requested shape from `payloads`.
    fn try_deserialize(&self, payloads: &[Payload], request: &TypeRequest)
        -> Result<Option<Value>>;

    /// Concrete converter name, used in error reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Like [`try_deserialize`](Self::try_deserialize), but also returns
    /// the name of the converter that accepted the payloads.
    ///
    /// Chains override this to report the inner converter rather than
    /// themselves.
    fn try_deserialize_attributed(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<(Value, &'static str)>> {
        let decoded = self.try_deserialize(payloads, request)?;
        Ok(decoded.map(|value| (value, self.name())))
    }
}

// Blanket implementations for references and smart pointers

impl<T: PayloadConverter + ?Sized> PayloadConverter for &T {
    fn try_serialize(&self, value: &Value, target: &mut PayloadList) -> Result<bool> {
        (**self).try_serialize(value, target)
    }

    fn try_deserialize(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<Value>> {
        (**self).try_deserialize(payloads, request)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn try_deserialize_attributed(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<(Value, &'static str)>> {
        (**self).try_deserialize_attributed(payloads, request)
    }
}

impl<T: PayloadConverter + ?Sized> PayloadConverter for Box<T> {
    fn try_serialize(&self, value: &Value, target: &mut PayloadList) -> Result<bool> {
        (**self).try_serialize(value, target)
    }

    fn try_deserialize(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<Value>> {
        (**self).try_deserialize(payloads, request)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn try_deserialize_attributed(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<(Value, &'static str)>> {
        (**self).try_deserialize_attributed(payloads, request)
    }
}

impl<T: PayloadConverter + ?Sized> PayloadConverter for std::sync::Arc<T> {
    fn try_serialize(&self, value: &Value, target: &mut PayloadList) -> Result<bool> {
        (**self).try_serialize(value, target)
    }

    fn try_deserialize(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<Value>> {
        (**self).try_deserialize(payloads, request)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn try_deserialize_attributed(
        &self,
        payloads: &[Payload],
        request: &TypeRequest,
    ) -> Result<Option<(Value, &'static str)>> {
        (**self).try_deserialize_attributed(payloads, request)
    }
}

/// Typed helpers over any [`PayloadConverter`].
///
/// Automatically implemented for every converter, including trait objects.
pub trait PayloadConverterExt: PayloadConverter {
    /// Convert `value` to a [`Value`] and try to serialize it.
    fn serialize_value<T: IntoValue>(&self, value: T, target: &mut PayloadList) -> Result<bool> {
        let value = value.into_value()?;
        self.try_serialize(&value, target)
    }

    /// Try to deserialize `payloads` into `T`.
    ///
    /// Returns `Ok(None)` when no converter recognizes the payloads. Failures
    /// after a converter accepted them are wrapped in `Error::Deserialize`,
    /// naming `T` and the converter that accepted the payloads, with the
    /// original error as the cause.
    fn deserialize_value<T: FromValue>(&self, payloads: &[Payload]) -> Result<Option<T>> {
        let request = T::type_request();
        let decoded = self
            .try_deserialize_attributed(payloads, &request)
            .map_err(|e| Error::deserialize(request.type_name(), self.name(), e))?;

        match decoded {
            Some((value, accepted_by)) => T::from_value(value)
                .map(Some)
                .map_err(|e| Error::deserialize(request.type_name(), accepted_by, e)),
            None => Ok(None),
        }
    }
}

impl<C: PayloadConverter + ?Sized> PayloadConverterExt for C {}
