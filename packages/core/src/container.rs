//! The capability shared by every value container.

use crate::typed::FromValue;
use crate::Result;

/// Read access to a fixed set of values addressed by `Key`.
///
/// Implemented by each backing variant (in-memory instances, serialized
/// payloads) and by the [`Unnamed`](crate::Unnamed) / [`Named`](crate::Named)
/// enums that select between them.
pub trait ValueContainer {
    /// Index (`usize`) or key (`&str`).
    type Key<'k>: Copy;

    /// Number of values. Fixed at construction.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the value at `key` as `T`.
    ///
    /// # Errors
    ///
    /// - `Error::IndexOutOfRange` / `Error::KeyNotFound` if nothing is stored there
    /// - `Error::InvalidCast` if the value cannot be converted to `T`
    /// - `Error::Deserialize` if the payload at `key` cannot be decoded
    fn get_value<T: FromValue>(&self, key: Self::Key<'_>) -> Result<T>;

    /// Like [`get_value`](Self::get_value), but a missing index or key is `Ok(None)`.
    fn try_get_value<T: FromValue>(&self, key: Self::Key<'_>) -> Result<Option<T>> {
        match self.get_value(key) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
