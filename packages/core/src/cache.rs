//! Per-slot, per-type memo for serialized containers.

use std::any::{Any, TypeId};
use std::sync::{Arc, Mutex, PoisonError};

use crate::Result;

/// One decoded value, filled at most once by a successful decode.
type Cell = Arc<Mutex<Option<Arc<dyn Any + Send + Sync>>>>;

type Slot = Vec<(TypeId, Cell)>;

/// Decoded values of a serialized container, keyed by `(slot, requested type)`.
///
/// Every `(slot, type)` pair has its own cell. The cell lock is held across
/// check, decode and store, so concurrent readers of the same pair decode
/// exactly once. The slot lock only guards finding or creating a cell, so
/// readers asking for different types, or different slots, never wait on
/// each other's decodes.
pub(crate) struct ValueCache {
    slots: Box<[Mutex<Slot>]>,
}

impl ValueCache {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| Mutex::new(Vec::new())).collect(),
        }
    }

    fn cell(&self, slot: usize, type_id: TypeId) -> Cell {
        let mut cells = self.slots[slot]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match cells.iter().find(|(id, _)| *id == type_id) {
            Some((_, cell)) => Arc::clone(cell),
            None => {
                let cell = Cell::default();
                cells.push((type_id, Arc::clone(&cell)));
                cell
            }
        }
    }

    /// Return the cached `T` for `slot`, or run `decode` and cache its result.
    ///
    /// Failed decodes are not cached.
    pub(crate) fn get_or_try_insert<T, F>(&self, slot: usize, decode: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<T>,
    {
        let cell = self.cell(slot, TypeId::of::<T>());
        let mut stored = cell.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(value) = stored.as_ref().and_then(|v| v.downcast_ref::<T>()) {
            tracing::trace!(slot, "payload cache hit");
            return Ok(value.clone());
        }

        let value = decode()?;
        *stored = Some(Arc::new(value.clone()));
        Ok(value)
    }

    /// Number of cached types for `slot`.
    #[cfg(test)]
    pub(crate) fn cached_types(&self, slot: usize) -> usize {
        self.slots[slot]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, cell)| {
                cell.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }
}

impl std::fmt::Debug for ValueCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueCache")
            .field("slots", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn second_lookup_is_cached() {
        let cache = ValueCache::new(2);
        let calls = AtomicUsize::new(0);

        let decode = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(41u32 + 1)
        };

        assert_eq!(cache.get_or_try_insert(0, decode).unwrap(), 42);
        assert_eq!(cache.get_or_try_insert(0, decode).unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn types_are_cached_separately() {
        let cache = ValueCache::new(1);

        assert_eq!(cache.get_or_try_insert(0, || Ok(1u8)).unwrap(), 1u8);
        assert_eq!(
            cache.get_or_try_insert(0, || Ok("one".to_string())).unwrap(),
            "one"
        );
        assert_eq!(cache.cached_types(0), 2);
    }

    #[test]
    fn slots_are_independent() {
        let cache = ValueCache::new(2);

        cache.get_or_try_insert(0, || Ok(1i64)).unwrap();
        assert_eq!(cache.cached_types(0), 1);
        assert_eq!(cache.cached_types(1), 0);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = ValueCache::new(1);

        let result: Result<i32> =
            cache.get_or_try_insert(0, || Err(Error::invalid_argument("boom")));
        assert!(result.is_err());
        assert_eq!(cache.cached_types(0), 0);

        assert_eq!(cache.get_or_try_insert(0, || Ok(7i32)).unwrap(), 7);
    }

    #[test]
    fn concurrent_readers_decode_once() {
        let cache = Arc::new(ValueCache::new(1));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    cache
                        .get_or_try_insert(0, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(5));
                            Ok("decoded".to_string())
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "decoded");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn other_types_do_not_wait_on_a_running_decode() {
        let cache = Arc::new(ValueCache::new(1));
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let slow = {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                cache.get_or_try_insert(0, || {
                    started_tx.send(()).unwrap();
                    release_rx
                        .recv_timeout(Duration::from_secs(5))
                        .map_err(|_| Error::invalid_argument("other type was blocked"))?;
                    Ok(1u8)
                })
            })
        };

        started_rx.recv().unwrap();
        // Completes while the u8 decode is still in progress.
        let text = cache.get_or_try_insert(0, || Ok("one".to_string())).unwrap();
        assert_eq!(text, "one");
        release_tx.send(()).unwrap();

        assert_eq!(slow.join().unwrap().unwrap(), 1u8);
        assert_eq!(cache.cached_types(0), 2);
    }
}
