#![forbid(unsafe_code)]

//! Thread-safe bounded cache with least-recently-used eviction.
//!
//! [`BoundedCache`] wraps an [`lru::LruCache`] in a mutex so it can be read
//! from the UI context and written from delivery callbacks alike. Values are
//! returned by clone; store an `Arc` when values are expensive to copy.
//!
//! # Invariants
//!
//! 1. `len() <= capacity()` after every operation.
//! 2. `get` and `put` mark the key most recently used; `contains` does not.
//! 3. Inserting into a full cache evicts exactly the least recently used entry.

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use ahash::RandomState;
use ctabs_core::IllegalArgument;
use ctabs_core::condition::ensure_some;
use lru::LruCache;

/// LRU map of bounded size, safe to share between threads.
pub struct BoundedCache<K, V> {
    entries: Mutex<LruCache<K, V, RandomState>>,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self, IllegalArgument> {
        let capacity = ensure_some(
            NonZeroUsize::new(capacity),
            "The cache capacity must be at least 1",
        )?;
        Ok(Self::with_capacity(capacity))
    }

    #[must_use]
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::with_hasher(capacity, RandomState::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, V, RandomState>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone the value for `key` and mark it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    /// Whether `key` is cached. Does not affect recency.
    pub fn contains(&self, key: &K) -> bool {
        self.lock().contains(key)
    }

    /// Insert or replace `key`. Returns the previous value for the same key.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        self.lock().put(key, value)
    }

    /// Remove `key`, returning its value.
    pub fn pop(&self, key: &K) -> Option<V> {
        self.lock().pop(key)
    }

    /// Remove every entry.
    pub fn evict_all(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }
}

impl<K: Hash + Eq, V> fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("BoundedCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}
