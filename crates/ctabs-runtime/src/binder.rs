#![forbid(unsafe_code)]

//! Asynchronous data binding with caching and cancellation.
//!
//! A [`DataBinder`] resolves a key to data and hands the result to a target
//! (typically a view handle). Cached data is applied synchronously; missing
//! data is computed on the worker executor and delivered back on the UI
//! executor. Each `load` call yields at most one outcome.
//!
//! ```text
//! load ──▶ listener veto? ──yes──▶ (nothing)
//!            │ no
//!            ▼
//!        cache hit? ──yes──▶ apply + on_finished           (synchronous)
//!            │ no
//!            ▼
//!        before_compute ──▶ worker: compute ──▶ ui: deliver
//!                                                 │
//!                               canceled? ──yes──▶ (dropped)
//!                                                 │ no
//!                                                 ▼
//!                                  cache Some(data), apply, on_finished
//! ```
//!
//! # Invariants
//!
//! 1. `load` clears the cancellation flag before anything else.
//! 2. A cache hit never invokes [`DataLoader::compute`].
//! 3. After [`DataBinder::cancel`], a pending delivery fires neither `apply`
//!    nor `on_finished`; `on_canceled` fires once per `cancel` call.
//! 4. Only produced data (`Some`) is cached; `None` is delivered but not stored.
//! 5. Concurrent loads of the same key are not de-duplicated; the last
//!    delivery wins the cache slot.
//!
//! # Failure Modes
//!
//! - A panicking `compute` is handled by the worker executor. The binder state
//!   is unaffected and no outcome is delivered for that request.
//! - The cancellation flag is shared by all requests of one binder, so a new
//!   `load` revives deliveries of earlier, canceled requests still in flight.

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use ctabs_core::IllegalArgument;
use ctabs_core::condition::ensure_some;

use crate::cache::BoundedCache;
use crate::executor::SharedExecutor;

/// Cache size used by [`DataBinder::new`].
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CACHE_CAPACITY) {
    Some(capacity) => capacity,
    None => panic!("default cache capacity must be non-zero"),
};

/// Computation and presentation hooks of a [`DataBinder`].
pub trait DataLoader: Send + Sync + 'static {
    /// Cache key.
    type Key: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static;
    /// Computed value. Cloned out of the cache on hits.
    type Data: Clone + Send + 'static;
    /// Receiver of the data, moved through the worker and back.
    type Target: Send + 'static;
    /// Immutable per-request parameters, shared by both contexts.
    type Params: Send + Sync + 'static;

    /// Produce the data for `key`. Runs on the worker executor.
    fn compute(&self, key: &Self::Key, params: &Self::Params) -> Option<Self::Data>;

    /// Runs on the UI context before a computation is scheduled.
    fn before_compute(&self, _key: &Self::Key, _target: &mut Self::Target, _params: &Self::Params) {
    }

    /// Present the outcome on the UI context. `data` is `None` when the
    /// computation produced nothing.
    fn apply(
        &self,
        _key: &Self::Key,
        _data: Option<&Self::Data>,
        _target: &mut Self::Target,
        _params: &Self::Params,
    ) {
    }
}

/// Observer of a binder's requests.
pub trait BinderListener<L: DataLoader>: Send + Sync {
    /// Called at the start of every `load`. Returning `false` abandons the
    /// request silently.
    fn on_load(
        &self,
        _binder: &DataBinder<L>,
        _key: &L::Key,
        _target: &L::Target,
        _params: &L::Params,
    ) -> bool {
        true
    }

    /// Called after `apply` with the same outcome.
    fn on_finished(
        &self,
        _binder: &DataBinder<L>,
        _key: &L::Key,
        _data: Option<&L::Data>,
        _target: &L::Target,
        _params: &L::Params,
    ) {
    }

    /// Called synchronously from [`DataBinder::cancel`].
    fn on_canceled(&self, _binder: &DataBinder<L>) {}
}

/// Construction options for a [`DataBinder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinderConfig {
    /// Maximum number of cached entries. Must be at least 1.
    pub cache_capacity: usize,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl BinderConfig {
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

/// A listener shared between binder handles.
pub type SharedListener<L> = Arc<dyn BinderListener<L>>;

struct Inner<L: DataLoader> {
    loader: L,
    cache: BoundedCache<L::Key, L::Data>,
    ui: SharedExecutor,
    worker: SharedExecutor,
    canceled: AtomicBool,
    listener: RwLock<Option<SharedListener<L>>>,
}

/// Resolves keys to data via cache or background computation.
///
/// Cloning is cheap and yields a handle to the same binder.
pub struct DataBinder<L: DataLoader> {
    inner: Arc<Inner<L>>,
}

impl<L: DataLoader> Clone for DataBinder<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: DataLoader> DataBinder<L> {
    /// Create a binder with [`BinderConfig::default`].
    #[must_use]
    pub fn new(loader: L, ui: SharedExecutor, worker: SharedExecutor) -> Self {
        Self::build(loader, ui, worker, DEFAULT_CAPACITY)
    }

    pub fn with_config(
        loader: L,
        ui: SharedExecutor,
        worker: SharedExecutor,
        config: BinderConfig,
    ) -> Result<Self, IllegalArgument> {
        let capacity = ensure_some(
            NonZeroUsize::new(config.cache_capacity),
            "The cache capacity must be at least 1",
        )?;
        Ok(Self::build(loader, ui, worker, capacity))
    }

    fn build(loader: L, ui: SharedExecutor, worker: SharedExecutor, capacity: NonZeroUsize) -> Self {
        Self {
            inner: Arc::new(Inner {
                loader,
                cache: BoundedCache::with_capacity(capacity),
                ui,
                worker,
                canceled: AtomicBool::new(false),
                listener: RwLock::new(None),
            }),
        }
    }

    #[must_use]
    pub fn loader(&self) -> &L {
        &self.inner.loader
    }

    #[must_use]
    pub fn listener(&self) -> Option<SharedListener<L>> {
        self.inner
            .listener
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the listener; `None` removes it.
    pub fn set_listener(&self, listener: Option<SharedListener<L>>) {
        *self
            .inner
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = listener;
    }

    /// Resolve `key` and deliver the outcome to `target`.
    ///
    /// Must be called on the UI context.
    pub fn load(&self, key: L::Key, mut target: L::Target, params: L::Params) {
        self.inner.canceled.store(false, Ordering::SeqCst);
        let params = Arc::new(params);
        let listener = self.listener();

        if let Some(listener) = &listener {
            if !listener.on_load(self, &key, &target, &params) {
                tracing::trace!(key = ?key, "load vetoed by listener");
                return;
            }
        }

        if let Some(data) = self.inner.cache.get(&key) {
            tracing::trace!(key = ?key, "cache hit");
            self.inner
                .loader
                .apply(&key, Some(&data), &mut target, &params);
            if let Some(listener) = &listener {
                listener.on_finished(self, &key, Some(&data), &target, &params);
            }
            return;
        }

        tracing::trace!(key = ?key, "cache miss");
        self.inner
            .loader
            .before_compute(&key, &mut target, &params);

        let binder = self.clone();
        self.inner.worker.execute(Box::new(move || {
            if binder.is_canceled() {
                tracing::debug!(key = ?key, "request canceled before compute");
                return;
            }
            let data = binder.inner.loader.compute(&key, &params);
            let ui = Arc::clone(&binder.inner.ui);
            ui.execute(Box::new(move || binder.deliver(key, data, target, &params)));
        }));
    }

    fn deliver(&self, key: L::Key, data: Option<L::Data>, mut target: L::Target, params: &L::Params) {
        if self.is_canceled() {
            tracing::debug!(key = ?key, "result dropped after cancel");
            return;
        }
        if let Some(data) = &data {
            self.inner.cache.put(key.clone(), data.clone());
        }
        self.inner
            .loader
            .apply(&key, data.as_ref(), &mut target, params);
        if let Some(listener) = self.listener() {
            listener.on_finished(self, &key, data.as_ref(), &target, params);
        }
    }

    /// Suppress delivery of in-flight requests and notify the listener.
    pub fn cancel(&self) {
        self.inner.canceled.store(true, Ordering::SeqCst);
        tracing::debug!("binder canceled");
        if let Some(listener) = self.listener() {
            listener.on_canceled(self);
        }
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.inner.canceled.load(Ordering::SeqCst)
    }

    /// Whether `key` has cached data. Does not affect eviction order.
    #[must_use]
    pub fn is_cached(&self, key: &L::Key) -> bool {
        self.inner.cache.contains(key)
    }

    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.inner.cache.len()
    }

    /// Evict every cached entry. In-flight requests still populate the cache.
    pub fn clear_cache(&self) {
        self.inner.cache.evict_all();
    }
}

impl<L: DataLoader + fmt::Debug> fmt::Debug for DataBinder<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBinder")
            .field("loader", &self.inner.loader)
            .field("cache", &self.inner.cache)
            .field("canceled", &self.is_canceled())
            .finish_non_exhaustive()
    }
}
