#![forbid(unsafe_code)]

//! Runtime services for chrome-style tabs.
//!
//! - [`executor`]: the [`Executor`] seam between the UI context and worker
//!   threads, with inline, queued, and thread-pool implementations.
//! - [`cache`]: a thread-safe [`BoundedCache`] with least-recently-used eviction.
//! - [`binder`]: the [`DataBinder`], which resolves keys to data from the cache
//!   or a background computation and delivers results on the UI context.

pub mod binder;
pub mod cache;
pub mod executor;

pub use binder::{
    BinderConfig, BinderListener, DEFAULT_CACHE_CAPACITY, DataBinder, DataLoader, SharedListener,
};
pub use cache::BoundedCache;
pub use executor::{
    Executor, ExecutorError, InlineExecutor, QueueExecutor, SharedExecutor, Task,
    ThreadPoolExecutor,
};
