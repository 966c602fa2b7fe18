#![forbid(unsafe_code)]

//! Execution contexts.
//!
//! UI state may only be touched from a single sequential context; expensive
//! work belongs on worker threads. Both are modeled by the [`Executor`] trait
//! so that components such as the [`DataBinder`](crate::DataBinder) can be
//! handed whatever the host provides:
//!
//! - [`InlineExecutor`] runs each task on the calling thread, immediately.
//! - [`QueueExecutor`] buffers tasks in FIFO order until the owner drains
//!   them with [`QueueExecutor::run_pending`]. This is how a host main loop
//!   (or a test) models the UI context.
//! - [`ThreadPoolExecutor`] runs tasks on a fixed set of named worker threads,
//!   unordered relative to each other.
//!
//! # Failure Modes
//!
//! - A task that panics on a pool worker is caught and logged; the worker
//!   keeps serving the queue.
//! - Submitting to a pool that is shutting down drops the task with a warning.

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use ctabs_core::IllegalArgument;
use ctabs_core::condition::ensure_at_least;

/// A unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// An executor shared between components.
pub type SharedExecutor = Arc<dyn Executor>;

/// Runs tasks in some execution context.
pub trait Executor: Send + Sync {
    /// Schedule `task`. Implementations decide when and where it runs.
    fn execute(&self, task: Task);
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, task: Task) {
        (**self).execute(task);
    }
}

/// Runs every task immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, task: Task) {
        task();
    }
}

/// FIFO task queue drained explicitly by its owner.
pub struct QueueExecutor {
    queue: Mutex<VecDeque<Task>>,
    waker: RwLock<Option<Arc<dyn Fn() + Send + Sync + 'static>>>,
}

impl QueueExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            waker: RwLock::new(None),
        }
    }

    /// Register a callback invoked after every enqueue, e.g. to wake a host loop.
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self.waker.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(waker));
    }

    pub fn clear_waker(&self) {
        *self.waker.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Run the oldest queued task. Returns `false` when the queue was empty.
    pub fn run_one(&self) -> bool {
        let task = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run tasks until the queue is empty, including tasks enqueued meanwhile.
    ///
    /// Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        ran
    }
}

impl Default for QueueExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QueueExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueExecutor")
            .field("pending", &self.pending())
            .finish()
    }
}

impl Executor for QueueExecutor {
    fn execute(&self, task: Task) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(task);
        let waker = self
            .waker
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

/// Errors from creating a [`ThreadPoolExecutor`].
#[derive(Debug)]
pub enum ExecutorError {
    /// The pool configuration was rejected.
    Argument(IllegalArgument),
    /// The OS refused to spawn a worker thread.
    Spawn(io::Error),
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument(err) => write!(f, "{err}"),
            Self::Spawn(err) => write!(f, "failed to spawn worker thread: {err}"),
        }
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Argument(err) => Some(err),
            Self::Spawn(err) => Some(err),
        }
    }
}

impl From<IllegalArgument> for ExecutorError {
    fn from(err: IllegalArgument) -> Self {
        Self::Argument(err)
    }
}

/// Fixed-size pool of worker threads fed through a channel.
///
/// Dropping the pool closes the channel and joins every worker after the
/// already-queued tasks have run.
pub struct ThreadPoolExecutor {
    sender: Option<mpsc::Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
    panicked: Arc<AtomicUsize>,
}

impl ThreadPoolExecutor {
    /// Spawn `threads` workers named `{name}-{index}`.
    pub fn new(threads: usize, name: &str) -> Result<Self, ExecutorError> {
        let threads = ensure_at_least(threads, 1, "A thread pool needs at least one thread")?;
        let (sender, receiver) = mpsc::channel::<Task>();
        let receiver = Arc::new(Mutex::new(receiver));
        let panicked = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(threads);
        for index in 0..threads {
            let receiver = Arc::clone(&receiver);
            let panicked = Arc::clone(&panicked);
            let handle = thread::Builder::new()
                .name(format!("{name}-{index}"))
                .spawn(move || worker_loop(&receiver, &panicked))
                .map_err(ExecutorError::Spawn)?;
            workers.push(handle);
        }
        tracing::debug!(threads, name, "thread pool started");

        Ok(Self {
            sender: Some(sender),
            workers,
            panicked,
        })
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    /// Number of tasks that panicked so far.
    #[must_use]
    pub fn panicked_tasks(&self) -> usize {
        self.panicked.load(Ordering::Relaxed)
    }
}

fn worker_loop(receiver: &Mutex<mpsc::Receiver<Task>>, panicked: &AtomicUsize) {
    loop {
        let next = receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv();
        let Ok(task) = next else {
            break;
        };
        if catch_unwind(AssertUnwindSafe(task)).is_err() {
            panicked.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                thread = thread::current().name().unwrap_or("worker"),
                "task panicked"
            );
        }
    }
}

impl Executor for ThreadPoolExecutor {
    fn execute(&self, task: Task) {
        let delivered = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(task).is_ok());
        if !delivered {
            tracing::warn!("thread pool is shut down; task dropped");
        }
    }
}

impl Drop for ThreadPoolExecutor {
    fn drop(&mut self) {
        drop(self.sender.take());
        let current = thread::current().id();
        for worker in self.workers.drain(..) {
            // the last handle may be released by a task on one of our own workers
            if worker.thread().id() == current {
                continue;
            }
            if worker.join().is_err() {
                tracing::error!("worker thread exited abnormally");
            }
        }
    }
}

impl fmt::Debug for ThreadPoolExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPoolExecutor")
            .field("threads", &self.workers.len())
            .field("panicked", &self.panicked_tasks())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::mpsc::RecvTimeoutError;
    use std::time::Duration;

    #[test]
    fn inline_runs_immediately() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        InlineExecutor.execute(Box::new(move || flag.store(true, Ordering::SeqCst)));
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn queue_runs_in_fifo_order() {
        let queue = QueueExecutor::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let log = Arc::clone(&log);
            queue.execute(Box::new(move || log.lock().unwrap().push(i)));
        }
        assert_eq!(queue.pending(), 3);
        assert!(log.lock().unwrap().is_empty());

        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(queue.pending(), 0);
        assert!(!queue.run_one());
    }

    #[test]
    fn queue_drains_tasks_enqueued_while_running() {
        let queue = Arc::new(QueueExecutor::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let inner_queue = Arc::clone(&queue);
        let inner_hits = Arc::clone(&hits);
        queue.execute(Box::new(move || {
            inner_hits.fetch_add(1, Ordering::SeqCst);
            let hits = Arc::clone(&inner_hits);
            inner_queue.execute(Box::new(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            }));
        }));
        assert_eq!(queue.run_pending(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn queue_waker_fires_on_enqueue() {
        let queue = QueueExecutor::new();
        let woken = Arc::new(AtomicUsize::new(0));
        let w = Arc::clone(&woken);
        queue.set_waker(move || {
            w.fetch_add(1, Ordering::SeqCst);
        });
        queue.execute(Box::new(|| {}));
        queue.execute(Box::new(|| {}));
        assert_eq!(woken.load(Ordering::SeqCst), 2);

        queue.clear_waker();
        queue.execute(Box::new(|| {}));
        assert_eq!(woken.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn pool_requires_a_thread() {
        assert!(matches!(
            ThreadPoolExecutor::new(0, "empty"),
            Err(ExecutorError::Argument(_))
        ));
    }

    #[test]
    fn pool_runs_tasks_on_named_workers() {
        let pool = ThreadPoolExecutor::new(2, "binder").unwrap();
        assert_eq!(pool.threads(), 2);
        let (tx, rx) = mpsc::channel();
        for _ in 0..4 {
            let tx = tx.clone();
            pool.execute(Box::new(move || {
                let name = thread::current().name().map(str::to_owned);
                tx.send(name).unwrap();
            }));
        }
        for _ in 0..4 {
            let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert!(name.unwrap().starts_with("binder-"));
        }
    }

    #[test]
    fn pool_survives_panicking_task() {
        let pool = ThreadPoolExecutor::new(1, "panicky").unwrap();
        pool.execute(Box::new(|| panic!("boom")));
        let (tx, rx) = mpsc::channel();
        pool.execute(Box::new(move || tx.send(()).unwrap()));
        assert_ne!(
            rx.recv_timeout(Duration::from_secs(5)),
            Err(RecvTimeoutError::Timeout)
        );
        assert_eq!(pool.panicked_tasks(), 1);
    }

    #[test]
    fn drop_runs_queued_tasks_then_joins() {
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let pool = ThreadPoolExecutor::new(2, "drain").unwrap();
            for _ in 0..16 {
                let hits = Arc::clone(&hits);
                pool.execute(Box::new(move || {
                    hits.fetch_add(1, Ordering::SeqCst);
                }));
            }
        }
        assert_eq!(hits.load(Ordering::SeqCst), 16);
    }
}
