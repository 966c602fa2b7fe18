#![forbid(unsafe_code)]

//! Data binder driven by a real thread pool.
//!
//! The UI context is a [`QueueExecutor`] drained by the test thread, the
//! worker context is a [`ThreadPoolExecutor`]. Every test polls the UI queue
//! with a deadline instead of sleeping for a fixed time.
//!
//! # Invariants
//!
//! 1. `apply` and `on_finished` only ever run on the test (UI) thread.
//! 2. Exactly one outcome per uncanceled request.
//! 3. A canceled request never reaches `apply`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use ctabs_runtime::{
    BinderListener, DataBinder, DataLoader, Executor, QueueExecutor, ThreadPoolExecutor,
};

const DEADLINE: Duration = Duration::from_secs(10);

#[derive(Default)]
struct Thumbnails {
    compute_threads: Mutex<Vec<ThreadId>>,
    apply_threads: Mutex<Vec<ThreadId>>,
}

impl DataLoader for Thumbnails {
    type Key = String;
    type Data = Arc<Vec<u8>>;
    type Target = mpsc::Sender<(String, Option<usize>)>;
    type Params = usize;

    fn compute(&self, key: &String, size: &usize) -> Option<Self::Data> {
        self.compute_threads
            .lock()
            .unwrap()
            .push(thread::current().id());
        (!key.is_empty()).then(|| Arc::new(vec![0u8; *size]))
    }

    fn apply(&self, key: &String, data: Option<&Self::Data>, target: &mut Self::Target, _: &usize) {
        self.apply_threads
            .lock()
            .unwrap()
            .push(thread::current().id());
        target.send((key.clone(), data.map(|d| d.len()))).unwrap();
    }
}

#[derive(Default)]
struct Counter {
    finished: AtomicUsize,
}

impl BinderListener<Thumbnails> for Counter {
    fn on_finished(
        &self,
        _: &DataBinder<Thumbnails>,
        _: &String,
        _: Option<&Arc<Vec<u8>>>,
        _: &mpsc::Sender<(String, Option<usize>)>,
        _: &usize,
    ) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

fn drain_until(ui: &QueueExecutor, mut done: impl FnMut() -> bool) {
    let start = Instant::now();
    while !done() {
        assert!(start.elapsed() < DEADLINE, "timed out waiting for delivery");
        if ui.run_pending() == 0 {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

#[test]
fn results_are_delivered_on_the_ui_thread() {
    let ui = Arc::new(QueueExecutor::new());
    let pool = Arc::new(ThreadPoolExecutor::new(3, "thumbs").unwrap());
    let binder = DataBinder::new(Thumbnails::default(), ui.clone(), pool);
    let counter = Arc::new(Counter::default());
    binder.set_listener(Some(counter.clone()));

    let (tx, rx) = mpsc::channel();
    let keys = ["a", "b", "c", "d", "e", "f"];
    for key in keys {
        binder.load(key.to_owned(), tx.clone(), 32);
    }
    drain_until(&ui, || counter.finished.load(Ordering::SeqCst) == keys.len());

    let mut delivered: Vec<_> = rx.try_iter().collect();
    delivered.sort();
    assert_eq!(
        delivered,
        keys.iter()
            .map(|k| ((*k).to_owned(), Some(32)))
            .collect::<Vec<_>>()
    );

    let ui_thread = thread::current().id();
    let loader = binder.loader();
    assert!(loader.apply_threads.lock().unwrap().iter().all(|id| *id == ui_thread));
    assert!(loader.compute_threads.lock().unwrap().iter().all(|id| *id != ui_thread));
    assert_eq!(binder.cached_len(), keys.len());
}

#[test]
fn absent_data_is_finished_not_canceled() {
    let ui = Arc::new(QueueExecutor::new());
    let pool = Arc::new(ThreadPoolExecutor::new(1, "thumbs").unwrap());
    let binder = DataBinder::new(Thumbnails::default(), ui.clone(), pool);
    let counter = Arc::new(Counter::default());
    binder.set_listener(Some(counter.clone()));

    let (tx, rx) = mpsc::channel();
    binder.load(String::new(), tx, 8);
    drain_until(&ui, || counter.finished.load(Ordering::SeqCst) == 1);

    assert_eq!(rx.try_recv().unwrap(), (String::new(), None));
    assert!(!binder.is_cached(&String::new()));
}

#[test]
fn cancel_suppresses_in_flight_delivery() {
    let ui = Arc::new(QueueExecutor::new());
    let pool = Arc::new(ThreadPoolExecutor::new(1, "thumbs").unwrap());
    let binder = DataBinder::new(Thumbnails::default(), ui.clone(), pool.clone());

    let (tx, rx) = mpsc::channel();
    binder.load("slow".to_owned(), tx, 4);
    binder.cancel();

    // flush the single worker so any posted delivery is already queued
    let (flushed_tx, flushed_rx) = mpsc::channel();
    pool.execute(Box::new(move || flushed_tx.send(()).unwrap()));
    flushed_rx.recv_timeout(DEADLINE).unwrap();

    ui.run_pending();
    assert!(rx.try_recv().is_err());
    assert!(!binder.is_cached(&"slow".to_owned()));
}

#[test]
fn second_load_of_same_key_hits_cache() {
    let ui = Arc::new(QueueExecutor::new());
    let pool = Arc::new(ThreadPoolExecutor::new(2, "thumbs").unwrap());
    let binder = DataBinder::new(Thumbnails::default(), ui.clone(), pool);
    let counter = Arc::new(Counter::default());
    binder.set_listener(Some(counter.clone()));

    let (tx, rx) = mpsc::channel();
    binder.load("tab".to_owned(), tx.clone(), 16);
    drain_until(&ui, || counter.finished.load(Ordering::SeqCst) == 1);

    binder.load("tab".to_owned(), tx, 16);
    // hit is synchronous: no draining needed
    assert_eq!(counter.finished.load(Ordering::SeqCst), 2);
    assert_eq!(rx.try_iter().count(), 2);
    assert_eq!(binder.loader().compute_threads.lock().unwrap().len(), 1);
}
