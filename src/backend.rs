// SPDX-License-Identifier: Apache-2.0 OR MIT
// Backend: the ring, the sink list, and the consumer thread
//
// Producers only ever touch try_push. The consumer thread (or a manual
// drain when no thread is running) owns the pop side and the sinks.

use crate::config::{DRAIN_BATCH, RING_SIZE};
use crate::record::Record;
use crate::ring::MpscRing;
use crate::sinks::Sink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

pub struct Backend {
    inner: Arc<BackendInner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct BackendInner {
    ring: MpscRing<RING_SIZE>,
    sinks: Mutex<Vec<Box<dyn Sink>>>,
    running: AtomicBool,
}

impl BackendInner {
    /// Pop up to `max` records and dispatch each to every sink in insertion
    /// order. Single-consumer contract: only the consumer thread, or a
    /// manual drain while no consumer thread is running.
    fn drain(&self, max: usize) -> usize {
        let mut sinks = self.sinks.lock().unwrap_or_else(|e| e.into_inner());
        let mut record = Record::default();
        let mut count = 0;
        while count < max && self.ring.try_pop(&mut record) {
            for sink in sinks.iter_mut() {
                sink.write(&record);
            }
            count += 1;
        }
        count
    }

    fn flush_sinks(&self) {
        let mut sinks = self.sinks.lock().unwrap_or_else(|e| e.into_inner());
        for sink in sinks.iter_mut() {
            sink.flush();
        }
    }
}

impl Backend {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BackendInner {
                ring: MpscRing::new(),
                sinks: Mutex::new(Vec::new()),
                running: AtomicBool::new(false),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Publish a record. Never blocks; false means the ring was full and the
    /// caller owns drop accounting.
    #[inline]
    pub fn try_push(&self, record: &Record) -> bool {
        self.inner.ring.try_push(record)
    }

    /// Register a sink. Sinks receive records in registration order; the
    /// order is fixed once the consumer is started.
    pub fn add_sink(&self, sink: Box<dyn Sink>) {
        self.inner
            .sinks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(sink);
    }

    /// Start the consumer thread. No-op if already running. With the
    /// `embedded` or `manual-drain` feature no thread is spawned and the
    /// host drives `drain` itself.
    pub fn start(&self) {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return;
        }
        #[cfg(not(any(feature = "embedded", feature = "manual-drain")))]
        {
            let inner = Arc::clone(&self.inner);
            let handle = std::thread::spawn(move || consumer_loop(&inner));
            *self.worker.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        }
    }

    /// Stop the consumer thread, drain the ring to empty, then flush every
    /// sink. Idempotent, and safe if `start` was never called: records in
    /// the ring are never discarded on the way down.
    pub fn stop(&self) {
        self.inner.running.store(false, Ordering::SeqCst);
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        while self.inner.drain(DRAIN_BATCH) > 0 {}
        self.inner.flush_sinks();
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Relaxed)
    }

    /// Manual drain for embedded deployments. Refused (returns 0) while the
    /// consumer thread is running: the pop side is single-consumer.
    pub fn drain(&self, max: usize) -> usize {
        #[cfg(not(any(feature = "embedded", feature = "manual-drain")))]
        if self.is_running() {
            return 0;
        }
        self.inner.drain(max)
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Backend {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Consumer loop: batch drains with adaptive idle backoff. Under load the
/// loop spins and never syscalls; idle cost decays to a 100 us sleep.
#[cfg(not(any(feature = "embedded", feature = "manual-drain")))]
fn consumer_loop(inner: &BackendInner) {
    use std::time::Duration;

    crate::context::set_thread_name("log-consumer");

    let mut idle_count: u32 = 0;
    while inner.running.load(Ordering::Relaxed) {
        let drained = inner.drain(DRAIN_BATCH);
        if drained > 0 {
            idle_count = 0;
        } else {
            idle_count += 1;
            if idle_count < 100 {
                std::hint::spin_loop();
            } else if idle_count < 1000 {
                std::thread::yield_now();
            } else {
                std::thread::sleep(Duration::from_micros(100));
            }
        }
    }
    // Final sweep so a stop() racing a late push still sees an empty ring
    // from the joining side.
    while inner.drain(DRAIN_BATCH) > 0 {}
}
