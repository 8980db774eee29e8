// Logger front-end: level gate, record assembly, publication
//
// One instance per process, created on first touch. The hot path touches a
// relaxed fetch_add for the sequence id and the shared-side of the global
// tag lock; everything else is thread-local or inline.

use crate::backend::Backend;
use crate::context;
use crate::level::Level;
use crate::location::SourceLocation;
use crate::record::Record;
use crate::{clock, sinks::Sink};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::OnceLock;

pub struct Logger {
    backend: Backend,
    level: AtomicU8,
    sequence: AtomicU64,
    drop_count: AtomicU64,
    started: AtomicBool,
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

impl Logger {
    /// The process-wide logger, created lazily on first use.
    pub fn global() -> &'static Logger {
        LOGGER.get_or_init(Logger::new)
    }

    fn new() -> Self {
        Self {
            backend: Backend::new(),
            level: AtomicU8::new(Level::Info.as_u8()),
            sequence: AtomicU64::new(0),
            drop_count: AtomicU64::new(0),
            started: AtomicBool::new(false),
        }
    }

    /// Register a sink. Do this before `start`; the dispatch order is the
    /// registration order and is fixed while the consumer runs.
    pub fn add_sink(&self, sink: Box<dyn Sink>) {
        self.backend.add_sink(sink);
    }

    /// Runtime minimum level. Records below it are discarded at the call
    /// site without touching the ring.
    pub fn set_level(&self, level: Level) {
        self.level.store(level.as_u8(), Ordering::Relaxed);
    }

    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or(Level::Info)
    }

    /// Start the consumer thread. Idempotent.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        self.backend.start();
    }

    /// Stop the consumer, drain the ring to empty, flush every sink.
    /// Idempotent, and safe if `start` was never called.
    pub fn stop(&self) {
        if !self.started.swap(false, Ordering::SeqCst) {
            return;
        }
        self.backend.stop();
    }

    /// Manually pop and dispatch up to `max` records; returns the number
    /// dispatched. Only valid while the consumer thread is not running
    /// (embedded / manual-drain operation); refused with 0 otherwise.
    pub fn drain(&self, max: usize) -> usize {
        self.backend.drain(max)
    }

    /// Records rejected by a full ring since the last reset.
    pub fn drop_count(&self) -> u64 {
        self.drop_count.load(Ordering::Relaxed)
    }

    pub fn reset_drop_count(&self) {
        self.drop_count.store(0, Ordering::Relaxed);
    }

    /// Assemble and publish one record. Called by the logging macros after
    /// both level gates have passed; fail-silent apart from the drop
    /// counter.
    #[doc(hidden)]
    pub fn log(&self, level: Level, location: SourceLocation, args: fmt::Arguments<'_>) {
        let mut record = Record::default();

        // Assembly order is fixed: clocks first so queueing delay never
        // skews the timestamps.
        record.timestamp_ns = clock::monotonic_ns();
        record.wall_clock_ns = clock::wall_ns();
        record.level = level;
        record.file_path = location.file_path;
        record.file_name = location.file_name;
        record.function_name = location.function_name;
        record.pretty_function = location.pretty_function;
        record.line = location.line;
        record.column = location.column;
        record.sequence_id = self.sequence.fetch_add(1, Ordering::Relaxed);
        context::fill_thread_info(&mut record);
        context::fill_tags(&mut record);
        record.write_message(args);

        if !self.backend.try_push(&record) {
            self.drop_count.fetch_add(1, Ordering::Relaxed);
        }
    }
}
