// SPDX-License-Identifier: Apache-2.0 OR MIT
// Sink contract and shared per-sink state

mod callback;
mod console;
mod daily_file;
mod memory_ring;
mod rotating_file;

pub use callback::{BridgeSink, CallbackSink, RecordBridge};
pub use console::ConsoleSink;
pub use daily_file::DailyFileSink;
pub use memory_ring::{MemoryRingHandle, MemoryRingSink};
pub use rotating_file::RotatingFileSink;

use crate::config::FORMAT_BUF_CAPACITY;
use crate::fmt::Formatter;
use crate::level::Level;
use crate::record::Record;

/// A consumer of records, driven exclusively by the backend's consumer
/// thread (or a manual drain). Each sink owns its formatter and a minimum
/// level that filters independently of the logger's runtime level.
pub trait Sink: Send {
    /// Write one record. Called in ring order, one record at a time.
    fn write(&mut self, record: &Record);

    /// Flush any buffered output.
    fn flush(&mut self);

    /// Replace the sink's formatter. If never called, the sink installs its
    /// own default on first write.
    fn set_formatter(&mut self, formatter: Box<dyn Formatter>);

    /// Minimum level this sink accepts. Defaults to Trace.
    fn set_level(&mut self, level: Level);

    fn level(&self) -> Level;

    fn should_log(&self, level: Level) -> bool {
        level >= self.level()
    }
}

/// State every sink variant carries: the attached formatter (installed
/// lazily), the sink-local level filter, and the scratch buffer formatted
/// output is rendered into.
pub(crate) struct SinkCore {
    formatter: Option<Box<dyn Formatter>>,
    min_level: Level,
    buf: Vec<u8>,
}

impl SinkCore {
    pub(crate) fn new() -> Self {
        Self {
            formatter: None,
            min_level: Level::Trace,
            buf: Vec::with_capacity(FORMAT_BUF_CAPACITY),
        }
    }

    /// Render the record into the scratch buffer, installing `default` as
    /// the formatter if none is attached yet. Returns the rendered length.
    pub(crate) fn render<F>(&mut self, record: &Record, default: F) -> usize
    where
        F: FnOnce() -> Box<dyn Formatter>,
    {
        let formatter = self.formatter.get_or_insert_with(default);
        self.buf.clear();
        formatter.format(record, &mut self.buf);
        self.buf.len()
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub(crate) fn set_formatter(&mut self, formatter: Box<dyn Formatter>) {
        self.formatter = Some(formatter);
    }

    pub(crate) fn formatter(&self) -> Option<&dyn Formatter> {
        self.formatter.as_deref()
    }

    pub(crate) fn set_level(&mut self, level: Level) {
        self.min_level = level;
    }

    pub(crate) fn level(&self) -> Level {
        self.min_level
    }
}
