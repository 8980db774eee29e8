// In-process crash-dump buffer: overwrite-oldest retention, ordered replay

use super::{Sink, SinkCore};
use crate::fmt::{Formatter, PatternFormatter, DUMP_PATTERN};
use crate::level::Level;
use crate::record::Record;
use crate::Error;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

struct RingState {
    buffer: Vec<Record>,
    head: usize,
    count: usize,
}

impl RingState {
    fn at(&self, index: usize) -> Record {
        let capacity = self.buffer.len();
        let start = if self.count < capacity { 0 } else { self.head };
        self.buffer[(start + index) % capacity]
    }
}

/// Keeps the last `capacity` records in memory, no I/O on write. Replay and
/// dump go through a [`MemoryRingHandle`], which stays usable after the sink
/// itself moves into the backend.
pub struct MemoryRingSink {
    core: SinkCore,
    state: Arc<Mutex<RingState>>,
}

impl MemoryRingSink {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "memory ring capacity must be non-zero");
        Self {
            core: SinkCore::new(),
            state: Arc::new(Mutex::new(RingState {
                buffer: vec![Record::default(); capacity],
                head: 0,
                count: 0,
            })),
        }
    }

    /// Cloneable read-side handle for replay and crash dumps.
    pub fn handle(&self) -> MemoryRingHandle {
        MemoryRingHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Dump using this sink's attached formatter (or the dump default).
    pub fn dump_to_file(&mut self, path: &Path) -> Result<(), Error> {
        let default = PatternFormatter::new(DUMP_PATTERN, false);
        let formatter = self.core.formatter().unwrap_or(&default);
        dump(&self.state, formatter, path)
    }
}

#[derive(Clone)]
pub struct MemoryRingHandle {
    state: Arc<Mutex<RingState>>,
}

impl MemoryRingHandle {
    /// Number of records currently retained (≤ capacity).
    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The i-th oldest retained record.
    pub fn at(&self, index: usize) -> Option<Record> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if index >= state.count {
            return None;
        }
        Some(state.at(index))
    }

    /// Write every retained record, oldest first, to `path` using the
    /// compact dump format.
    pub fn dump_to_file(&self, path: &Path) -> Result<(), Error> {
        let formatter = PatternFormatter::new(DUMP_PATTERN, false);
        dump(&self.state, &formatter, path)
    }

    /// Same as [`dump_to_file`](Self::dump_to_file) with a caller-chosen
    /// formatter.
    pub fn dump_to_file_with(&self, path: &Path, formatter: &dyn Formatter) -> Result<(), Error> {
        dump(&self.state, formatter, path)
    }
}

fn dump(
    state: &Arc<Mutex<RingState>>,
    formatter: &dyn Formatter,
    path: &Path,
) -> Result<(), Error> {
    let mut file = File::create(path).map_err(|source| Error::OpenFile {
        path: path.to_path_buf(),
        source,
    })?;

    let state = state.lock().unwrap_or_else(|e| e.into_inner());
    let mut buf = Vec::with_capacity(crate::config::FORMAT_BUF_CAPACITY);
    for i in 0..state.count {
        let record = state.at(i);
        buf.clear();
        formatter.format(&record, &mut buf);
        if !buf.is_empty() {
            buf.push(b'\n');
            let _ = file.write_all(&buf);
        }
    }
    Ok(())
}

impl Sink for MemoryRingSink {
    fn write(&mut self, record: &Record) {
        if !self.should_log(record.level) {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let capacity = state.buffer.len();
        let head = state.head;
        state.buffer[head] = *record;
        state.head = (head + 1) % capacity;
        state.count = (state.count + 1).min(capacity);
    }

    fn flush(&mut self) {}

    fn set_formatter(&mut self, formatter: Box<dyn Formatter>) {
        self.core.set_formatter(formatter);
    }

    fn set_level(&mut self, level: Level) {
        self.core.set_level(level);
    }

    fn level(&self) -> Level {
        self.core.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record_with_seq(seq: u64) -> Record {
        let mut record = Record::default();
        record.level = Level::Info;
        record.sequence_id = seq;
        record.write_message(format_args!("m{seq}"));
        record
    }

    #[test]
    fn test_retains_in_arrival_order_before_wrap() {
        let mut sink = MemoryRingSink::new(8);
        let handle = sink.handle();
        for i in 0..5 {
            sink.write(&record_with_seq(i));
        }
        assert_eq!(handle.len(), 5);
        for i in 0..5 {
            assert_eq!(handle.at(i).unwrap().sequence_id, i as u64);
        }
        assert!(handle.at(5).is_none());
    }

    #[test]
    fn test_overwrites_oldest_after_wrap() {
        let mut sink = MemoryRingSink::new(4);
        let handle = sink.handle();
        for i in 0..10 {
            sink.write(&record_with_seq(i));
        }
        // The 4 most recent records, oldest first: 6, 7, 8, 9.
        assert_eq!(handle.len(), 4);
        for (i, expected) in (6..10).enumerate() {
            assert_eq!(handle.at(i).unwrap().sequence_id, expected);
        }
    }

    #[test]
    fn test_level_filter() {
        let mut sink = MemoryRingSink::new(4);
        let handle = sink.handle();
        sink.set_level(Level::Warn);
        sink.write(&record_with_seq(1));
        assert!(handle.is_empty());
    }

    #[test]
    fn test_dump_to_file() {
        let mut sink = MemoryRingSink::new(4);
        sink.set_formatter(Box::new(PatternFormatter::new("%m", false)));
        let handle = sink.handle();
        for i in 0..3 {
            sink.write(&record_with_seq(i));
        }

        let path = std::env::temp_dir().join(format!("hotlog_dump_{}.log", Uuid::new_v4()));
        handle.dump_to_file_with(&path, &PatternFormatter::new("%m", false)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "m0\nm1\nm2\n");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_dump_empty_ring_creates_file() {
        let sink = MemoryRingSink::new(4);
        let handle = sink.handle();
        let path = std::env::temp_dir().join(format!("hotlog_dump_{}.log", Uuid::new_v4()));
        handle.dump_to_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
        let _ = std::fs::remove_file(&path);
    }
}
