// Console sink: warn and above to stderr, everything else to stdout

use super::{Sink, SinkCore};
use crate::fmt::{Formatter, PatternFormatter};
use crate::level::Level;
use crate::record::Record;
use std::io::{self, IsTerminal, Write};

/// Writes formatted records to the standard streams. Records at Warn or
/// higher go to stderr, the rest to stdout. Color is auto-detected from
/// either stream being a TTY unless forced.
pub struct ConsoleSink {
    core: SinkCore,
    use_color: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        let use_color = io::stdout().is_terminal() || io::stderr().is_terminal();
        Self {
            core: SinkCore::new(),
            use_color,
        }
    }

    /// Override TTY auto-detection.
    pub fn with_color(force_color: bool) -> Self {
        Self {
            core: SinkCore::new(),
            use_color: force_color,
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, record: &Record) {
        if !self.should_log(record.level) {
            return;
        }
        let use_color = self.use_color;
        let len = self.core.render(record, || {
            Box::new(PatternFormatter::new(crate::fmt::DEFAULT_PATTERN, use_color))
        });
        if len == 0 {
            return;
        }
        if record.level >= Level::Warn {
            let mut out = io::stderr().lock();
            let _ = out.write_all(self.core.bytes());
            let _ = out.write_all(b"\n");
        } else {
            let mut out = io::stdout().lock();
            let _ = out.write_all(self.core.bytes());
            let _ = out.write_all(b"\n");
        }
    }

    fn flush(&mut self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }

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

    fn record_at(level: Level) -> Record {
        let mut record = Record::default();
        record.level = level;
        record.write_message(format_args!("console test"));
        record
    }

    #[test]
    fn test_write_does_not_panic() {
        // Output itself cannot be captured portably; exercise both routes.
        let mut sink = ConsoleSink::with_color(false);
        sink.write(&record_at(Level::Info));
        sink.write(&record_at(Level::Error));
        sink.flush();
    }

    #[test]
    fn test_level_filter() {
        let mut sink = ConsoleSink::with_color(false);
        sink.set_level(Level::Error);
        assert!(!sink.should_log(Level::Warn));
        assert!(sink.should_log(Level::Error));
        assert!(sink.should_log(Level::Fatal));
    }

    #[test]
    fn test_default_level_is_trace() {
        let sink = ConsoleSink::with_color(false);
        assert_eq!(sink.level(), Level::Trace);
    }
}
