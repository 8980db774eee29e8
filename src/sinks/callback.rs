// Callback and bridge sinks: forward fully assembled records verbatim

use super::{Sink, SinkCore};
use crate::fmt::Formatter;
use crate::level::Level;
use crate::record::Record;

/// Invokes a user function with each record.
///
/// The callback runs on the consumer thread and must not retain references
/// into the record; copy what it needs (`Record` is `Copy`).
pub struct CallbackSink {
    core: SinkCore,
    callback: Box<dyn FnMut(&Record) + Send>,
}

impl CallbackSink {
    pub fn new(callback: impl FnMut(&Record) + Send + 'static) -> Self {
        Self {
            core: SinkCore::new(),
            callback: Box::new(callback),
        }
    }
}

impl Sink for CallbackSink {
    fn write(&mut self, record: &Record) {
        if !self.should_log(record.level) {
            return;
        }
        (self.callback)(record);
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

/// Adapter seam for an external logging framework: receives fully assembled
/// records and forwards them however the host framework wants.
pub trait RecordBridge: Send {
    fn forward(&mut self, record: &Record);

    fn flush(&mut self) {}
}

/// Wraps a [`RecordBridge`] as a sink.
pub struct BridgeSink {
    core: SinkCore,
    bridge: Box<dyn RecordBridge>,
}

impl BridgeSink {
    pub fn new(bridge: impl RecordBridge + 'static) -> Self {
        Self {
            core: SinkCore::new(),
            bridge: Box::new(bridge),
        }
    }
}

impl Sink for BridgeSink {
    fn write(&mut self, record: &Record) {
        if !self.should_log(record.level) {
            return;
        }
        self.bridge.forward(record);
    }

    fn flush(&mut self) {
        self.bridge.flush();
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
