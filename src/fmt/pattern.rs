// Pattern formatter: a printf-style template compiled once into an op list
// and replayed per record

use super::{local_datetime, micros_of, Formatter};
use crate::level::Level;
use crate::record::Record;
use std::io::Write;

/// Default pattern for human-facing sinks. The color tokens render empty on
/// sinks with color disabled.
pub const DEFAULT_PATTERN: &str = "[%D %T%e] [%C%L%R] [tid:%t] [%f:%#::%n] %g %m";

/// Default pattern for file sinks (no color tokens).
pub const FILE_PATTERN: &str = "[%D %T%e] [%L] [tid:%t] [%f:%#::%n] %g %m";

/// Compact pattern used by crash-dump replay.
pub const DUMP_PATTERN: &str = "[%D %T%e] [%L] [tid:%t] %m";

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Literal(String),
    Date,
    Time,
    Micros,
    LevelFull,
    LevelShort,
    FileName,
    FilePath,
    FuncName,
    PrettyFunc,
    Line,
    ThreadId,
    ProcessId,
    ThreadName,
    SequenceId,
    Tags,
    Message,
    ColorStart,
    ColorReset,
}

/// Renders records according to a `%`-token pattern (vocabulary in the crate
/// docs). Unknown `%x` sequences pass through literally.
pub struct PatternFormatter {
    ops: Vec<Op>,
    enable_color: bool,
}

impl PatternFormatter {
    pub fn new(pattern: &str, enable_color: bool) -> Self {
        Self {
            ops: compile(pattern),
            enable_color,
        }
    }

    fn color_start(level: Level) -> &'static str {
        match level {
            Level::Trace => "\x1b[37m",
            Level::Debug => "\x1b[36m",
            Level::Info => "\x1b[32m",
            Level::Warn => "\x1b[33m",
            Level::Error => "\x1b[31m",
            Level::Fatal => "\x1b[1;31m",
            Level::Off => "",
        }
    }
}

fn compile(pattern: &str) -> Vec<Op> {
    let mut ops = Vec::new();
    let mut literal = String::new();

    fn flush(literal: &mut String, ops: &mut Vec<Op>) {
        if !literal.is_empty() {
            ops.push(Op::Literal(std::mem::take(literal)));
        }
    }

    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            literal.push(ch);
            continue;
        }
        let Some(next) = chars.next() else {
            literal.push('%');
            break;
        };
        let op = match next {
            'D' => Some(Op::Date),
            'T' => Some(Op::Time),
            'e' => Some(Op::Micros),
            'L' => Some(Op::LevelFull),
            'l' => Some(Op::LevelShort),
            'f' => Some(Op::FileName),
            'F' => Some(Op::FilePath),
            'n' => Some(Op::FuncName),
            'N' => Some(Op::PrettyFunc),
            '#' => Some(Op::Line),
            't' => Some(Op::ThreadId),
            'P' => Some(Op::ProcessId),
            'k' => Some(Op::ThreadName),
            'q' => Some(Op::SequenceId),
            'g' => Some(Op::Tags),
            'm' => Some(Op::Message),
            'C' => Some(Op::ColorStart),
            'R' => Some(Op::ColorReset),
            '%' => {
                literal.push('%');
                None
            }
            other => {
                literal.push('%');
                literal.push(other);
                None
            }
        };
        if let Some(op) = op {
            flush(&mut literal, &mut ops);
            ops.push(op);
        }
    }
    flush(&mut literal, &mut ops);
    ops
}

impl Formatter for PatternFormatter {
    fn format(&self, record: &Record, out: &mut Vec<u8>) {
        for op in &self.ops {
            match op {
                Op::Literal(text) => out.extend_from_slice(text.as_bytes()),
                Op::Date => {
                    let dt = local_datetime(record.wall_clock_ns);
                    let _ = write!(out, "{}", dt.format("%Y-%m-%d"));
                }
                Op::Time => {
                    let dt = local_datetime(record.wall_clock_ns);
                    let _ = write!(out, "{}", dt.format("%H:%M:%S"));
                }
                Op::Micros => {
                    let _ = write!(out, ".{:06}", micros_of(record.wall_clock_ns));
                }
                Op::LevelFull => out.extend_from_slice(record.level.as_str().as_bytes()),
                Op::LevelShort => {
                    let _ = write!(out, "{}", record.level.short_char());
                }
                Op::FileName => out.extend_from_slice(record.file_name.as_bytes()),
                Op::FilePath => out.extend_from_slice(record.file_path.as_bytes()),
                Op::FuncName => out.extend_from_slice(record.function_name.as_bytes()),
                Op::PrettyFunc => out.extend_from_slice(record.pretty_function.as_bytes()),
                Op::Line => {
                    let _ = write!(out, "{}", record.line);
                }
                Op::ThreadId => {
                    let _ = write!(out, "{}", record.thread_id);
                }
                Op::ProcessId => {
                    let _ = write!(out, "{}", record.process_id);
                }
                Op::ThreadName => out.extend_from_slice(record.thread_name().as_bytes()),
                Op::SequenceId => {
                    let _ = write!(out, "{}", record.sequence_id);
                }
                Op::Tags => {
                    let tags = record.tags();
                    if !tags.is_empty() {
                        out.push(b'[');
                        for (i, tag) in tags.iter().enumerate() {
                            if i > 0 {
                                out.push(b'|');
                            }
                            out.extend_from_slice(tag.key().as_bytes());
                            out.push(b'=');
                            out.extend_from_slice(tag.value().as_bytes());
                        }
                        out.push(b']');
                    }
                }
                Op::Message => out.extend_from_slice(record.message().as_bytes()),
                Op::ColorStart => {
                    if self.enable_color {
                        out.extend_from_slice(Self::color_start(record.level).as_bytes());
                    }
                }
                Op::ColorReset => {
                    if self.enable_color {
                        out.extend_from_slice(b"\x1b[0m");
                    }
                }
            }
        }
    }
}
