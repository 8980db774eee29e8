// SPDX-License-Identifier: Apache-2.0 OR MIT
// Formatters: pure renderers from a record to bytes

mod json;
mod pattern;

pub use json::JsonFormatter;
pub use pattern::{PatternFormatter, DEFAULT_PATTERN, DUMP_PATTERN, FILE_PATTERN};

use crate::record::Record;
use chrono::{DateTime, Local, TimeZone, Utc};
use std::io::Write;

/// A formatter renders one record into the sink-provided scratch buffer.
/// Implementations must not retain state between records.
pub trait Formatter: Send {
    fn format(&self, record: &Record, out: &mut Vec<u8>);
}

/// Wall-clock nanoseconds to a local date-time.
pub(crate) fn local_datetime(wall_ns: u64) -> DateTime<Local> {
    let secs = (wall_ns / 1_000_000_000) as i64;
    let nsecs = (wall_ns % 1_000_000_000) as u32;
    Utc.timestamp_opt(secs, nsecs)
        .single()
        .unwrap_or_default()
        .with_timezone(&Local)
}

pub(crate) fn micros_of(wall_ns: u64) -> u32 {
    ((wall_ns / 1_000) % 1_000_000) as u32
}

/// Render `YYYY-MM-DD HH:MM:SS.uuuuuu` (local time) for a wall-clock value.
pub fn format_timestamp(wall_ns: u64, out: &mut Vec<u8>) {
    let dt = local_datetime(wall_ns);
    let _ = write!(
        out,
        "{}.{:06}",
        dt.format("%Y-%m-%d %H:%M:%S"),
        micros_of(wall_ns)
    );
}

/// Render `YYYY-MM-DD` (local time).
pub fn format_date(wall_ns: u64, out: &mut Vec<u8>) {
    let dt = local_datetime(wall_ns);
    let _ = write!(out, "{}", dt.format("%Y-%m-%d"));
}

/// Render `HH:MM:SS.uuuuuu` (local time).
pub fn format_time(wall_ns: u64, out: &mut Vec<u8>) {
    let dt = local_datetime(wall_ns);
    let _ = write!(out, "{}.{:06}", dt.format("%H:%M:%S"), micros_of(wall_ns));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let mut out = Vec::new();
        // 2023-06-15 around noon UTC, with 123456 microseconds.
        format_timestamp(1_686_830_400_123_456_789, &mut out);
        let s = String::from_utf8(out).unwrap();
        assert_eq!(s.len(), "2023-06-15 12:00:00.123456".len());
        assert!(s.ends_with(".123456"));
    }

    #[test]
    fn test_date_and_time_shapes() {
        let ns = 1_686_830_400_000_000_000u64;
        let mut date = Vec::new();
        format_date(ns, &mut date);
        assert_eq!(date.len(), "2023-06-15".len());

        let mut time = Vec::new();
        format_time(ns, &mut time);
        assert!(String::from_utf8(time).unwrap().ends_with(".000000"));
    }
}
