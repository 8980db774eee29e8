// SPDX-License-Identifier: Apache-2.0 OR MIT
// Daily file sink: one file per calendar day, optional age-based cleanup
//
// Rollover keys off each record's wall-clock timestamp, so replayed or
// late-drained records land in the file for the day they were produced.

use super::{Sink, SinkCore};
use crate::fmt::{Formatter, PatternFormatter, FILE_PATTERN};
use crate::level::Level;
use crate::record::Record;
use crate::{clock, Error};
use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

pub struct DailyFileSink {
    core: SinkCore,
    base_dir: PathBuf,
    base_name: String,
    retention_days: u64,
    use_utc: bool,
    file: Option<File>,
    current_day: i32,
}

impl DailyFileSink {
    /// Create the directory (recursively) and open today's file for append.
    /// `retention_days == 0` disables cleanup.
    pub fn new(
        base_dir: impl Into<PathBuf>,
        base_name: impl Into<String>,
        retention_days: u64,
        use_utc: bool,
    ) -> Result<Self, Error> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|source| Error::CreateDir {
            path: base_dir.clone(),
            source,
        })?;

        let mut sink = Self {
            core: SinkCore::new(),
            base_dir,
            base_name: base_name.into(),
            retention_days,
            use_utc,
            file: None,
            current_day: -1,
        };

        let now = clock::wall_ns();
        let path = sink.file_path_for(now);
        sink.file = Some(open_append(&path)?);
        sink.current_day = sink.day_key(now);
        if sink.retention_days > 0 {
            sink.cleanup_old_files();
        }
        Ok(sink)
    }

    /// Strictly monotonic day index across any real-world time range.
    fn day_key(&self, wall_ns: u64) -> i32 {
        let dt = utc_datetime(wall_ns);
        if self.use_utc {
            dt.year() * 366 + dt.ordinal0() as i32
        } else {
            let local = dt.with_timezone(&Local);
            local.year() * 366 + local.ordinal0() as i32
        }
    }

    fn file_path_for(&self, wall_ns: u64) -> PathBuf {
        let dt = utc_datetime(wall_ns);
        let date = if self.use_utc {
            dt.format("%Y-%m-%d").to_string()
        } else {
            dt.with_timezone(&Local).format("%Y-%m-%d").to_string()
        };
        self.base_dir
            .join(format!("{}_{}.log", self.base_name, date))
    }

    /// Close the current file and open the one for the day of `wall_ns`.
    fn roll_to(&mut self, wall_ns: u64) {
        if let Some(file) = self.file.take() {
            let _ = file.sync_all();
        }
        let path = self.file_path_for(wall_ns);
        match open_append(&path) {
            Ok(file) => self.file = Some(file),
            Err(err) => {
                // Fail soft: report once, stay dark until the next rollover.
                eprintln!("DailyFileSink: {err}");
            }
        }
        self.current_day = self.day_key(wall_ns);
        if self.retention_days > 0 {
            self.cleanup_old_files();
        }
    }

    /// Unlink `{base_name}_*.log` files whose mtime is older than the
    /// retention window.
    fn cleanup_old_files(&self) {
        let Ok(entries) = fs::read_dir(&self.base_dir) else {
            return;
        };
        let prefix = format!("{}_", self.base_name);
        let max_age = Duration::from_secs(self.retention_days * 86_400);
        let now = SystemTime::now();

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.starts_with(&prefix) || !name.ends_with(".log") {
                continue;
            }
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            let Ok(mtime) = meta.modified() else {
                continue;
            };
            if let Ok(age) = now.duration_since(mtime) {
                if age > max_age {
                    let _ = fs::remove_file(entry.path());
                }
            }
        }
    }
}

fn utc_datetime(wall_ns: u64) -> DateTime<Utc> {
    let secs = (wall_ns / 1_000_000_000) as i64;
    let nsecs = (wall_ns % 1_000_000_000) as u32;
    Utc.timestamp_opt(secs, nsecs).single().unwrap_or_default()
}

fn open_append(path: &std::path::Path) -> Result<File, Error> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}

impl Sink for DailyFileSink {
    fn write(&mut self, record: &Record) {
        if !self.should_log(record.level) {
            return;
        }

        let day = self.day_key(record.wall_clock_ns);
        if day != self.current_day {
            self.roll_to(record.wall_clock_ns);
        }

        let len = self
            .core
            .render(record, || Box::new(PatternFormatter::new(FILE_PATTERN, false)));
        if len == 0 {
            return;
        }
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let _ = file.write_all(self.core.bytes());
        let _ = file.write_all(b"\n");
    }

    fn flush(&mut self) {
        if let Some(file) = self.file.as_ref() {
            let _ = file.sync_all();
        }
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

impl Drop for DailyFileSink {
    fn drop(&mut self) {
        self.flush();
    }
}
