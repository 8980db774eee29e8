// Size-triggered rotating file sink
//
// On-disk layout: `base` is always the file being written; rotation shuffles
// `base -> base.1.log -> base.2.log -> ...` and unlinks the oldest, so at
// most `max_files + 1` artifacts exist at steady state.

use super::{Sink, SinkCore};
use crate::fmt::{Formatter, PatternFormatter, FILE_PATTERN};
use crate::level::Level;
use crate::record::Record;
use crate::Error;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct RotatingFileSink {
    core: SinkCore,
    base_path: PathBuf,
    max_file_size: u64,
    max_files: usize,
    file: Option<File>,
    current_size: u64,
}

impl RotatingFileSink {
    /// Open-or-create `base_path` in append mode. The running byte count is
    /// seeded from the existing file size.
    pub fn new(
        base_path: impl Into<PathBuf>,
        max_file_size: u64,
        max_files: usize,
    ) -> Result<Self, Error> {
        let base_path = base_path.into();
        let file = open_append(&base_path)?;
        let current_size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            core: SinkCore::new(),
            base_path,
            max_file_size,
            max_files,
            file: Some(file),
            current_size,
        })
    }

    fn numbered_path(&self, index: usize) -> PathBuf {
        let mut os = self.base_path.clone().into_os_string();
        os.push(format!(".{index}.log"));
        PathBuf::from(os)
    }

    /// Close the current file, shuffle the numbered backups up by one
    /// (discarding the oldest), and reopen the base file empty.
    fn rotate(&mut self) {
        self.file = None;

        for i in (1..=self.max_files).rev() {
            let dst = self.numbered_path(i);
            if i == self.max_files {
                let _ = fs::remove_file(&dst);
            }
            let src = if i == 1 {
                self.base_path.clone()
            } else {
                self.numbered_path(i - 1)
            };
            let _ = fs::rename(&src, &dst);
        }

        self.current_size = 0;
        match open_append(&self.base_path) {
            Ok(file) => self.file = Some(file),
            Err(err) => {
                // Fail soft: report once, then go dark until the next rotate.
                eprintln!("RotatingFileSink: {err}");
            }
        }
    }
}

fn open_append(path: &Path) -> Result<File, Error> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}

impl Sink for RotatingFileSink {
    fn write(&mut self, record: &Record) {
        if !self.should_log(record.level) {
            return;
        }
        let len = self
            .core
            .render(record, || Box::new(PatternFormatter::new(FILE_PATTERN, false)))
            as u64;
        if len == 0 || self.file.is_none() {
            return;
        }

        if self.current_size + len + 1 > self.max_file_size {
            self.rotate();
        }
        let Some(file) = self.file.as_mut() else {
            return;
        };
        if file.write_all(self.core.bytes()).is_ok() {
            self.current_size += len;
        }
        if file.write_all(b"\n").is_ok() {
            self.current_size += 1;
        }
    }

    fn flush(&mut self) {
        if let Some(file) = self.file.as_ref() {
            let _ = file.sync_data();
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

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn unique_base() -> PathBuf {
        std::env::temp_dir().join(format!("hotlog_rot_{}.log", Uuid::new_v4()))
    }

    fn cleanup(base: &Path, max_files: usize) {
        let _ = fs::remove_file(base);
        for i in 1..=max_files + 2 {
            let mut os = base.to_path_buf().into_os_string();
            os.push(format!(".{i}.log"));
            let _ = fs::remove_file(PathBuf::from(os));
        }
    }

    fn record_with_message(msg: &str) -> Record {
        let mut record = Record::default();
        record.level = Level::Info;
        record.write_message(format_args!("{msg}"));
        record
    }

    // Bare "%m" formatter so line lengths are exactly message + newline.
    fn plain_sink(base: &Path, max_size: u64, max_files: usize) -> RotatingFileSink {
        let mut sink = RotatingFileSink::new(base, max_size, max_files).unwrap();
        sink.set_formatter(Box::new(PatternFormatter::new("%m", false)));
        sink
    }

    #[test]
    fn test_write_appends_line() {
        let base = unique_base();
        {
            let mut sink = plain_sink(&base, 10_000, 3);
            sink.write(&record_with_message("first"));
            sink.write(&record_with_message("second"));
            sink.flush();
        }
        let contents = fs::read_to_string(&base).unwrap();
        assert_eq!(contents, "first\nsecond\n");
        cleanup(&base, 3);
    }

    #[test]
    fn test_size_seeded_from_existing_file() {
        let base = unique_base();
        fs::write(&base, b"previous run\n").unwrap();
        let sink = plain_sink(&base, 10_000, 3);
        assert_eq!(sink.current_size, 13);
        cleanup(&base, 3);
    }

    #[test]
    fn test_rotation_invariant() {
        let base = unique_base();
        {
            // ~25-byte lines against a 50-byte limit with three backups.
            let mut sink = plain_sink(&base, 50, 3);
            let line = "x".repeat(24);
            for _ in 0..20 {
                sink.write(&record_with_message(&line));
            }
            sink.flush();
        }

        assert!(base.exists());
        let numbered = |i: usize| {
            let mut os = base.clone().into_os_string();
            os.push(format!(".{i}.log"));
            PathBuf::from(os)
        };
        assert!(numbered(1).exists());
        assert!(numbered(2).exists());
        // base.3.log may exist; base.4.log must not.
        assert!(!numbered(4).exists());
        cleanup(&base, 3);
    }

    #[test]
    fn test_rotated_content_is_older() {
        let base = unique_base();
        {
            let mut sink = plain_sink(&base, 12, 2);
            sink.write(&record_with_message("aaaaaaaaaa")); // 11 bytes w/ newline
            sink.write(&record_with_message("bbbbbbbbbb")); // triggers rotate
            sink.flush();
        }
        let numbered1 = {
            let mut os = base.clone().into_os_string();
            os.push(".1.log");
            PathBuf::from(os)
        };
        assert_eq!(fs::read_to_string(&numbered1).unwrap(), "aaaaaaaaaa\n");
        assert_eq!(fs::read_to_string(&base).unwrap(), "bbbbbbbbbb\n");
        cleanup(&base, 2);
    }

    #[test]
    fn test_level_filter_skips_io() {
        let base = unique_base();
        {
            let mut sink = plain_sink(&base, 10_000, 3);
            sink.set_level(Level::Error);
            sink.write(&record_with_message("filtered"));
            sink.flush();
        }
        assert_eq!(fs::read_to_string(&base).unwrap(), "");
        cleanup(&base, 3);
    }

    #[test]
    fn test_open_failure_is_reported() {
        let missing_dir = std::env::temp_dir()
            .join(format!("hotlog_no_such_dir_{}", Uuid::new_v4()))
            .join("file.log");
        assert!(RotatingFileSink::new(&missing_dir, 100, 3).is_err());
    }
}
