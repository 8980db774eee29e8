// JSON formatter: one object per record, escaping done by hand so the
// output layout stays under our control (top-level-only pretty mode)

use super::{format_timestamp, Formatter};
use crate::record::Record;
use std::io::Write;

/// Renders each record as a single JSON object with keys
/// `ts, level, file, line, func, tid, pid, thread, seq, tags, msg`.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

fn escape_into(out: &mut Vec<u8>, s: &str) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &byte in s.as_bytes() {
        match byte {
            b'"' => out.extend_from_slice(b"\\\""),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            b if b <= 0x1F => {
                out.extend_from_slice(b"\\u00");
                out.push(HEX[(b >> 4) as usize]);
                out.push(HEX[(b & 0x0F) as usize]);
            }
            b => out.push(b),
        }
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record, out: &mut Vec<u8>) {
        let nl: &[u8] = if self.pretty { b"\n" } else { b"" };
        let ind: &[u8] = if self.pretty { b"  " } else { b"" };
        let sep: &[u8] = if self.pretty { b": " } else { b":" };
        let comma: &[u8] = if self.pretty { b",\n" } else { b"," };

        let string_field = |out: &mut Vec<u8>, key: &str, value: &str, trailing: bool| {
            out.extend_from_slice(ind);
            out.push(b'"');
            out.extend_from_slice(key.as_bytes());
            out.push(b'"');
            out.extend_from_slice(sep);
            out.push(b'"');
            escape_into(out, value);
            out.push(b'"');
            if trailing {
                out.extend_from_slice(comma);
            }
        };

        out.push(b'{');
        out.extend_from_slice(nl);

        // ts
        out.extend_from_slice(ind);
        out.extend_from_slice(b"\"ts\"");
        out.extend_from_slice(sep);
        out.push(b'"');
        format_timestamp(record.wall_clock_ns, out);
        out.push(b'"');
        out.extend_from_slice(comma);

        string_field(out, "level", record.level.as_str(), true);
        string_field(out, "file", record.file_name, true);

        out.extend_from_slice(ind);
        out.extend_from_slice(b"\"line\"");
        out.extend_from_slice(sep);
        let _ = write!(out, "{}", record.line);
        out.extend_from_slice(comma);

        string_field(out, "func", record.function_name, true);

        out.extend_from_slice(ind);
        out.extend_from_slice(b"\"tid\"");
        out.extend_from_slice(sep);
        let _ = write!(out, "{}", record.thread_id);
        out.extend_from_slice(comma);

        out.extend_from_slice(ind);
        out.extend_from_slice(b"\"pid\"");
        out.extend_from_slice(sep);
        let _ = write!(out, "{}", record.process_id);
        out.extend_from_slice(comma);

        string_field(out, "thread", record.thread_name(), true);

        out.extend_from_slice(ind);
        out.extend_from_slice(b"\"seq\"");
        out.extend_from_slice(sep);
        let _ = write!(out, "{}", record.sequence_id);
        out.extend_from_slice(comma);

        // tags object
        out.extend_from_slice(ind);
        out.extend_from_slice(b"\"tags\"");
        out.extend_from_slice(sep);
        out.push(b'{');
        for (i, tag) in record.tags().iter().enumerate() {
            if i > 0 {
                out.push(b',');
            }
            out.push(b'"');
            escape_into(out, tag.key());
            out.push(b'"');
            out.extend_from_slice(sep);
            out.push(b'"');
            escape_into(out, tag.value());
            out.push(b'"');
        }
        out.push(b'}');
        out.extend_from_slice(comma);

        string_field(out, "msg", record.message(), false);
        out.extend_from_slice(nl);
        out.push(b'}');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::record::Tag;
    use serde_json::Value;

    fn test_record() -> Record {
        let mut record = Record::default();
        record.level = Level::Info;
        record.file_name = "pool.rs";
        record.function_name = "spawn";
        record.line = 42;
        record.thread_id = 1234;
        record.process_id = 99;
        record.sequence_id = 17;
        record.wall_clock_ns = 1_686_830_400_123_456_789;
        record.write_message(format_args!("started"));
        record
    }

    fn render(pretty: bool, record: &Record) -> String {
        let formatter = JsonFormatter::new(pretty);
        let mut out = Vec::new();
        formatter.format(record, &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_compact_is_valid_json() {
        let record = test_record();
        let value: Value = serde_json::from_str(&render(false, &record)).unwrap();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["file"], "pool.rs");
        assert_eq!(value["line"], 42);
        assert_eq!(value["func"], "spawn");
        assert_eq!(value["tid"], 1234);
        assert_eq!(value["pid"], 99);
        assert_eq!(value["seq"], 17);
        assert_eq!(value["msg"], "started");
        assert!(value["tags"].as_object().unwrap().is_empty());
        assert!(value["ts"].as_str().unwrap().contains(".123456"));
    }

    #[test]
    fn test_tags_object() {
        let mut record = test_record();
        record.push_tag(Tag::new("env", "dev"));
        record.push_tag(Tag::new("req", "456"));
        let value: Value = serde_json::from_str(&render(false, &record)).unwrap();
        assert_eq!(value["tags"]["env"], "dev");
        assert_eq!(value["tags"]["req"], "456");
    }

    #[test]
    fn test_escaping() {
        let mut record = test_record();
        record.write_message(format_args!("quote \" slash \\ nl \n tab \t ctl \x01"));
        let rendered = render(false, &record);
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(
            value["msg"].as_str().unwrap(),
            "quote \" slash \\ nl \n tab \t ctl \x01"
        );
        assert!(rendered.contains("\\u0001"));
        assert!(rendered.contains("\\n"));
    }

    #[test]
    fn test_pretty_mode() {
        let record = test_record();
        let rendered = render(true, &record);
        // Top-level indentation only, still parseable.
        assert!(rendered.starts_with("{\n  \"ts\""));
        assert!(rendered.ends_with("\n}"));
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["msg"], "started");
    }

    #[test]
    fn test_compact_has_no_whitespace() {
        let record = test_record();
        let rendered = render(false, &record);
        assert!(!rendered.contains('\n'));
        assert!(!rendered.contains(": "));
    }
}
