// SPDX-License-Identifier: Apache-2.0 OR MIT
// Fixed-size log record, safe to copy by byte between producer and consumer

use crate::config::{MAX_MSG_LEN, MAX_TAGS, MAX_TAG_KEY_LEN, MAX_TAG_VAL_LEN, THREAD_NAME_LEN};
use crate::level::Level;
use std::fmt;

/// Inline (key, value) pair, both NUL-terminated UTF-8.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Tag {
    key: [u8; MAX_TAG_KEY_LEN],
    value: [u8; MAX_TAG_VAL_LEN],
}

impl Tag {
    /// Create an empty tag
    pub const fn empty() -> Self {
        Self {
            key: [0; MAX_TAG_KEY_LEN],
            value: [0; MAX_TAG_VAL_LEN],
        }
    }

    /// Create a new tag; key and value are truncated to the inline capacity
    /// (minus the NUL) at a character boundary.
    pub fn new(key: &str, value: &str) -> Self {
        let mut tag = Self::empty();
        copy_truncated(&mut tag.key, key);
        copy_truncated(&mut tag.value, value);
        tag
    }

    /// Get key as string slice
    pub fn key(&self) -> &str {
        cstr_slice(&self.key)
    }

    /// Get value as string slice
    pub fn value(&self) -> &str {
        cstr_slice(&self.value)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key(), self.value())
    }
}

/// One log record.
///
/// The record is fully self-contained after publication: every field is
/// either inline or a `'static` string literal, so the consumer never
/// dereferences producer-thread state. Kept trivially copyable (`Copy`, no
/// owning fields) because the ring moves records with plain memory copies.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Record {
    /// Monotonic timestamp (ns since an unspecified epoch)
    pub timestamp_ns: u64,
    /// Wall-clock timestamp (ns since the Unix epoch)
    pub wall_clock_ns: u64,

    pub level: Level,

    pub file_path: &'static str,
    pub file_name: &'static str,
    pub function_name: &'static str,
    pub pretty_function: &'static str,
    pub line: u32,
    pub column: u32,

    pub thread_id: u32,
    pub process_id: u32,
    pub(crate) thread_name: [u8; THREAD_NAME_LEN],

    pub tag_count: u8,
    pub(crate) tags: [Tag; MAX_TAGS],

    /// Globally monotonic id assigned at the producer; sinks observe ring
    /// order, which agrees with sequence order per producer thread only.
    pub sequence_id: u64,

    pub(crate) msg_len: u16,
    pub(crate) msg: [u8; MAX_MSG_LEN],
}

impl Record {
    /// Get message as string slice
    pub fn message(&self) -> &str {
        std::str::from_utf8(&self.msg[..self.msg_len as usize]).unwrap_or("")
    }

    /// Get thread name as string slice (empty if the thread never set one)
    pub fn thread_name(&self) -> &str {
        cstr_slice(&self.thread_name)
    }

    /// Tags attached to this record, global-first then scoped
    pub fn tags(&self) -> &[Tag] {
        &self.tags[..self.tag_count as usize]
    }

    /// Append a tag; returns false when the inline array is full.
    pub(crate) fn push_tag(&mut self, tag: Tag) -> bool {
        if (self.tag_count as usize) < MAX_TAGS {
            self.tags[self.tag_count as usize] = tag;
            self.tag_count += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn set_thread_name(&mut self, name: &[u8; THREAD_NAME_LEN]) {
        self.thread_name = *name;
    }

    /// Render `args` into the inline message buffer, truncating silently at
    /// `MAX_MSG_LEN - 1` bytes on a character boundary.
    pub(crate) fn write_message(&mut self, args: fmt::Arguments<'_>) {
        let mut writer = MessageWriter {
            buf: &mut self.msg,
            len: 0,
        };
        let _ = fmt::write(&mut writer, args);
        self.msg_len = writer.len as u16;
        self.msg[writer.len] = 0;
    }
}

impl Default for Record {
    fn default() -> Self {
        Self {
            timestamp_ns: 0,
            wall_clock_ns: 0,
            level: Level::Info,
            file_path: "",
            file_name: "",
            function_name: "",
            pretty_function: "",
            line: 0,
            column: 0,
            thread_id: 0,
            process_id: 0,
            thread_name: [0; THREAD_NAME_LEN],
            tag_count: 0,
            tags: [Tag::empty(); MAX_TAGS],
            sequence_id: 0,
            msg_len: 0,
            msg: [0; MAX_MSG_LEN],
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Record");
        debug
            .field("level", &self.level)
            .field("seq", &self.sequence_id)
            .field("message", &self.message());
        if self.tag_count > 0 {
            debug.field("tags", &self.tags());
        }
        debug.finish()
    }
}

struct MessageWriter<'a> {
    buf: &'a mut [u8; MAX_MSG_LEN],
    len: usize,
}

impl fmt::Write for MessageWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        // Last byte is reserved for the NUL. Overflow is silent truncation,
        // so report Ok even when nothing fits.
        let cap = MAX_MSG_LEN - 1;
        if self.len >= cap {
            return Ok(());
        }
        let avail = cap - self.len;
        let take = if s.len() <= avail {
            s.len()
        } else {
            floor_char_boundary(s, avail)
        };
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

/// Copy `src` into a NUL-terminated buffer, truncating on a char boundary.
fn copy_truncated<const N: usize>(dst: &mut [u8; N], src: &str) {
    let take = if src.len() < N {
        src.len()
    } else {
        floor_char_boundary(src, N - 1)
    };
    dst[..take].copy_from_slice(&src.as_bytes()[..take]);
    dst[take] = 0;
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn cstr_slice(buf: &[u8]) -> &str {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    std::str::from_utf8(&buf[..end]).unwrap_or("")
}
